//! sori - play piri, haegeum and janggu from the terminal
//!
//! Run with: cargo run -- --assets path/to/assets

mod app;
mod audio;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use sori::config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sori", version, about = "Korean traditional instrument simulator")]
struct Args {
    /// TOML configuration file. Missing file means defaults.
    #[arg(long, default_value = "sori.toml")]
    config: PathBuf,

    /// Directory the sample paths are relative to (overrides `[assets] root`).
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Where downloaded recordings go (overrides `[recording] output_dir`).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Log file. The terminal belongs to the UI.
    #[arg(long, default_value = "sori.log")]
    log: PathBuf,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    init_logging(&args.log)?;

    let mut config = Config::load(&args.config)
        .wrap_err_with(|| format!("failed to read {}", args.config.display()))?;
    if let Some(root) = args.assets {
        config.assets.root = root;
    }
    if let Some(dir) = args.out_dir {
        config.recording.output_dir = dir;
    }

    app::run(config)
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("SORI_LOG").unwrap_or_else(|_| EnvFilter::new("sori=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
