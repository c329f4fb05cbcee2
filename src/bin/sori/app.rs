//! Wires the session, the audio output and the terminal UI together.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use color_eyre::eyre::Result as EyreResult;
use rtrb::RingBuffer;
use sori::{config::Config, Session};
use tracing::info;

use super::{audio::Output, ui::UiApp};

/// Samples kept in flight between the audio thread and the oscilloscope.
const SCOPE_CAPACITY: usize = 8192;

/// Open the audio device, build the session and run the UI until quit.
pub fn run(config: Config) -> EyreResult<()> {
    let output = Output::open(config.audio.sample_rate_hint)?;
    let samples = config.sample_store(output.sample_rate());

    let mut session = Session::new(samples, &config);
    let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);
    session.attach_scope(scope_tx);
    let session = Arc::new(Mutex::new(session));

    // kept alive for the whole UI run
    let _stream = output.start(Arc::clone(&session))?;
    info!("session started");

    let key_timeout = Duration::from_millis(config.input.key_release_timeout_ms);
    let mut terminal = ratatui::init();
    let result = UiApp::new(session, scope_rx, key_timeout).run(&mut terminal);
    ratatui::restore();

    info!("session ended");
    result
}
