//! Runtime configuration, read from a TOML file.
//!
//! Every key is optional; a missing file means all defaults.
//!
//! ```toml
//! [audio]
//! sample_rate_hint = 48000
//!
//! [assets]
//! root = "."
//! [assets.paths]
//! piri = "sounds/piri-c5.wav"
//!
//! [recording]
//! format = "wav-f32"
//! output_dir = "recordings"
//!
//! [input]
//! key_release_timeout_ms = 120
//!
//! [metronome]
//! default_tempo = 100
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    io::DirAssetSource,
    metronome::Tempo,
    samples::{SampleId, SampleStore},
    Result,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub assets: AssetsConfig,
    pub recording: RecordingConfig,
    pub input: InputConfig,
    pub metronome: MetronomeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Preferred output rate; the device default is used when absent or
    /// unsupported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hint: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub root: PathBuf,
    /// Per-sample path overrides keyed by sample name (`piri`, `kung`, ...).
    pub paths: BTreeMap<String, String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            paths: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// `wav-f32` or `wav-pcm16`; anything else falls back to `wav-pcm16`.
    pub format: String,
    pub output_dir: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            format: "wav-f32".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Hold time after the last key event before a release is assumed, for
    /// terminals that never report key releases.
    pub key_release_timeout_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            key_release_timeout_ms: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetronomeConfig {
    pub default_tempo: i64,
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            default_tempo: Tempo::DEFAULT.bpm() as i64,
        }
    }
}

impl MetronomeConfig {
    /// Configured tempo, clamped into range.
    pub fn tempo(&self) -> Tempo {
        let tempo = Tempo::new(self.default_tempo);
        if tempo.bpm() as i64 != self.default_tempo {
            warn!(
                requested = self.default_tempo,
                using = tempo.bpm(),
                "default tempo out of range"
            );
        }
        tempo
    }
}

impl Config {
    /// Read `path`, or fall back to defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// A store reading from the asset root with the configured overrides.
    pub fn sample_store(&self, sample_rate: f32) -> SampleStore {
        let source = Arc::new(DirAssetSource::new(&self.assets.root));
        let mut store = SampleStore::new(source, sample_rate);

        for (name, path) in &self.assets.paths {
            match SampleId::ALL.into_iter().find(|id| id.name() == name.as_str()) {
                Some(id) => store = store.with_path(id, path.clone()),
                None => warn!(name = name.as_str(), "unknown sample in [assets.paths], ignored"),
            }
        }
        store
    }
}
