//! Error types shared across the crate.
//!
//! None of these ever reach the player as a dialog. Callers log them and the
//! affected instrument simply stays silent until the next attempt.

use std::path::PathBuf;

use crate::instrument::Instrument;

/// Errors produced while loading assets, decoding audio or writing recordings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The asset could not be fetched (missing file, unreadable path).
    #[error("asset unavailable: {path}")]
    AssetUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes were fetched but are not decodable audio.
    #[error("could not decode audio: {reason}")]
    DecodeFailure { reason: String },

    /// A melodic instrument was played before its sample finished loading.
    #[error("{0} sample is not loaded")]
    SampleNotLoaded(Instrument),

    /// Encoding a finished recording into WAV failed.
    #[error("recording encode failed: {0}")]
    RecordingEncode(#[from] hound::Error),

    /// The configuration file exists but is not valid TOML for [`crate::config::Config`].
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Standard I/O error (writing a downloaded recording, reading config).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Error::DecodeFailure {
            reason: reason.into(),
        }
    }
}

/// Convenience result type for fallible crate operations.
pub type Result<T> = std::result::Result<T, Error>;
