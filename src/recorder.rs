//! Per-instrument capture of what the player performs.
//!
//! ```text
//!        start            stop
//! Idle ────────→ Recording ─────→ Idle (+ finished Recording)
//!                  │  ↑
//!                  └──┘ start again: in-flight capture is discarded
//! ```
//!
//! Every start opens a fresh take. Voices remember the take they were started
//! in, so audio from an abandoned take can never leak into the next one.
//! Captured frames are cut into 100 ms chunks as they arrive; stopping joins
//! the chunks in order and encodes them as one WAV file.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, error, info, warn};

use crate::{
    instrument::Instrument,
    io::{
        decode,
        wav::{encode, WavEncoding},
    },
    Result,
};

/// Seconds of audio per delivered chunk.
pub const CHUNK_SECONDS: f32 = 0.1;

/// Identifies one recording take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TakeId(pub(crate) u64);

impl fmt::Display for TakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "take {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// A finished take.
#[derive(Debug, Clone)]
pub struct Recording {
    pub format: WavEncoding,
    pub bytes: Vec<u8>,
    /// The raw captured frames, kept for playback if the bytes won't decode.
    pub frames: Arc<[f32]>,
    pub sample_rate: f32,
}

impl Recording {
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 / self.sample_rate
    }

    /// Audio to play back: the decoded file, or the raw frames when decoding
    /// fails. `None` if neither is usable.
    pub fn playback_buffer(&self) -> Option<(Arc<[f32]>, f32)> {
        match decode(&self.bytes) {
            Ok(audio) if !audio.samples.is_empty() => {
                Some((audio.samples.into(), audio.sample_rate as f32))
            }
            Ok(_) => self.fallback("decoded recording is empty"),
            Err(err) => self.fallback(&err.to_string()),
        }
    }

    fn fallback(&self, reason: &str) -> Option<(Arc<[f32]>, f32)> {
        if self.frames.is_empty() {
            error!(reason, "recording cannot be played back");
            return None;
        }
        warn!(reason, "playing raw captured frames instead");
        Some((self.frames.clone(), self.sample_rate))
    }
}

#[derive(Debug)]
struct Capture {
    take: TakeId,
    pending: Vec<f32>,
    chunks: Vec<Vec<f32>>,
}

#[derive(Debug)]
pub struct Recorder {
    instrument: Instrument,
    sample_rate: f32,
    encoding: WavEncoding,
    chunk_frames: usize,
    next_take: u64,
    capture: Option<Capture>,
    last: Option<Recording>,
}

impl Recorder {
    /// `format` is the preferred format name; unsupported names fall back to
    /// 16-bit PCM WAV.
    pub fn new(instrument: Instrument, sample_rate: f32, format: &str) -> Self {
        let encoding = WavEncoding::from_name(format).unwrap_or_else(|| {
            warn!(%instrument, format, "recording format unsupported, using wav-pcm16");
            WavEncoding::Pcm16
        });

        Self {
            instrument,
            sample_rate,
            encoding,
            chunk_frames: ((CHUNK_SECONDS * sample_rate).round() as usize).max(1),
            next_take: 0,
            capture: None,
            last: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        match self.capture {
            Some(_) => RecorderState::Recording,
            None => RecorderState::Idle,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_some()
    }

    pub fn encoding(&self) -> WavEncoding {
        self.encoding
    }

    pub fn current_take(&self) -> Option<TakeId> {
        self.capture.as_ref().map(|c| c.take)
    }

    /// Chunks delivered so far in the current take.
    pub fn chunk_count(&self) -> usize {
        self.capture.as_ref().map_or(0, |c| c.chunks.len())
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.last.as_ref()
    }

    /// Open a fresh take, discarding any take still in flight.
    pub fn start(&mut self) -> TakeId {
        let take = TakeId(self.next_take);
        self.next_take += 1;

        if let Some(old) = self.capture.take() {
            debug!(instrument = %self.instrument, discarded = %old.take, "restarting recording");
        }
        self.capture = Some(Capture {
            take,
            pending: Vec::with_capacity(self.chunk_frames),
            chunks: Vec::new(),
        });
        info!(instrument = %self.instrument, %take, "recording started");
        take
    }

    /// Append rendered frames of the current take.
    pub fn capture(&mut self, frames: &[f32]) {
        let chunk_frames = self.chunk_frames;
        let Some(capture) = self.capture.as_mut() else {
            return;
        };

        capture.pending.extend_from_slice(frames);
        while capture.pending.len() >= chunk_frames {
            let rest = capture.pending.split_off(chunk_frames);
            let chunk = std::mem::replace(&mut capture.pending, rest);
            capture.chunks.push(chunk);
        }
    }

    /// Finish the take and encode it. Returns `None` when not recording.
    pub fn stop(&mut self) -> Result<Option<&Recording>> {
        let Some(mut capture) = self.capture.take() else {
            return Ok(None);
        };

        if !capture.pending.is_empty() {
            let tail = std::mem::take(&mut capture.pending);
            capture.chunks.push(tail);
        }

        let bytes = encode(
            capture.chunks.iter().map(Vec::as_slice),
            self.sample_rate.round() as u32,
            self.encoding,
        )?;
        let frames: Arc<[f32]> = capture.chunks.concat().into();

        info!(
            instrument = %self.instrument,
            take = %capture.take,
            chunks = capture.chunks.len(),
            bytes = bytes.len(),
            format = self.encoding.as_str(),
            "recording finished"
        );

        self.last = Some(Recording {
            format: self.encoding,
            bytes,
            frames,
            sample_rate: self.sample_rate,
        });
        Ok(self.last.as_ref())
    }

    /// File name used when saving this instrument's recording.
    pub fn file_name(&self) -> String {
        format!("{}-recording.wav", self.instrument)
    }

    /// Write the last recording into `dir`. `None` if nothing was recorded.
    pub fn download(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let Some(recording) = self.last.as_ref() else {
            return Ok(None);
        };

        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, &recording.bytes)?;
        info!(instrument = %self.instrument, path = %path.display(), "recording saved");
        Ok(Some(path))
    }
}
