//! Compressed/container audio → mono `f32`.
//!
//! RIFF/WAVE data is read with `hound`; anything else is handed to
//! `minimp3`. Multi-channel input is mixed down by averaging channels.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use tracing::debug;

use crate::{Error, Result};

/// Decoded mono audio at its native rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode a whole file held in memory.
pub fn decode(bytes: &[u8]) -> Result<DecodedAudio> {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        decode_wav(bytes)
    } else {
        decode_mp3(bytes)
    }
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| Error::decode(e.to_string()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::decode(e.to_string()))?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::decode(e.to_string()))?
        }
    };

    let samples = mix_to_mono(&interleaved, channels);
    if samples.is_empty() {
        return Err(Error::decode("no audio frames found"));
    }

    debug!(
        channels,
        sample_rate = spec.sample_rate,
        frames = samples.len(),
        "decoded wav"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

fn decode_mp3(bytes: &[u8]) -> Result<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(bytes));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                let channels = frame.channels.max(1);
                sample_rate = frame.sample_rate.max(0) as u32;
                samples.extend(
                    frame
                        .data
                        .chunks(channels)
                        .map(|c| c.iter().map(|&s| s as f32 / 32_768.0).sum::<f32>() / channels as f32),
                );
            }
            Err(minimp3::Error::Eof) => break,
            Err(minimp3::Error::SkippedData) => continue,
            Err(e) => return Err(Error::decode(e.to_string())),
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(Error::decode("no audio frames found"));
    }

    debug!(sample_rate, frames = samples.len(), "decoded mp3");
    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resample from `from` Hz to `to` Hz.
pub fn resample(samples: &[f32], from: f32, to: f32) -> Vec<f32> {
    if samples.is_empty() || from <= 0.0 || to <= 0.0 || (from - to).abs() < f32::EPSILON {
        return samples.to_vec();
    }

    let ratio = from as f64 / to as f64;
    let out_len = ((samples.len() as f64) / ratio).round() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] * (1.0 - frac) + samples[next] * frac
        })
        .collect()
}
