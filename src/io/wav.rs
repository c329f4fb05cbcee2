//! WAV encoding of captured audio.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::Result;

/// Sample encoding of a finished recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavEncoding {
    /// 32-bit IEEE float.
    #[default]
    Float32,
    /// 16-bit signed PCM.
    Pcm16,
}

impl WavEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            WavEncoding::Float32 => "wav-f32",
            WavEncoding::Pcm16 => "wav-pcm16",
        }
    }

    /// Negotiate an encoding from a format name. Unknown names get `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wav-f32" | "wav-float" | "audio/wav;codecs=float" => Some(WavEncoding::Float32),
            "wav-pcm16" | "wav" | "audio/wav" => Some(WavEncoding::Pcm16),
            _ => None,
        }
    }

    fn spec(self, sample_rate: u32) -> WavSpec {
        match self {
            WavEncoding::Float32 => WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
            WavEncoding::Pcm16 => WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        }
    }
}

/// Encode consecutive mono chunks into one in-memory WAV file.
pub fn encode<'a, I>(chunks: I, sample_rate: u32, encoding: WavEncoding) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, encoding.spec(sample_rate))?;
        for chunk in chunks {
            for &sample in chunk {
                match encoding {
                    WavEncoding::Float32 => writer.write_sample(sample)?,
                    WavEncoding::Pcm16 => {
                        let clamped = sample.clamp(-1.0, 1.0);
                        writer.write_sample((clamped * i16::MAX as f32) as i16)?
                    }
                }
            }
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::decode;

    #[test]
    fn float_chunks_decode_in_order() {
        let a = [0.1f32, 0.2];
        let b = [0.3f32];
        let bytes = encode([&a[..], &b[..]], 44_100, WavEncoding::Float32).unwrap();

        let audio = decode(&bytes).unwrap();
        assert_eq!(audio.sample_rate, 44_100);
        assert_eq!(audio.samples, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn pcm16_clamps_overs() {
        let chunk = [2.0f32, -2.0, 0.0];
        let bytes = encode([&chunk[..]], 8_000, WavEncoding::Pcm16).unwrap();

        let audio = decode(&bytes).unwrap();
        assert!((audio.samples[0] - 1.0).abs() < 1e-3);
        assert!((audio.samples[1] + 1.0).abs() < 1e-3);
        assert_eq!(audio.samples[2], 0.0);
    }

    #[test]
    fn format_names() {
        assert_eq!(WavEncoding::from_name("wav-f32"), Some(WavEncoding::Float32));
        assert_eq!(WavEncoding::from_name("WAV-PCM16"), Some(WavEncoding::Pcm16));
        assert_eq!(WavEncoding::from_name("audio/webm"), None);
    }
}
