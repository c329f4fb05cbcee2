//! Output device setup and the audio callback.

use std::sync::{Arc, Mutex};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, SampleFormat, SampleRate, Stream, StreamConfig,
};
use sori::{Session, MAX_BLOCK_SIZE};
use tracing::{error, info, warn};

/// The default output device and the stream config to open it with.
pub struct Output {
    device: Device,
    config: StreamConfig,
}

impl Output {
    /// Open the default output device, preferring `rate_hint` if it offers it.
    pub fn open(rate_hint: Option<u32>) -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;

        let config = match rate_hint.and_then(|hint| hinted_config(&device, hint)) {
            Some(config) => config,
            None => {
                if let Some(hint) = rate_hint {
                    warn!(hint, "sample rate hint not supported, using device default");
                }
                device
                    .default_output_config()
                    .wrap_err("failed to fetch default output config")?
                    .config()
            }
        };

        info!(
            device = device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "audio output"
        );
        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate.0 as f32
    }

    /// Start pulling blocks from `session`. Dropping the stream stops audio.
    pub fn start(self, session: Arc<Mutex<Session>>) -> EyreResult<Stream> {
        let channels = self.config.channels as usize;
        let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _| {
                let Ok(mut session) = session.lock() else {
                    data.fill(0.0);
                    return;
                };

                let total_frames = data.len() / channels;
                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let mono = &mut block[..frames];
                    session.render_block(mono);

                    // mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in mono.iter().enumerate() {
                        let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                        frame.fill(s);
                    }
                    frames_written += frames;
                }
            },
            |err| error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;
        Ok(stream)
    }
}

fn hinted_config(device: &Device, hint: u32) -> Option<StreamConfig> {
    let mut ranges = device.supported_output_configs().ok()?;
    ranges
        .find(|range| {
            range.sample_format() == SampleFormat::F32
                && range.min_sample_rate().0 <= hint
                && hint <= range.max_sample_rate().0
        })
        .map(|range| range.with_sample_rate(SampleRate(hint)).config())
}
