use std::f32::consts::TAU;

use rand::Rng;

use crate::graph::node::RenderCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Square,
}

/// Phase accumulator driving one waveform.
///
/// The phase is kept in [0, 1) and advanced by `frequency / sample_rate`
/// after each sample, so the first rendered sample is always at phase zero.
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self { waveform, phase: 0.0 }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn square() -> Self {
        Self::new(OscillatorWaveform::Square)
    }

    /// Produce one sample at `frequency` and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = match self.waveform {
            OscillatorWaveform::Sine => (TAU * self.phase).sin(),
            OscillatorWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();
        value
    }

    /// Fill `out` at the context frequency.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(ctx.frequency, ctx.sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }
}

/// Build `seconds` of white noise: independent uniform samples in [-1, 1].
pub fn white_noise(seconds: f32, sample_rate: f32) -> Vec<f32> {
    white_noise_with(&mut rand::rng(), seconds, sample_rate)
}

/// Same as [`white_noise`] with a caller-supplied generator.
pub fn white_noise_with<R: Rng + ?Sized>(rng: &mut R, seconds: f32, sample_rate: f32) -> Vec<f32> {
    let len = (seconds * sample_rate).round().max(0.0) as usize;
    (0..len).map(|_| rng.random_range(-1.0f32..=1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn square_alternates_each_half_period() {
        // 1 kHz at 8 kHz: 4 high samples then 4 low samples
        let mut osc = OscillatorBlock::square();
        let samples: Vec<f32> = (0..8).map(|_| osc.next_sample(1_000.0, 8_000.0)).collect();

        assert_eq!(&samples[..4], &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(&samples[4..], &[-1.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn noise_has_requested_length_and_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = white_noise_with(&mut rng, 0.1, 44_100.0);

        assert_eq!(noise.len(), 4_410);
        assert!(noise.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(noise.iter().any(|&s| s > 0.5) && noise.iter().any(|&s| s < -0.5));
    }

    #[test]
    fn noise_is_roughly_zero_mean() {
        let mut rng = StdRng::seed_from_u64(42);
        let noise = white_noise_with(&mut rng, 1.0, 44_100.0);
        let mean = noise.iter().sum::<f32>() / noise.len() as f32;

        assert!(mean.abs() < 0.02, "mean was {mean}");
    }
}
