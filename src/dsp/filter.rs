use std::f32::consts::{FRAC_1_SQRT_2, TAU};

use crate::graph::node::RenderCtx;

/*
| type      | passes          | rejects          | used by                      |
| --------- | --------------- | ---------------- | ---------------------------- |
| low-pass  | below cutoff    | above cutoff     | piri smoothing, bass strokes |
| band-pass | around cutoff   | both sides       | stick strokes (Q = 5)        |

Topology-preserving state-variable filter. Damping `k = 1 / Q`; the band-pass
output is scaled by `k` so the centre frequency passes at unity gain no
matter how narrow the band is.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    BandPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: FRAC_1_SQRT_2,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz)
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        // Keep the cutoff below Nyquist so tan() stays finite
        let cutoff = self.cutoff_hz.clamp(10.0, ctx.sample_rate * 0.49);
        (TAU * cutoff / (2.0 * ctx.sample_rate)).tan()
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: k * v1,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = 1.0 / self.q.max(0.05);

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);

            *sample = match self.filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::BandPass => outputs.bandpass,
            }
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn filtered_peak(filter: &mut SVFilter, freq: f32) -> f32 {
        filter.reset();
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, freq, 1.0);
        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0f32; 4096];
        osc.render(&mut buffer, &ctx);
        filter.render(&mut buffer, &ctx);

        // skip the transient
        buffer[2048..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn lowpass_passes_lows_and_cuts_highs() {
        let mut filter = SVFilter::lowpass(200.0);

        let low = filtered_peak(&mut filter, 60.0);
        let high = filtered_peak(&mut filter, 3_000.0);

        assert!(low > 0.8, "60 Hz should pass, got {low}");
        assert!(high < 0.05, "3 kHz should be cut, got {high}");
    }

    #[test]
    fn bandpass_centre_is_unity_and_sides_are_cut() {
        let mut filter = SVFilter::bandpass(800.0);
        filter.set_q(5.0);

        let centre = filtered_peak(&mut filter, 800.0);
        let below = filtered_peak(&mut filter, 200.0);
        let above = filtered_peak(&mut filter, 4_000.0);

        assert!((centre - 1.0).abs() < 0.1, "centre gain {centre}");
        assert!(below < centre * 0.2, "below {below}");
        assert!(above < centre * 0.2, "above {above}");
    }

    #[test]
    fn higher_q_narrows_the_band() {
        let mut wide = SVFilter::bandpass(1_000.0);
        wide.set_q(0.7);
        let mut narrow = SVFilter::bandpass(1_000.0);
        narrow.set_q(5.0);

        let off_wide = filtered_peak(&mut wide, 1_500.0);
        let off_narrow = filtered_peak(&mut narrow, 1_500.0);

        assert!(off_narrow < off_wide, "narrow={off_narrow}, wide={off_wide}");
    }
}
