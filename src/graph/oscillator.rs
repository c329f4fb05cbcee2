use crate::dsp::{oscillator::OscillatorBlock, ramp::Ramp};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Tone Generator
==============

The procedural sounds in this crate only need two waveforms:

Sine:   a single pure partial. Drum membranes (kung, duk, gideok) and the
        metronome click are sine bursts.
Square: odd harmonics only, hollow and bright. Run through a narrow
        band-pass it becomes the "tock" of a stick on the right drum head.

Pitch comes from the render context unless the node is given a fixed
frequency or a sweep. A sweep glides the pitch with a ramp, e.g. a membrane
hit starting an octave high and settling in 50 ms:

  OscNode::sine().with_sweep(Ramp::exponential(160.0, 80.0, 0.05))

A generator can also be told when to stop (`stop_after`). Past that point it
renders silence and reports inactive, which is how one-shots end themselves.
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, ignores ctx.frequency.
    base_frequency: Option<f32>,
    /// Pitch glide; takes precedence over `base_frequency`.
    sweep: Option<Ramp>,
    /// Generator lifetime in seconds.
    stop_after: Option<f32>,
    elapsed_samples: u64,
    finished: bool,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            base_frequency: None,
            sweep: None,
            stop_after: None,
            elapsed_samples: 0,
            finished: false,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn square() -> Self {
        Self::new(OscillatorBlock::square())
    }

    /// Set a fixed frequency, ignoring the pitch from RenderCtx.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.base_frequency = Some(freq);
        self
    }

    /// Glide the frequency along `sweep`, holding its end value afterwards.
    pub fn with_sweep(mut self, sweep: Ramp) -> Self {
        self.sweep = Some(sweep);
        self
    }

    /// Stop generating `seconds` after note-on.
    pub fn stop_after(mut self, seconds: f32) -> Self {
        self.stop_after = Some(seconds.max(0.0));
        self
    }

    fn stopped(&self, sample_rate: f32) -> bool {
        self.stop_after
            .is_some_and(|limit| self.elapsed_samples >= (limit * sample_rate).round() as u64)
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let fixed = self.base_frequency.unwrap_or(ctx.frequency);

        for sample in out.iter_mut() {
            if self.finished || self.stopped(ctx.sample_rate) {
                self.finished = true;
                *sample = 0.0;
                continue;
            }

            let frequency = match self.sweep.as_mut() {
                Some(sweep) => sweep.next_value(ctx.sample_rate),
                None => fixed,
            };
            *sample = self.osc.next_sample(frequency, ctx.sample_rate);
            self.elapsed_samples += 1;
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
        self.elapsed_samples = 0;
        self.finished = false;
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.reset();
        }
    }

    fn is_active(&self) -> bool {
        !self.finished
    }
}
