use std::sync::Arc;

use crate::graph::node::{GraphNode, RenderCtx};

/*
Buffer Playback
===============

Melodic instruments are recordings of one note, replayed faster or slower to
reach every other pitch:

  rate = requested frequency / recorded frequency

  piri sample recorded at C5 (523.25 Hz)
    C5 → rate 1.0
    C4 → rate 0.5   (one octave down, half speed)
    A4 → rate 0.8409

The read head advances `rate * buffer_rate / output_rate` frames per output
sample, so a buffer decoded at 48 kHz still plays at the right pitch on a
44.1 kHz device. Fractional positions are read with linear interpolation.

Two modes:

  one-shot  play from the start to the end, then go silent and inactive
  looping   play from the start; whenever the head passes the loop end it
            jumps back by the loop length, forever

The loop region of a sustained tone is inset from both ends so the breathy
onset and the decay tail of the recording are not repeated:

  0 ─── margin ════════ loop ════════ duration - margin ─── duration
*/

/// Loop bounds in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopRegion {
    pub start: f32,
    pub end: f32,
}

impl LoopRegion {
    /// Inset `margin` seconds from each end; the whole buffer if it is too
    /// short to leave anything in between.
    pub fn inset(duration: f32, margin: f32) -> Self {
        if duration > 2.0 * margin {
            Self {
                start: margin,
                end: duration - margin,
            }
        } else {
            Self {
                start: 0.0,
                end: duration,
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PlayMode {
    Once,
    Loop { start: f64, end: f64 },
}

pub struct SampleNode {
    buffer: Arc<[f32]>,
    buffer_rate: f32,
    rate: f64,
    mode: PlayMode,
    position: f64,
    finished: bool,
}

impl SampleNode {
    /// Play `buffer` once at its recorded speed.
    pub fn one_shot(buffer: Arc<[f32]>, buffer_rate: f32) -> Self {
        Self {
            buffer,
            buffer_rate,
            rate: 1.0,
            mode: PlayMode::Once,
            position: 0.0,
            finished: false,
        }
    }

    /// Loop `region` of `buffer` indefinitely at `rate`.
    pub fn looping(buffer: Arc<[f32]>, buffer_rate: f32, rate: f64, region: LoopRegion) -> Self {
        let len = buffer.len() as f64;
        // loop points land on whole frames
        let start = (region.start as f64 * buffer_rate as f64).round().clamp(0.0, len);
        let end = (region.end as f64 * buffer_rate as f64).round().clamp(start, len);

        Self {
            buffer,
            buffer_rate,
            rate,
            mode: PlayMode::Loop { start, end },
            position: 0.0,
            finished: false,
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Playback-rate ratio (1.0 = recorded pitch).
    pub fn rate(&self) -> f64 {
        self.rate
    }

    fn read_interpolated(&self, position: f64) -> f32 {
        let len = self.buffer.len();
        if len == 0 || position < 0.0 {
            return 0.0;
        }

        let idx = position as usize;
        if idx + 1 >= len {
            return self.buffer.get(idx).copied().unwrap_or(0.0);
        }

        let frac = (position - idx as f64) as f32;
        self.buffer[idx] * (1.0 - frac) + self.buffer[idx + 1] * frac
    }
}

impl GraphNode for SampleNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let step = self.rate * self.buffer_rate as f64 / ctx.sample_rate as f64;
        let len = self.buffer.len() as f64;

        for sample in out.iter_mut() {
            if self.finished {
                *sample = 0.0;
                continue;
            }

            *sample = self.read_interpolated(self.position);
            self.position += step;

            match self.mode {
                PlayMode::Loop { start, end } if end > start => {
                    if self.position >= end {
                        self.position = start + (self.position - end) % (end - start);
                    }
                }
                _ => {
                    if self.position >= len {
                        self.finished = true;
                    }
                }
            }
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.position = 0.0;
        self.finished = self.buffer.is_empty();
    }

    fn is_active(&self) -> bool {
        !self.finished
    }
}
