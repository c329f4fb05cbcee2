use crate::{graph::node::RenderCtx, MIN_TIME};

/*
Sustained Tone Envelope
=======================

Held notes (piri, haegeum) are shaped by a gated, linear envelope whose
output is the voice gain itself, not a 0..1 control that still needs
scaling:

  Gain
   peak ┐    ╱╲
        │   ╱  ╲__________
 sustain│  ╱              ╲
        │ ╱                ╲
    0.0 └╱──────────────────╲──→ Time
        Attack Decay Sustain Release

  attack    seconds from 0 to `peak` after the gate opens
  decay     seconds from `peak` down to `sustain` (skipped when equal)
  release   seconds from the CURRENT level to 0 after the gate closes

Release always starts from wherever the level is, so letting go of a key in
the middle of the attack fades out without a click.

Per-sample increments are recomputed from the sample rate on every sample:

    increment = (target - start) / (seconds * sample_rate)

Release is pre-computed at gate-off as a start level and a sample count, so
it lands on exactly 0.0 and the envelope goes Idle.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low and silent
    Attack,  // Rising towards peak
    Decay,   // Falling from peak to sustain
    Sustain, // Holding while the gate stays high
    Release, // Gate low, fading to 0
}

/// Shape of a sustained tone's gain over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub attack: f32,
    pub decay: f32,
    pub peak: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeShape {
    /// Attack to `peak`, then hold there (no decay stage).
    pub fn attack_hold(attack: f32, peak: f32, release: f32) -> Self {
        Self {
            attack,
            decay: 0.0,
            peak,
            sustain: peak,
            release,
        }
    }
}

pub struct Envelope {
    shape: EnvelopeShape,

    stage: EnvelopeState,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn new(shape: EnvelopeShape) -> Self {
        let peak = shape.peak.max(0.0);
        Self {
            shape: EnvelopeShape {
                attack: shape.attack.max(MIN_TIME),
                decay: shape.decay.max(MIN_TIME),
                peak,
                sustain: shape.sustain.clamp(0.0, peak),
                release: shape.release.max(MIN_TIME),
            },
            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: attack from silence.
    pub fn note_on(&mut self, _ctx: &RenderCtx) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: fade out from the current level.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.shape.release * ctx.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    pub fn next_sample(&mut self, ctx: &RenderCtx) {
        let EnvelopeShape {
            attack,
            decay,
            peak,
            sustain,
            ..
        } = self.shape;

        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += peak / (attack * ctx.sample_rate);

                if self.level >= peak {
                    self.level = peak;
                    self.stage = if sustain < peak {
                        EnvelopeState::Decay
                    } else {
                        EnvelopeState::Sustain
                    };
                }
            }

            EnvelopeState::Decay => {
                self.level -= (peak - sustain) / (decay * ctx.sample_rate);

                if self.level <= sustain {
                    self.level = sustain;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = sustain;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            self.next_sample(ctx);
            *sample = self.level;
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
