/*
Parameter Ramps
===============

Percussion and metronome voices are shaped by a value that starts at one
level and glides to another over a fixed time, then holds:

  Linear       v(t) = v0 + (v1 - v0) * t / T
  Exponential  v(t) = v0 * (v1 / v0) ^ (t / T)

Exponential ramps are how acoustic decays behave: the level drops by the
same ratio in every equal slice of time, so a 0.8 → 0.01 decay sounds even
all the way down instead of lingering and then cutting off.

Both endpoints of an exponential ramp must be strictly positive (the curve
never reaches zero). Callers use 0.01 as "near silence".

After T the ramp holds v1 forever. `is_finished` lets a voice notice that its
shape is over.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampCurve {
    /// Hold one value.
    Constant,
    Linear,
    Exponential,
}

#[derive(Debug, Clone)]
pub struct Ramp {
    curve: RampCurve,
    from: f32,
    to: f32,
    duration: f32,
    elapsed_samples: u64,
}

impl Ramp {
    pub fn constant(value: f32) -> Self {
        Self {
            curve: RampCurve::Constant,
            from: value,
            to: value,
            duration: 0.0,
            elapsed_samples: 0,
        }
    }

    pub fn linear(from: f32, to: f32, duration: f32) -> Self {
        Self {
            curve: RampCurve::Linear,
            from,
            to,
            duration: duration.max(0.0),
            elapsed_samples: 0,
        }
    }

    /// Exponential glide. Non-positive endpoints are lifted to a tiny value.
    pub fn exponential(from: f32, to: f32, duration: f32) -> Self {
        Self {
            curve: RampCurve::Exponential,
            from: from.max(f32::EPSILON),
            to: to.max(f32::EPSILON),
            duration: duration.max(0.0),
            elapsed_samples: 0,
        }
    }

    /// Value `t` seconds after the ramp started.
    pub fn value_at(&self, t: f32) -> f32 {
        if self.curve == RampCurve::Constant || t >= self.duration {
            return self.to;
        }
        let progress = (t / self.duration).max(0.0);
        match self.curve {
            RampCurve::Constant => self.to,
            RampCurve::Linear => self.from + (self.to - self.from) * progress,
            RampCurve::Exponential => self.from * (self.to / self.from).powf(progress),
        }
    }

    /// Current value, then advance by one sample.
    #[inline]
    pub fn next_value(&mut self, sample_rate: f32) -> f32 {
        let value = self.value_at(self.elapsed_samples as f32 / sample_rate);
        self.elapsed_samples += 1;
        value
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_value(sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_samples = 0;
    }

    pub fn is_finished(&self, sample_rate: f32) -> bool {
        self.elapsed_samples as f32 / sample_rate >= self.duration
    }
}
