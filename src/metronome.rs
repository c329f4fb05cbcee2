//! Per-instrument click track.
//!
//! The metronome is driven by the session's sample clock rather than a wall
//! timer: the session asks it whether a click is due before rendering each
//! segment, so one metronome can never have two timers.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Beats per minute, always within [`Tempo::MIN`]..=[`Tempo::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u16")]
pub struct Tempo(u16);

impl Tempo {
    pub const MIN: u16 = 40;
    pub const MAX: u16 = 240;
    pub const DEFAULT: Tempo = Tempo(120);

    /// Clamp any requested BPM into range.
    pub fn new(bpm: i64) -> Self {
        Tempo(bpm.clamp(Self::MIN as i64, Self::MAX as i64) as u16)
    }

    pub fn bpm(self) -> u16 {
        self.0
    }

    /// Shift by `delta` BPM, staying in range.
    pub fn nudge(self, delta: i64) -> Self {
        Self::new(self.0 as i64 + delta)
    }

    /// Frames between clicks at `sample_rate`.
    pub fn period_frames(self, sample_rate: f32) -> f64 {
        sample_rate as f64 * 60.0 / self.0 as f64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for Tempo {
    fn from(bpm: i64) -> Self {
        Tempo::new(bpm)
    }
}

impl From<Tempo> for u16 {
    fn from(tempo: Tempo) -> Self {
        tempo.0
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetronomeState {
    Stopped,
    Running {
        /// Absolute frame of the next click (fractional, no drift).
        next_click: f64,
        period: f64,
    },
}

#[derive(Debug, Clone)]
pub struct Metronome {
    sample_rate: f32,
    tempo: Tempo,
    state: MetronomeState,
}

impl Metronome {
    pub fn new(sample_rate: f32, tempo: Tempo) -> Self {
        Self {
            sample_rate,
            tempo,
            state: MetronomeState::Stopped,
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn state(&self) -> MetronomeState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, MetronomeState::Running { .. })
    }

    /// Start clicking, first click at `now`. No-op while running.
    pub fn start(&mut self, now: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.restart(now);
        true
    }

    /// No-op while stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = MetronomeState::Stopped;
        debug!("metronome stopped");
        true
    }

    /// Returns whether the metronome runs afterwards.
    pub fn toggle(&mut self, now: u64) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start(now);
        }
        self.is_running()
    }

    /// Set the tempo (clamped). A running metronome restarts its timer with
    /// an immediate click; setting the current tempo again changes nothing.
    pub fn set_tempo(&mut self, tempo: Tempo, now: u64) -> Tempo {
        if tempo == self.tempo {
            return self.tempo;
        }
        self.tempo = tempo;
        if self.is_running() {
            self.restart(now);
        }
        self.tempo
    }

    fn restart(&mut self, now: u64) {
        let period = self.tempo.period_frames(self.sample_rate);
        self.state = MetronomeState::Running {
            next_click: now as f64,
            period,
        };
        debug!(tempo = self.tempo.bpm(), period, "metronome running");
    }

    fn next_click_frame(&self) -> Option<u64> {
        match self.state {
            MetronomeState::Stopped => None,
            MetronomeState::Running { next_click, .. } => Some(next_click.ceil() as u64),
        }
    }

    /// Consume the click due at or before `now`, if any.
    pub fn take_due(&mut self, now: u64) -> bool {
        match &mut self.state {
            MetronomeState::Running { next_click, period } if now >= next_click.ceil() as u64 => {
                *next_click += *period;
                true
            }
            _ => false,
        }
    }

    /// Frames from `now` until the next click (0 if one is due).
    pub fn frames_until_next(&self, now: u64) -> Option<u64> {
        self.next_click_frame().map(|next| next.saturating_sub(now))
    }
}
