use std::fmt;

use thiserror::Error;

use crate::{
    graph::node::{GraphNode, RenderCtx},
    instrument::Instrument,
    recorder::TakeId,
};

/// Stable identifier of a voice in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub(crate) u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// The voice already ended (or was never there). Stopping it is a no-op.
    #[error("voice {0} has already finished")]
    Finished(VoiceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Sounding,  // Gate open (or one-shot running)
    Releasing, // Fading out, halts at the deadline
}

/// A single sounding graph owned by the pool.
pub struct Voice {
    id: VoiceId,
    instrument: Instrument,
    take: Option<TakeId>,
    state: VoiceState,
    ctx: RenderCtx,
    graph: Box<dyn GraphNode>,
    /// Absolute frame at which the voice is cut off.
    halt_at: Option<u64>,
}

impl Voice {
    pub(crate) fn start(
        id: VoiceId,
        instrument: Instrument,
        mut graph: Box<dyn GraphNode>,
        ctx: RenderCtx,
        take: Option<TakeId>,
    ) -> Self {
        graph.note_on(&ctx);
        Self {
            id,
            instrument,
            take,
            state: VoiceState::Sounding,
            ctx,
            graph,
            halt_at: None,
        }
    }

    /// Close the gate and schedule the halt `tail_frames` from `now`.
    pub(crate) fn release(&mut self, now: u64, tail_frames: u64) {
        if self.state == VoiceState::Releasing {
            return;
        }
        self.state = VoiceState::Releasing;
        self.graph.note_off(&self.ctx);
        self.halt_at = Some(now + tail_frames);
    }

    /// Render one block starting at absolute frame `now`.
    pub(crate) fn render(&mut self, out: &mut [f32], now: u64) {
        self.graph.render_block(out, &self.ctx);

        if let Some(halt_at) = self.halt_at {
            let cut = halt_at.saturating_sub(now).min(out.len() as u64) as usize;
            out[cut..].fill(0.0);
        }
    }

    pub fn is_finished(&self, now: u64) -> bool {
        !self.graph.is_active() || self.halt_at.is_some_and(|halt_at| now >= halt_at)
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn take(&self) -> Option<TakeId> {
        self.take
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn frequency(&self) -> f32 {
        self.ctx.frequency
    }
}

/// What the note registry keeps for a held note.
///
/// Stopping goes through the pool: the gate closes, the envelope fades over
/// its release time and the voice is cut `tail` seconds later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceHandle {
    pub id: VoiceId,
    /// Seconds from stop to halt.
    pub tail: f32,
    /// Playback-rate ratio of a sample voice (1.0 = recorded pitch).
    pub playback_rate: f64,
}
