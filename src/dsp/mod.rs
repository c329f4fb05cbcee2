//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components hold only their own state and never allocate while
//! rendering, so they can live directly inside voice graphs. The graph layer
//! adds note events and block rendering on top.

/// Gated attack/decay/sustain/release envelope for sustained tones.
pub mod envelope;
/// State-variable filter with low-pass and band-pass responses.
pub mod filter;
/// Phase-accumulating oscillators and white noise.
pub mod oscillator;
/// Scheduled parameter ramps (linear and exponential).
pub mod ramp;

pub use envelope::EnvelopeState;
