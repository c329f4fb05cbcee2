//! Composable building blocks for constructing voice graphs.
//!
//! Graph nodes wrap the DSP primitives with what a voice needs: note-on and
//! note-off events, block rendering, and an "am I still sounding" query the
//! voice pool uses to retire finished voices. The `extensions` module adds
//! fluent helpers so each instrument's recipe reads as a signal chain:
//!
//! ```ignore
//! SampleNode::looping(buffer, rate, region)
//!     .through(FilterNode::lowpass(3000.0))
//!     .amplify(EnvNode::new(shape))
//! ```

/// Multiply a signal by a control signal (envelopes).
pub mod amplify;
/// Gated envelope node for sustained tones.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.through()`, `.mix()`, `.gain()`).
pub mod extensions;
/// Low-pass / band-pass filter node.
pub mod filter;
/// Scheduled gain ramps (fixed level, exponential decay).
pub mod gain;
/// Summing two parallel graphs.
pub mod mix;
/// Core traits shared by all graph nodes.
pub mod node;
/// Tone generators with optional pitch sweep and stop time.
pub mod oscillator;
/// Buffer-backed players (looping and one-shot).
pub mod sampler;
/// Serial chaining of two nodes (source → effect).
pub mod through;

pub use extensions::NodeExt;
pub use node::{GraphNode, RenderCtx};
