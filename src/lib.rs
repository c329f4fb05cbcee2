pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod instrument; // Instruments, notes and key tables
pub mod io;
pub mod metronome;
pub mod recorder;
pub mod router; // Keyboard/pointer input → actions
pub mod samples;
pub mod session;
pub mod synth; // Tone synthesis, voice pool and note registry

pub use error::{Error, Result};
pub use instrument::{Instrument, NoteId, NoteName, PercussionSound};
pub use router::InputEvent;
pub use session::{Action, Outcome, Session};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
