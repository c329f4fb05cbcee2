//! Voices and the bookkeeping around them.
//!
//! `tone` builds the graph for a note, `pool` owns and renders the live
//! graphs, and `registry` remembers which held note belongs to which voice.

pub mod pool;
pub mod registry;
pub mod tone;
pub mod voice;

pub use pool::VoicePool;
pub use registry::NoteRegistry;
pub use tone::{Tone, ToneProfile};
pub use voice::{VoiceError, VoiceHandle, VoiceId};
