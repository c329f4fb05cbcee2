//! The three instruments, their note identifiers and percussion sound table.

pub mod notes;

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

pub use notes::NoteName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    /// Double-reed wind instrument, sample based.
    Piri,
    /// Two-string bowed fiddle, sample based.
    Haegeum,
    /// Hourglass drum, one-shot samples with a synthesized fallback.
    Janggu,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Piri, Instrument::Haegeum, Instrument::Janggu];

    pub fn as_str(self) -> &'static str {
        match self {
            Instrument::Piri => "piri",
            Instrument::Haegeum => "haegeum",
            Instrument::Janggu => "janggu",
        }
    }

    fn index(self) -> usize {
        match self {
            Instrument::Piri => 0,
            Instrument::Haegeum => 1,
            Instrument::Janggu => 2,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strokes of the janggu. The left (bass) head takes kung/duk/gideok, the
/// right (stick) head takes tak/tta/roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercussionSound {
    Kung,
    Duk,
    Gideok,
    Tak,
    Tta,
    Roll,
}

impl PercussionSound {
    pub const ALL: [PercussionSound; 6] = [
        PercussionSound::Kung,
        PercussionSound::Duk,
        PercussionSound::Gideok,
        PercussionSound::Tak,
        PercussionSound::Tta,
        PercussionSound::Roll,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PercussionSound::Kung => "kung",
            PercussionSound::Duk => "duk",
            PercussionSound::Gideok => "gideok",
            PercussionSound::Tak => "tak",
            PercussionSound::Tta => "tta",
            PercussionSound::Roll => "roll",
        }
    }

    /// Synthesis recipe used when no sample is loaded for this stroke.
    pub fn params(self) -> PercussionParams {
        use SoundCategory::*;
        let (frequency, decay, category) = match self {
            PercussionSound::Kung => (80.0, 0.4, Bass),
            PercussionSound::Duk => (120.0, 0.3, Bass),
            PercussionSound::Gideok => (100.0, 0.25, Bass),
            PercussionSound::Tak => (800.0, 0.1, Sharp),
            PercussionSound::Tta => (1000.0, 0.15, Sharp),
            PercussionSound::Roll => (600.0, 0.08, Roll),
        };
        PercussionParams {
            frequency,
            decay,
            category,
        }
    }

    pub fn head(self) -> DrumHead {
        match self.params().category {
            SoundCategory::Bass => DrumHead::Left,
            SoundCategory::Sharp | SoundCategory::Roll => DrumHead::Right,
        }
    }
}

impl fmt::Display for PercussionSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the drum a stroke lands on (drives the head highlight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumHead {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCategory {
    /// Membrane hit: pitch-swept sine through a low-pass.
    Bass,
    /// Stick hit: band-passed square plus a noise burst.
    Sharp,
    /// Stick roll, voiced with the sharp recipe.
    Roll,
}

/// Structured synthesis parameters for one percussion stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercussionParams {
    /// Target pitch in Hz.
    pub frequency: f32,
    /// Seconds for the main envelope to fall to near silence.
    pub decay: f32,
    pub category: SoundCategory,
}

/// What a key or button asks an instrument to sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteId {
    Pitch(NoteName),
    Percussion(PercussionSound),
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteId::Pitch(note) => note.fmt(f),
            NoteId::Percussion(sound) => sound.fmt(f),
        }
    }
}

impl From<NoteName> for NoteId {
    fn from(note: NoteName) -> Self {
        NoteId::Pitch(note)
    }
}

impl From<PercussionSound> for NoteId {
    fn from(sound: PercussionSound) -> Self {
        NoteId::Percussion(sound)
    }
}

/// One value per instrument, indexed by [`Instrument`].
#[derive(Debug, Clone, Default)]
pub struct PerInstrument<T>([T; 3]);

impl<T> PerInstrument<T> {
    pub fn from_fn(mut f: impl FnMut(Instrument) -> T) -> Self {
        Self(Instrument::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Instrument, &T)> {
        Instrument::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Instrument, &mut T)> {
        Instrument::ALL.into_iter().zip(self.0.iter_mut())
    }
}

impl<T> Index<Instrument> for PerInstrument<T> {
    type Output = T;

    fn index(&self, instrument: Instrument) -> &T {
        &self.0[instrument.index()]
    }
}

impl<T> IndexMut<Instrument> for PerInstrument<T> {
    fn index_mut(&mut self, instrument: Instrument) -> &mut T {
        &mut self.0[instrument.index()]
    }
}
