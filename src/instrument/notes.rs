/*
Note Table
==========

The melodic instruments only ever play a fixed set of pitches, so notes are
an enum rather than MIDI numbers. Each name maps to a frequency from a static
equal-temperament table (A4 = 440 Hz), rounded to two decimals:

    G3 196.00   C4 261.63   F4 349.23   B4 493.88
    A3 220.00   D4 293.66   G4 392.00   C5 523.25
    B3 246.94   E4 329.63   A4 440.00   D5 587.33

Naming convention matches the usual letter + octave form, middle C = C4.
The piri is keyed C4..C5, the haegeum G3..G4. D5 is in the table but no key
or button plays it.
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName {
    G3,
    A3,
    B3,
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    B4,
    C5,
    D5,
}

impl NoteName {
    pub const ALL: [NoteName; 12] = [
        NoteName::G3,
        NoteName::A3,
        NoteName::B3,
        NoteName::C4,
        NoteName::D4,
        NoteName::E4,
        NoteName::F4,
        NoteName::G4,
        NoteName::A4,
        NoteName::B4,
        NoteName::C5,
        NoteName::D5,
    ];

    /// Frequency in Hz from the static table.
    pub fn frequency(self) -> f32 {
        match self {
            NoteName::G3 => 196.00,
            NoteName::A3 => 220.00,
            NoteName::B3 => 246.94,
            NoteName::C4 => 261.63,
            NoteName::D4 => 293.66,
            NoteName::E4 => 329.63,
            NoteName::F4 => 349.23,
            NoteName::G4 => 392.00,
            NoteName::A4 => 440.00, // tuning reference
            NoteName::B4 => 493.88,
            NoteName::C5 => 523.25,
            NoteName::D5 => 587.33,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::G3 => "G3",
            NoteName::A3 => "A3",
            NoteName::B3 => "B3",
            NoteName::C4 => "C4",
            NoteName::D4 => "D4",
            NoteName::E4 => "E4",
            NoteName::F4 => "F4",
            NoteName::G4 => "G4",
            NoteName::A4 => "A4",
            NoteName::B4 => "B4",
            NoteName::C5 => "C5",
            NoteName::D5 => "D5",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteName::ALL
            .into_iter()
            .find(|note| note.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown note name '{s}'"))
    }
}
