//! Keyboard and pointer input → session actions.
//!
//! | page    | keys              | notes                          |
//! | ------- | ----------------- | ------------------------------ |
//! | piri    | a s d f g h j k   | C4 D4 E4 F4 G4 A4 B4 C5        |
//! | haegeum | z x c v b n m ,   | G3 A3 B3 C4 D4 E4 F4 G4        |
//! | janggu  | q w e / i o p     | kung duk gideok / tak tta roll |
//!
//! A key only reaches its instrument while that instrument's page is shown.
//! Auto-repeat of a held key is swallowed. Drum strokes are one-shots, so
//! releasing a drum key or button does nothing.

use std::collections::HashSet;

use crate::{
    instrument::{Instrument, NoteId, NoteName, PercussionSound},
    session::Action,
};

/// Raw input as the front end sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(char),
    KeyUp(char),
    /// Pointer/touch pressed on a note button.
    Press(Instrument, NoteId),
    Release(Instrument, NoteId),
    ShowPage(Instrument),
}

/// The instrument and note bound to `key` (case-insensitive).
pub fn key_binding(key: char) -> Option<(Instrument, NoteId)> {
    use NoteName::*;
    use PercussionSound::*;

    let binding: (Instrument, NoteId) = match key.to_ascii_lowercase() {
        'a' => (Instrument::Piri, C4.into()),
        's' => (Instrument::Piri, D4.into()),
        'd' => (Instrument::Piri, E4.into()),
        'f' => (Instrument::Piri, F4.into()),
        'g' => (Instrument::Piri, G4.into()),
        'h' => (Instrument::Piri, A4.into()),
        'j' => (Instrument::Piri, B4.into()),
        'k' => (Instrument::Piri, C5.into()),

        'z' => (Instrument::Haegeum, G3.into()),
        'x' => (Instrument::Haegeum, A3.into()),
        'c' => (Instrument::Haegeum, B3.into()),
        'v' => (Instrument::Haegeum, C4.into()),
        'b' => (Instrument::Haegeum, D4.into()),
        'n' => (Instrument::Haegeum, E4.into()),
        'm' => (Instrument::Haegeum, F4.into()),
        ',' => (Instrument::Haegeum, G4.into()),

        'q' => (Instrument::Janggu, Kung.into()),
        'w' => (Instrument::Janggu, Duk.into()),
        'e' => (Instrument::Janggu, Gideok.into()),
        'i' => (Instrument::Janggu, Tak.into()),
        'o' => (Instrument::Janggu, Tta.into()),
        'p' => (Instrument::Janggu, Roll.into()),

        _ => return None,
    };
    Some(binding)
}

/// Key bound to `note` on `instrument`, for on-screen labels.
pub fn key_for(instrument: Instrument, note: NoteId) -> Option<char> {
    "asdfghjkzxcvbnm,qweiop"
        .chars()
        .find(|&key| key_binding(key) == Some((instrument, note)))
}

#[derive(Debug)]
pub struct InputRouter {
    page: Instrument,
    held: HashSet<char>,
}

impl InputRouter {
    pub fn new(page: Instrument) -> Self {
        Self {
            page,
            held: HashSet::new(),
        }
    }

    pub fn page(&self) -> Instrument {
        self.page
    }

    /// Show `page`. Keys stay held until their release arrives, so a key
    /// held across the switch does not retrigger on auto-repeat.
    pub fn set_page(&mut self, page: Instrument) {
        self.page = page;
    }

    pub fn is_held(&self, key: char) -> bool {
        self.held.contains(&key.to_ascii_lowercase())
    }

    /// Translate one event. `None` means the event is dropped.
    pub fn route(&mut self, event: InputEvent) -> Option<Action> {
        match event {
            InputEvent::KeyDown(key) => {
                let key = key.to_ascii_lowercase();
                let (instrument, note) = key_binding(key)?;
                if !self.held.insert(key) {
                    return None;
                }
                self.press(instrument, note)
            }
            InputEvent::KeyUp(key) => {
                let key = key.to_ascii_lowercase();
                let (instrument, note) = key_binding(key)?;
                self.held.remove(&key);
                self.release(instrument, note)
            }
            InputEvent::Press(instrument, note) => self.press(instrument, note),
            InputEvent::Release(instrument, note) => self.release(instrument, note),
            InputEvent::ShowPage(page) => {
                self.set_page(page);
                Some(Action::SwitchPage(page))
            }
        }
    }

    fn press(&self, instrument: Instrument, note: NoteId) -> Option<Action> {
        (instrument == self.page).then_some(Action::Play { instrument, note })
    }

    fn release(&self, instrument: Instrument, note: NoteId) -> Option<Action> {
        match note {
            NoteId::Pitch(note) if instrument == self.page => {
                Some(Action::Stop { instrument, note })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_table_matches_pages() {
        assert_eq!(key_binding('a'), Some((Instrument::Piri, NoteName::C4.into())));
        assert_eq!(key_binding('K'), Some((Instrument::Piri, NoteName::C5.into())));
        assert_eq!(key_binding(','), Some((Instrument::Haegeum, NoteName::G4.into())));
        assert_eq!(key_binding('p'), Some((Instrument::Janggu, PercussionSound::Roll.into())));
        assert_eq!(key_binding('1'), None);
        assert_eq!(key_for(Instrument::Haegeum, NoteName::C4.into()), Some('v'));
    }

    #[test]
    fn held_key_repeat_is_suppressed() {
        let mut router = InputRouter::new(Instrument::Piri);

        assert_eq!(
            router.route(InputEvent::KeyDown('a')),
            Some(Action::Play {
                instrument: Instrument::Piri,
                note: NoteName::C4.into()
            })
        );
        assert_eq!(router.route(InputEvent::KeyDown('a')), None);
        assert_eq!(router.route(InputEvent::KeyDown('A')), None);

        assert_eq!(
            router.route(InputEvent::KeyUp('a')),
            Some(Action::Stop {
                instrument: Instrument::Piri,
                note: NoteName::C4
            })
        );
        assert!(router.route(InputEvent::KeyDown('a')).is_some());
    }

    #[test]
    fn keys_for_other_pages_are_gated() {
        let mut router = InputRouter::new(Instrument::Haegeum);

        assert_eq!(router.route(InputEvent::KeyDown('a')), None);
        assert_eq!(router.route(InputEvent::KeyUp('a')), None);
        assert_eq!(router.route(InputEvent::KeyDown('q')), None);
        assert!(router.route(InputEvent::KeyDown('z')).is_some());
    }

    #[test]
    fn drum_release_does_nothing() {
        let mut router = InputRouter::new(Instrument::Janggu);
        let kung = NoteId::from(PercussionSound::Kung);

        assert!(router.route(InputEvent::KeyDown('q')).is_some());
        assert_eq!(router.route(InputEvent::KeyUp('q')), None);
        assert!(router.route(InputEvent::Press(Instrument::Janggu, kung)).is_some());
        assert_eq!(router.route(InputEvent::Release(Instrument::Janggu, kung)), None);
    }

    #[test]
    fn pointer_maps_to_play_and_stop() {
        let mut router = InputRouter::new(Instrument::Piri);
        let e4 = NoteId::from(NoteName::E4);

        assert_eq!(
            router.route(InputEvent::Press(Instrument::Piri, e4)),
            Some(Action::Play {
                instrument: Instrument::Piri,
                note: e4
            })
        );
        assert_eq!(
            router.route(InputEvent::Release(Instrument::Piri, e4)),
            Some(Action::Stop {
                instrument: Instrument::Piri,
                note: NoteName::E4
            })
        );
    }

    #[test]
    fn key_held_across_page_switch_waits_for_release() {
        let mut router = InputRouter::new(Instrument::Piri);
        assert!(router.route(InputEvent::KeyDown('a')).is_some());

        assert_eq!(
            router.route(InputEvent::ShowPage(Instrument::Haegeum)),
            Some(Action::SwitchPage(Instrument::Haegeum))
        );
        assert_eq!(router.page(), Instrument::Haegeum);
        assert!(router.is_held('a'));

        router.route(InputEvent::ShowPage(Instrument::Piri));
        assert_eq!(router.route(InputEvent::KeyDown('a')), None);

        router.route(InputEvent::KeyUp('a'));
        assert!(!router.is_held('a'));
        assert_eq!(
            router.route(InputEvent::KeyDown('a')),
            Some(Action::Play {
                instrument: Instrument::Piri,
                note: NoteName::C4.into()
            })
        );
    }
}
