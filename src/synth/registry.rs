use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    instrument::{Instrument, NoteName},
    synth::{
        pool::VoicePool,
        voice::{VoiceError, VoiceHandle},
    },
};

/// Held notes of one instrument: at most one live voice per note.
#[derive(Debug)]
pub struct NoteRegistry {
    instrument: Instrument,
    active: BTreeMap<NoteName, VoiceHandle>,
}

impl NoteRegistry {
    pub fn new(instrument: Instrument) -> Self {
        Self {
            instrument,
            active: BTreeMap::new(),
        }
    }

    pub fn is_active(&self, note: NoteName) -> bool {
        self.active.contains_key(&note)
    }

    pub fn get(&self, note: NoteName) -> Option<&VoiceHandle> {
        self.active.get(&note)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn notes(&self) -> impl Iterator<Item = NoteName> + '_ {
        self.active.keys().copied()
    }

    /// Remember `handle` for `note`. Returns false (and keeps the existing
    /// voice) if the note is already held.
    pub fn insert(&mut self, note: NoteName, handle: VoiceHandle) -> bool {
        if self.is_active(note) {
            return false;
        }
        self.active.insert(note, handle);
        true
    }

    /// Stop and forget `note`. Returns whether the note was held.
    pub fn stop(&mut self, note: NoteName, pool: &mut VoicePool, now: u64) -> bool {
        match self.active.remove(&note) {
            Some(handle) => {
                self.stop_handle(note, handle, pool, now);
                true
            }
            None => false,
        }
    }

    /// Stop every held note; returns which notes were held.
    pub fn stop_all(&mut self, pool: &mut VoicePool, now: u64) -> Vec<NoteName> {
        let held = std::mem::take(&mut self.active);
        held.into_iter()
            .map(|(note, handle)| {
                self.stop_handle(note, handle, pool, now);
                note
            })
            .collect()
    }

    fn stop_handle(&self, note: NoteName, handle: VoiceHandle, pool: &mut VoicePool, now: u64) {
        match pool.release(handle.id, now, handle.tail) {
            Ok(()) => {}
            Err(VoiceError::Finished(id)) => {
                debug!(instrument = %self.instrument, %note, voice = %id, "stop on finished voice ignored");
            }
        }
    }
}
