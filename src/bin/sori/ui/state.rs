//! What the UI draws, copied out of the session once per frame so the lock
//! is held only briefly.

use sori::{metronome::Tempo, Instrument, NoteId, Session};

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub page: Instrument,
    pub sample_rate: f32,
    pub tempo: Tempo,
    pub metronome_running: bool,
    pub recording: bool,
    /// Seconds in the last finished take, if any.
    pub last_take: Option<f32>,
    pub lit: Vec<NoteId>,
    pub loading: bool,
    pub loaded_samples: usize,
    pub voices: usize,
}

impl Snapshot {
    pub fn capture(session: &Session) -> Self {
        let page = session.page();
        let metronome = session.metronome(page);
        let recorder = session.recorder(page);

        Self {
            page,
            sample_rate: session.sample_rate(),
            tempo: metronome.tempo(),
            metronome_running: metronome.is_running(),
            recording: recorder.is_recording(),
            last_take: recorder.recording().map(|take| take.duration()),
            lit: session.highlighted(page),
            loading: session.is_loading(),
            loaded_samples: session.samples().loaded_count(),
            voices: session.pool().len(),
        }
    }
}
