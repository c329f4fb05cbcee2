//! The running instrument session.
//!
//! `Session` owns everything that used to be ambient state: the sample store,
//! the voice pool, each instrument's held notes, metronome and recorder, the
//! highlight state and the sample clock. The UI thread dispatches actions and
//! the audio callback renders blocks; both go through the same
//! `Arc<Mutex<Session>>`, so actions apply in arrival order.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};

#[cfg(feature = "rtrb")]
use rtrb::Producer;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    graph::sampler::SampleNode,
    instrument::{Instrument, NoteId, NoteName, PerInstrument, PercussionSound},
    metronome::{Metronome, Tempo},
    recorder::{Recorder, Recording},
    router::{InputEvent, InputRouter},
    samples::SampleStore,
    synth::{tone, NoteRegistry, VoiceHandle, VoicePool},
    Result, MAX_BLOCK_SIZE,
};

/// Seconds a drum button stays lit after a stroke.
pub const FLASH_SECONDS: f32 = 0.15;

/// Everything the player can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Play { instrument: Instrument, note: NoteId },
    Stop { instrument: Instrument, note: NoteName },
    StopAll(Instrument),
    SwitchPage(Instrument),
    ToggleMetronome(Instrument),
    SetTempo(Instrument, Tempo),
    /// Shift the tempo by a number of BPM.
    NudgeTempo(Instrument, i64),
    ToggleRecording(Instrument),
    PlayRecording(Instrument),
    DownloadRecording(Instrument),
}

/// What came of a dispatched action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    /// Nothing to do (note already held, nothing recorded, ...).
    Ignored,
    /// A recording was written to this path.
    Saved(PathBuf),
}

#[derive(Debug, Clone, Copy)]
struct Flash {
    sound: PercussionSound,
    until: u64,
}

pub struct Session {
    sample_rate: f32,
    clock: u64,
    samples: SampleStore,
    loading: bool,
    pool: VoicePool,
    registries: PerInstrument<NoteRegistry>,
    metronomes: PerInstrument<Metronome>,
    recorders: PerInstrument<Recorder>,
    router: InputRouter,
    flashes: Vec<Flash>,
    output_dir: PathBuf,
    #[cfg(feature = "rtrb")]
    scope: Option<Producer<f32>>,
}

impl Session {
    /// A session rendering at the sample store's rate.
    pub fn new(samples: SampleStore, config: &Config) -> Self {
        let sample_rate = samples.sample_rate();
        let tempo = config.metronome.tempo();
        let format = config.recording.format.as_str();

        Self {
            sample_rate,
            clock: 0,
            samples,
            loading: false,
            pool: VoicePool::new(sample_rate),
            registries: PerInstrument::from_fn(NoteRegistry::new),
            metronomes: PerInstrument::from_fn(|_| Metronome::new(sample_rate, tempo)),
            recorders: PerInstrument::from_fn(|instrument| {
                Recorder::new(instrument, sample_rate, format)
            }),
            router: InputRouter::new(Instrument::Piri),
            flashes: Vec::new(),
            output_dir: config.recording.output_dir.clone(),
            #[cfg(feature = "rtrb")]
            scope: None,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn now(&self) -> u64 {
        self.clock
    }

    pub fn page(&self) -> Instrument {
        self.router.page()
    }

    pub fn samples(&self) -> &SampleStore {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut SampleStore {
        &mut self.samples
    }

    pub fn registry(&self, instrument: Instrument) -> &NoteRegistry {
        &self.registries[instrument]
    }

    pub fn metronome(&self, instrument: Instrument) -> &Metronome {
        &self.metronomes[instrument]
    }

    pub fn recorder(&self, instrument: Instrument) -> &Recorder {
        &self.recorders[instrument]
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    /// Held notes across all instruments.
    pub fn active_note_count(&self) -> usize {
        self.registries.iter().map(|(_, r)| r.len()).sum()
    }

    /// Stream every rendered block to `producer` (oscilloscope).
    #[cfg(feature = "rtrb")]
    pub fn attach_scope(&mut self, producer: Producer<f32>) {
        self.scope = Some(producer);
    }

    /// Route a raw input event and dispatch the resulting action.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<Outcome> {
        match self.router.route(event) {
            Some(action) => self.dispatch(action),
            None => Ok(Outcome::Ignored),
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        debug!(?action, "dispatch");
        match action {
            Action::Play { instrument, note } => self.play(instrument, note),
            Action::Stop { instrument, note } => Ok(applied(self.stop_note(instrument, note))),
            Action::StopAll(instrument) => {
                self.stop_all(instrument);
                Ok(Outcome::Applied)
            }
            Action::SwitchPage(page) => {
                self.switch_page(page);
                Ok(Outcome::Applied)
            }
            Action::ToggleMetronome(instrument) => {
                self.toggle_metronome(instrument);
                Ok(Outcome::Applied)
            }
            Action::SetTempo(instrument, tempo) => {
                self.set_tempo(instrument, tempo);
                Ok(Outcome::Applied)
            }
            Action::NudgeTempo(instrument, delta) => {
                let tempo = self.metronomes[instrument].tempo().nudge(delta);
                self.set_tempo(instrument, tempo);
                Ok(Outcome::Applied)
            }
            Action::ToggleRecording(instrument) => self.toggle_recording(instrument),
            Action::PlayRecording(instrument) => Ok(applied(self.play_recording(instrument))),
            Action::DownloadRecording(instrument) => self.download_recording(instrument),
        }
    }

    /// Sound `note` on `instrument`.
    ///
    /// Held notes are ignored while already sounding. Melodic instruments fail
    /// with `SampleNotLoaded` until their sample is in the store; drums fall
    /// back to synthesis.
    pub fn play(&mut self, instrument: Instrument, note: NoteId) -> Result<Outcome> {
        match (instrument, note) {
            (Instrument::Janggu, NoteId::Percussion(sound)) => {
                self.strike(sound);
                Ok(Outcome::Applied)
            }
            (Instrument::Piri | Instrument::Haegeum, NoteId::Pitch(note)) => {
                if self.registries[instrument].is_active(note) {
                    return Ok(Outcome::Ignored);
                }

                let tone = tone::sustained(&self.samples, instrument, note.frequency())?;
                let take = self.recorders[instrument].current_take();
                let id = self.pool.spawn(instrument, tone.graph, tone.frequency, take);
                let handle = VoiceHandle {
                    id,
                    tail: tone.tail.unwrap_or_default(),
                    playback_rate: tone.playback_rate,
                };
                self.registries[instrument].insert(note, handle);
                Ok(Outcome::Applied)
            }
            _ => {
                warn!(%instrument, %note, "note does not belong to instrument");
                Ok(Outcome::Ignored)
            }
        }
    }

    fn strike(&mut self, sound: PercussionSound) {
        let tone = tone::percussion(&self.samples, sound);
        let take = self.recorders[Instrument::Janggu].current_take();
        self.pool.spawn(Instrument::Janggu, tone.graph, tone.frequency, take);

        let until = self.clock + (FLASH_SECONDS * self.sample_rate).round() as u64;
        self.flashes.retain(|flash| flash.sound != sound);
        self.flashes.push(Flash { sound, until });
    }

    /// Release a held note. Returns whether it was held.
    pub fn stop_note(&mut self, instrument: Instrument, note: NoteName) -> bool {
        self.registries[instrument].stop(note, &mut self.pool, self.clock)
    }

    pub fn stop_all(&mut self, instrument: Instrument) {
        let stopped = self.registries[instrument].stop_all(&mut self.pool, self.clock);
        if !stopped.is_empty() {
            debug!(%instrument, count = stopped.len(), "stopped all notes");
        }
    }

    /// Show `page`: every sounding note on every instrument stops and all
    /// highlights clear.
    pub fn switch_page(&mut self, page: Instrument) {
        for instrument in Instrument::ALL {
            self.stop_all(instrument);
        }
        self.flashes.clear();
        self.router.set_page(page);
        info!(%page, "page shown");
    }

    /// Notes currently lit on `instrument`'s page.
    pub fn highlighted(&self, instrument: Instrument) -> Vec<NoteId> {
        match instrument {
            Instrument::Janggu => self
                .flashes
                .iter()
                .filter(|flash| flash.until > self.clock)
                .map(|flash| NoteId::Percussion(flash.sound))
                .collect(),
            _ => self.registries[instrument].notes().map(NoteId::Pitch).collect(),
        }
    }

    /// Returns whether the metronome runs afterwards.
    pub fn toggle_metronome(&mut self, instrument: Instrument) -> bool {
        let running = self.metronomes[instrument].toggle(self.clock);
        info!(%instrument, running, "metronome toggled");
        running
    }

    pub fn set_tempo(&mut self, instrument: Instrument, tempo: Tempo) -> Tempo {
        self.metronomes[instrument].set_tempo(tempo, self.clock)
    }

    pub fn toggle_recording(&mut self, instrument: Instrument) -> Result<Outcome> {
        if self.recorders[instrument].is_recording() {
            self.stop_recording(instrument)?;
        } else {
            self.start_recording(instrument);
        }
        Ok(Outcome::Applied)
    }

    /// Begin a fresh take. A take already in flight is discarded.
    pub fn start_recording(&mut self, instrument: Instrument) {
        self.recorders[instrument].start();
    }

    pub fn stop_recording(&mut self, instrument: Instrument) -> Result<Option<&Recording>> {
        self.recorders[instrument].stop()
    }

    /// Play the last recording once at its recorded speed.
    pub fn play_recording(&mut self, instrument: Instrument) -> bool {
        let Some(recording) = self.recorders[instrument].recording() else {
            debug!(%instrument, "nothing recorded yet");
            return false;
        };
        let Some((buffer, rate)) = recording.playback_buffer() else {
            return false;
        };

        let node = SampleNode::one_shot(buffer, rate);
        self.pool.spawn(instrument, Box::new(node), 0.0, None);
        true
    }

    /// Save the last recording into the configured output directory.
    pub fn download_recording(&mut self, instrument: Instrument) -> Result<Outcome> {
        match self.recorders[instrument].download(&self.output_dir)? {
            Some(path) => Ok(Outcome::Saved(path)),
            None => Ok(Outcome::Ignored),
        }
    }

    /// Claim the store for a background load. `None` while a load is running.
    pub fn begin_loading(&mut self) -> Option<SampleStore> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(self.samples.clone())
    }

    /// Install samples loaded off the audio thread.
    pub fn install_samples(&mut self, store: SampleStore) {
        self.samples.absorb(store);
        self.loading = false;
        info!(loaded = self.samples.loaded_count(), "samples installed");
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Render the next `out.len()` frames of the mix.
    ///
    /// Metronome clicks land on their exact frame: the block is split at
    /// every due click.
    pub fn render_block(&mut self, out: &mut [f32]) {
        let mut offset = 0;
        while offset < out.len() {
            for (instrument, metronome) in self.metronomes.iter_mut() {
                while metronome.take_due(self.clock) {
                    let click = tone::click();
                    self.pool.spawn(instrument, click.graph, click.frequency, None);
                }
            }

            let mut len = (out.len() - offset).min(MAX_BLOCK_SIZE);
            for (_, metronome) in self.metronomes.iter() {
                if let Some(frames) = metronome.frames_until_next(self.clock) {
                    len = len.min(frames.max(1) as usize);
                }
            }

            let takes = PerInstrument::from_fn(|instrument| self.recorders[instrument].current_take());
            self.pool
                .render_block(&mut out[offset..offset + len], self.clock, &takes);

            for (instrument, recorder) in self.recorders.iter_mut() {
                if recorder.is_recording() {
                    recorder.capture(self.pool.tap(instrument));
                }
            }

            self.clock += len as u64;
            offset += len;
        }

        let now = self.clock;
        self.flashes.retain(|flash| flash.until > now);

        #[cfg(feature = "rtrb")]
        self.feed_scope(out);
    }

    #[cfg(feature = "rtrb")]
    fn feed_scope(&mut self, out: &[f32]) {
        let Some(scope) = self.scope.as_mut() else {
            return;
        };
        for &sample in out {
            // a full ring means the UI is behind; drop the rest of the block
            if scope.push(sample).is_err() {
                break;
            }
        }
    }
}

fn applied(done: bool) -> Outcome {
    if done {
        Outcome::Applied
    } else {
        Outcome::Ignored
    }
}

/// Load every sample on a background thread and install the result.
///
/// Returns `None` if a load is already in progress.
pub fn spawn_loader(session: Arc<Mutex<Session>>) -> Option<JoinHandle<usize>> {
    let mut store = session.lock().ok()?.begin_loading()?;

    let handle = thread::spawn(move || {
        let loaded = store.load_all();
        match session.lock() {
            Ok(mut session) => session.install_samples(store),
            Err(_) => warn!("session lock poisoned, samples dropped"),
        }
        loaded
    });
    Some(handle)
}
