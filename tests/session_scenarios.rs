//! End-to-end scenarios driving a whole `Session` with in-memory assets.

use std::{
    f32::consts::TAU,
    sync::{Arc, Mutex},
};

use sori::{
    config::Config,
    io::{decode, wav, MemoryAssetSource},
    metronome::Tempo,
    samples::{SampleId, SampleStore},
    session::spawn_loader,
    Action, InputEvent, Instrument, NoteId, NoteName, Outcome, PercussionSound, Session,
};

const SR: f32 = 8_000.0;

/// One second of a sine at `frequency`, as WAV bytes.
fn tone_wav(frequency: f32) -> Vec<u8> {
    let samples: Vec<f32> = (0..SR as usize)
        .map(|n| 0.5 * (TAU * frequency * n as f32 / SR).sin())
        .collect();
    wav::encode([samples.as_slice()], SR as u32, wav::WavEncoding::Float32).unwrap()
}

/// Assets for both melodic instruments, no drum samples.
fn melodic_assets() -> MemoryAssetSource {
    MemoryAssetSource::new()
        .with_file(SampleId::Piri.default_path(), tone_wav(523.25))
        .with_file(SampleId::Haegeum.default_path(), tone_wav(440.0))
}

fn loaded_session(config: &Config) -> Session {
    let mut store = SampleStore::new(Arc::new(melodic_assets()), SR);
    assert_eq!(store.load_all(), 2);
    Session::new(store, config)
}

fn render(session: &mut Session, seconds: f32) -> Vec<f32> {
    let mut out = vec![0.0f32; (seconds * SR).round() as usize];
    session.render_block(&mut out);
    out
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

#[test]
fn piri_plays_at_sample_pitch_and_an_octave_below() {
    let mut session = loaded_session(&Config::default());

    session.play(Instrument::Piri, NoteName::C5.into()).unwrap();
    session.play(Instrument::Piri, NoteName::C4.into()).unwrap();

    let registry = session.registry(Instrument::Piri);
    let c5 = registry.get(NoteName::C5).unwrap().playback_rate;
    let c4 = registry.get(NoteName::C4).unwrap().playback_rate;
    assert!((c5 - 1.0).abs() < 1e-9, "C5 rate {c5}");
    assert!((c4 - 0.5).abs() < 1e-3, "C4 rate {c4}");

    let out = render(&mut session, 0.5);
    assert!(peak(&out) > 0.1);
}

#[test]
fn recording_three_notes_yields_a_decodable_take() {
    let mut session = loaded_session(&Config::default());
    session.dispatch(Action::ToggleRecording(Instrument::Piri)).unwrap();

    for note in [NoteName::C4, NoteName::E4, NoteName::G4] {
        session.play(Instrument::Piri, note.into()).unwrap();
        render(&mut session, 0.5);
        session.stop_note(Instrument::Piri, note);
        render(&mut session, 2.0 / 3.0 - 0.5);
    }

    let recording = session.stop_recording(Instrument::Piri).unwrap().unwrap();
    assert!(!recording.bytes.is_empty());
    assert!((recording.duration() - 2.0).abs() < 0.01, "{}", recording.duration());

    let decoded = decode(&recording.bytes).unwrap();
    assert_eq!(decoded.sample_rate, SR as u32);
    assert_eq!(decoded.samples.len(), recording.frames.len());
    assert!(peak(&decoded.samples) > 0.1);
}

#[test]
fn synthesized_drum_stroke_ends_by_itself() {
    let mut session = loaded_session(&Config::default());
    session.switch_page(Instrument::Janggu);

    for sound in PercussionSound::ALL {
        session.play(Instrument::Janggu, sound.into()).unwrap();
    }
    assert_eq!(session.pool().count_for(Instrument::Janggu), PercussionSound::ALL.len());

    // longest decay is kung: 0.4 s + 50 ms generator tail
    let out = render(&mut session, 0.5);
    assert!(peak(&out) > 0.05);
    assert!(session.pool().is_empty());
}

#[test]
fn showing_another_page_silences_held_keys() {
    let mut session = loaded_session(&Config::default());

    session.handle_input(InputEvent::KeyDown('a')).unwrap();
    session.handle_input(InputEvent::KeyDown('d')).unwrap();
    assert_eq!(session.active_note_count(), 2);

    session.handle_input(InputEvent::ShowPage(Instrument::Haegeum)).unwrap();
    assert_eq!(session.active_note_count(), 0);
    assert_eq!(session.page(), Instrument::Haegeum);

    // piri keys no longer reach the piri
    let outcome = session.handle_input(InputEvent::KeyDown('a')).unwrap();
    assert_eq!(outcome, Outcome::Ignored);
    assert_eq!(session.active_note_count(), 0);
}

#[test]
fn tempo_is_clamped_and_running_metronome_keeps_one_timer() {
    let mut session = loaded_session(&Config::default());

    session
        .dispatch(Action::SetTempo(Instrument::Piri, Tempo::new(500)))
        .unwrap();
    assert_eq!(session.metronome(Instrument::Piri).tempo().bpm(), Tempo::MAX);

    session.dispatch(Action::NudgeTempo(Instrument::Piri, -1000)).unwrap();
    assert_eq!(session.metronome(Instrument::Piri).tempo().bpm(), Tempo::MIN);

    // 120 BPM clicks at 0 s and would again at 0.5 s
    session.dispatch(Action::SetTempo(Instrument::Piri, Tempo::new(120))).unwrap();
    session.dispatch(Action::ToggleMetronome(Instrument::Piri)).unwrap();
    render(&mut session, 0.5);
    // 60 BPM from here: one click per second, first immediately
    session.dispatch(Action::SetTempo(Instrument::Piri, Tempo::new(60))).unwrap();

    let out = render(&mut session, 2.5);
    let second = SR as usize;
    let windows = [0, second, 2 * second];
    for start in windows {
        assert!(peak(&out[start..start + 200]) > 0.1, "missing click at {start}");
    }
    assert!(peak(&out[second / 2..second / 2 + 200]) < 1e-3, "doubled timer");
}

#[test]
fn restarting_a_recording_drops_the_previous_take() {
    let mut session = loaded_session(&Config::default());

    session.start_recording(Instrument::Piri);
    session.play(Instrument::Piri, NoteName::C4.into()).unwrap();
    render(&mut session, 0.5);

    // C4 keeps sounding but belongs to the abandoned take
    session.start_recording(Instrument::Piri);
    render(&mut session, 0.3);

    let recording = session.stop_recording(Instrument::Piri).unwrap().unwrap();
    assert_eq!(recording.frames.len(), (0.3 * SR).round() as usize);
    assert!(recording.frames.iter().all(|&s| s == 0.0));
}

#[test]
fn downloading_writes_the_take_to_the_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.recording.output_dir = dir.path().to_path_buf();
    let mut session = loaded_session(&config);

    assert_eq!(
        session.dispatch(Action::DownloadRecording(Instrument::Haegeum)).unwrap(),
        Outcome::Ignored
    );

    session.switch_page(Instrument::Haegeum);
    session.dispatch(Action::ToggleRecording(Instrument::Haegeum)).unwrap();
    session.handle_input(InputEvent::KeyDown('z')).unwrap();
    render(&mut session, 0.4);
    session.handle_input(InputEvent::KeyUp('z')).unwrap();
    session.dispatch(Action::ToggleRecording(Instrument::Haegeum)).unwrap();

    let outcome = session.dispatch(Action::DownloadRecording(Instrument::Haegeum)).unwrap();
    let expected = dir.path().join("haegeum-recording.wav");
    assert_eq!(outcome, Outcome::Saved(expected.clone()));

    let written = std::fs::read(expected).unwrap();
    let recording = session.recorder(Instrument::Haegeum).recording().unwrap();
    assert_eq!(written, recording.bytes);
}

#[test]
fn playing_back_a_take_sounds_once() {
    let mut session = loaded_session(&Config::default());
    assert!(!session.play_recording(Instrument::Piri));

    session.start_recording(Instrument::Piri);
    session.play(Instrument::Piri, NoteName::A4.into()).unwrap();
    render(&mut session, 0.25);
    session.stop_all(Instrument::Piri);
    render(&mut session, 0.25);
    session.stop_recording(Instrument::Piri).unwrap();
    assert!(session.pool().is_empty());

    assert!(session.play_recording(Instrument::Piri));
    let out = render(&mut session, 0.5);
    assert!(peak(&out[..(0.25 * SR) as usize]) > 0.1);
    render(&mut session, 0.1);
    assert!(session.pool().is_empty());
}

#[test]
fn background_loader_installs_every_sample() {
    let mut assets = melodic_assets();
    for sound in PercussionSound::ALL {
        assets.insert(SampleId::Drum(sound).default_path(), tone_wav(100.0));
    }
    let store = SampleStore::new(Arc::new(assets), SR);
    let session = Arc::new(Mutex::new(Session::new(store, &Config::default())));

    let handle = spawn_loader(Arc::clone(&session)).unwrap();
    let loaded = handle.join().unwrap();
    assert_eq!(loaded, SampleId::ALL.len());

    let mut session = session.lock().unwrap();
    assert!(!session.is_loading());
    assert_eq!(session.samples().loaded_count(), SampleId::ALL.len());
    assert_eq!(
        session.play(Instrument::Janggu, NoteId::Percussion(PercussionSound::Tak)).unwrap(),
        Outcome::Applied
    );
}
