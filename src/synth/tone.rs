//! Voice recipes: what each instrument's graph looks like.
//!
//! | source                 | graph                                                   |
//! | ---------------------- | ------------------------------------------------------- |
//! | piri                   | looped sample → low-pass 3 kHz → envelope 0.4 / 0.3     |
//! | haegeum                | looped sample → envelope 0.5 (hold)                     |
//! | drum, sample loaded    | sample once × 0.7                                       |
//! | drum, bass stroke      | sine 2f→f → low-pass 200 Hz × 0.8→0.01                  |
//! | drum, stick stroke     | square f → band-pass f (Q 5) × 0.3→0.01 + noise × 0.4→0 |
//! | metronome click        | sine 1 kHz × 0.3→0.01 over 50 ms                        |

use crate::{
    dsp::{envelope::EnvelopeShape, oscillator::white_noise, ramp::Ramp},
    graph::{
        envelope::EnvNode,
        extensions::NodeExt,
        filter::FilterNode,
        node::GraphNode,
        oscillator::OscNode,
        sampler::{LoopRegion, SampleNode},
    },
    instrument::{Instrument, PercussionSound, SoundCategory},
    samples::{SampleAsset, SampleId, SampleStore},
    Error, Result,
};

/// Seconds trimmed from each end of a sustained sample's loop.
pub const LOOP_MARGIN: f32 = 0.15;
/// Gain of a recorded drum stroke.
pub const DRUM_SAMPLE_GAIN: f32 = 0.7;
/// Extra generator time after a synthesized stroke's decay.
pub const STROKE_TAIL: f32 = 0.05;
pub const NOISE_SECONDS: f32 = 0.1;

pub const CLICK_FREQUENCY: f32 = 1_000.0;
pub const CLICK_SECONDS: f32 = 0.05;

/// How a melodic instrument's held note is voiced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneProfile {
    pub envelope: EnvelopeShape,
    pub lowpass: Option<f32>,
    /// Seconds from stop to halt.
    pub tail: f32,
}

impl ToneProfile {
    pub const PIRI: ToneProfile = ToneProfile {
        envelope: EnvelopeShape {
            attack: 0.08,
            decay: 0.07,
            peak: 0.4,
            sustain: 0.3,
            release: 0.1,
        },
        lowpass: Some(3_000.0),
        tail: 0.15,
    };

    pub const HAEGEUM: ToneProfile = ToneProfile {
        envelope: EnvelopeShape {
            attack: 0.1,
            decay: 0.0,
            peak: 0.5,
            sustain: 0.5,
            release: 0.15,
        },
        lowpass: None,
        tail: 0.2,
    };

    pub fn for_instrument(instrument: Instrument) -> Option<ToneProfile> {
        match instrument {
            Instrument::Piri => Some(Self::PIRI),
            Instrument::Haegeum => Some(Self::HAEGEUM),
            Instrument::Janggu => None,
        }
    }
}

/// A graph ready to hand to the voice pool.
pub struct Tone {
    pub graph: Box<dyn GraphNode>,
    pub frequency: f32,
    /// Present for held notes: seconds from stop to halt.
    pub tail: Option<f32>,
    pub playback_rate: f64,
}

/// Playback-rate ratio that moves a sample recorded at `base` to `frequency`.
pub fn playback_rate(frequency: f32, base: f32) -> f64 {
    frequency as f64 / base as f64
}

/// Held note on a melodic instrument.
///
/// Fails with `SampleNotLoaded` until the instrument's sample is in the store.
pub fn sustained(store: &SampleStore, instrument: Instrument, frequency: f32) -> Result<Tone> {
    let (Some(id), Some(profile)) = (
        SampleId::melodic(instrument),
        ToneProfile::for_instrument(instrument),
    ) else {
        return Err(Error::SampleNotLoaded(instrument));
    };
    let asset = store.get(id).ok_or(Error::SampleNotLoaded(instrument))?;

    Ok(sustained_from_asset(asset, profile, frequency))
}

pub fn sustained_from_asset(asset: &SampleAsset, profile: ToneProfile, frequency: f32) -> Tone {
    let base = asset.base_frequency.unwrap_or(frequency);
    let rate = playback_rate(frequency, base);
    let region = LoopRegion::inset(asset.duration(), LOOP_MARGIN);
    let source = SampleNode::looping(asset.buffer.clone(), asset.sample_rate, rate, region);
    let envelope = EnvNode::new(profile.envelope);

    let graph: Box<dyn GraphNode> = match profile.lowpass {
        Some(cutoff) => Box::new(source.through(FilterNode::lowpass(cutoff)).amplify(envelope)),
        None => Box::new(source.amplify(envelope)),
    };

    Tone {
        graph,
        frequency,
        tail: Some(profile.tail),
        playback_rate: rate,
    }
}

/// One drum stroke: the recorded sample when loaded, otherwise synthesized.
pub fn percussion(store: &SampleStore, sound: PercussionSound) -> Tone {
    match store.get(SampleId::Drum(sound)) {
        Some(asset) => percussion_sample(asset, sound),
        None => percussion_synth(sound, store.sample_rate()),
    }
}

pub fn percussion_sample(asset: &SampleAsset, sound: PercussionSound) -> Tone {
    let graph = SampleNode::one_shot(asset.buffer.clone(), asset.sample_rate)
        .gain(Ramp::constant(DRUM_SAMPLE_GAIN));

    Tone {
        graph: Box::new(graph),
        frequency: sound.params().frequency,
        tail: None,
        playback_rate: 1.0,
    }
}

pub fn percussion_synth(sound: PercussionSound, sample_rate: f32) -> Tone {
    let params = sound.params();
    let graph = match params.category {
        SoundCategory::Bass => bass_stroke(params.frequency, params.decay),
        SoundCategory::Sharp | SoundCategory::Roll => {
            stick_stroke(params.frequency, params.decay, sample_rate)
        }
    };

    Tone {
        graph,
        frequency: params.frequency,
        tail: None,
        playback_rate: 1.0,
    }
}

/// Membrane hit: pitch drops an octave in 50 ms.
fn bass_stroke(frequency: f32, decay: f32) -> Box<dyn GraphNode> {
    let lifetime = decay + STROKE_TAIL;
    let graph = OscNode::sine()
        .with_sweep(Ramp::exponential(frequency * 2.0, frequency, 0.05))
        .stop_after(lifetime)
        .through(FilterNode::lowpass(200.0))
        .gain(Ramp::exponential(0.8, 0.01, decay));
    Box::new(graph)
}

/// Stick hit: narrow band of a square plus a short noise burst.
fn stick_stroke(frequency: f32, decay: f32, sample_rate: f32) -> Box<dyn GraphNode> {
    let lifetime = decay + STROKE_TAIL;
    let tone = OscNode::square()
        .with_frequency(frequency)
        .stop_after(lifetime)
        .through(FilterNode::bandpass(frequency).with_q(5.0))
        .gain(Ramp::exponential(0.3, 0.01, decay));

    let noise = SampleNode::one_shot(white_noise(NOISE_SECONDS, sample_rate).into(), sample_rate)
        .gain(Ramp::exponential(0.4, 0.01, decay / 2.0));

    Box::new(tone.mix(noise))
}

/// Metronome tick.
pub fn click() -> Tone {
    let graph = OscNode::sine()
        .with_frequency(CLICK_FREQUENCY)
        .stop_after(CLICK_SECONDS)
        .gain(Ramp::exponential(0.3, 0.01, CLICK_SECONDS));

    Tone {
        graph: Box::new(graph),
        frequency: CLICK_FREQUENCY,
        tail: None,
        playback_rate: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::RenderCtx;
    use crate::instrument::NoteName;
    use crate::io::MemoryAssetSource;
    use std::sync::Arc;

    const SR: f32 = 44_100.0;

    fn render_until_silent(tone: &mut Tone, max_seconds: f32) -> (Vec<f32>, Option<usize>) {
        let ctx = RenderCtx::from_freq(SR, tone.frequency, 1.0);
        tone.graph.note_on(&ctx);

        let mut rendered = Vec::new();
        let mut block = [0.0f32; 256];
        while (rendered.len() as f32) < max_seconds * SR {
            tone.graph.render_block(&mut block, &ctx);
            rendered.extend_from_slice(&block);
            if !tone.graph.is_active() {
                return (rendered.clone(), Some(rendered.len()));
            }
        }
        (rendered, None)
    }

    fn empty_store() -> SampleStore {
        SampleStore::new(Arc::new(MemoryAssetSource::new()), SR)
    }

    fn piri_store() -> SampleStore {
        let mut store = empty_store();
        store.insert(
            SampleId::Piri,
            SampleAsset::new(vec![0.1f32; SR as usize * 2], SR, Some(523.25)),
        );
        store
    }

    #[test]
    fn rate_is_exact_ratio() {
        let rate = playback_rate(NoteName::A4.frequency(), NoteName::C5.frequency());
        assert!((rate - 440.0 / 523.25).abs() < 1e-9);
        assert!((rate - 0.8409).abs() < 1e-4);
    }

    #[test]
    fn piri_rate_follows_pitch() {
        let store = piri_store();
        let c5 = sustained(&store, Instrument::Piri, 523.25).unwrap();
        let c4 = sustained(&store, Instrument::Piri, 261.63).unwrap();

        assert_eq!(c5.playback_rate, 1.0);
        assert!((c4.playback_rate - 0.5).abs() < 1e-4);
        assert_eq!(c5.tail, Some(0.15));
    }

    #[test]
    fn melodic_without_sample_is_not_loaded() {
        let store = empty_store();
        assert!(matches!(
            sustained(&store, Instrument::Haegeum, 440.0),
            Err(Error::SampleNotLoaded(Instrument::Haegeum))
        ));
        assert!(sustained(&store, Instrument::Janggu, 440.0).is_err());
    }

    #[test]
    fn held_piri_sustains_at_gain() {
        let store = piri_store();
        let mut tone = sustained(&store, Instrument::Piri, 523.25).unwrap();
        let (samples, ended) = render_until_silent(&mut tone, 0.5);

        assert_eq!(ended, None, "held tone must not stop on its own");
        // constant 0.1 signal through a low-pass settles to 0.1 × sustain 0.3
        let last = *samples.last().unwrap();
        assert!((last - 0.03).abs() < 1e-3, "got {last}");
    }

    #[test]
    fn synthesized_strokes_end_within_decay_window() {
        for sound in PercussionSound::ALL {
            let params = sound.params();
            let mut tone = percussion_synth(sound, SR);
            let (samples, ended) = render_until_silent(&mut tone, 1.0);

            let ended = ended.unwrap_or_else(|| panic!("{sound} never ended"));
            let limit = ((params.decay + STROKE_TAIL) * SR) as usize + 256;
            assert!(ended <= limit, "{sound} ended at {ended}, limit {limit}");
            assert!(samples.iter().any(|s| s.abs() > 0.01), "{sound} is silent");
            assert!(samples.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn loaded_drum_plays_sample_at_fixed_gain() {
        let mut store = empty_store();
        store.insert(
            SampleId::Drum(PercussionSound::Kung),
            SampleAsset::new(vec![1.0f32; 441], SR, None),
        );

        let mut tone = percussion(&store, PercussionSound::Kung);
        let (samples, ended) = render_until_silent(&mut tone, 0.1);
        assert!(ended.is_some());
        assert_eq!(samples[0], DRUM_SAMPLE_GAIN);
        assert_eq!(samples[440], DRUM_SAMPLE_GAIN);
        assert_eq!(samples[441], 0.0);
    }

    #[test]
    fn click_is_short() {
        let mut tone = click();
        let (samples, ended) = render_until_silent(&mut tone, 0.2);

        assert!(ended.is_some());
        let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        assert!(peak <= 0.3 + 1e-6 && peak > 0.2);
        let cutoff = (CLICK_SECONDS * SR).round() as usize;
        assert!(samples[cutoff..].iter().all(|&s| s == 0.0));
    }
}
