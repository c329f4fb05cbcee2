use tracing::debug;

use crate::{
    graph::node::{GraphNode, RenderCtx},
    instrument::{Instrument, PerInstrument},
    recorder::TakeId,
    synth::voice::{Voice, VoiceError, VoiceId},
    MAX_BLOCK_SIZE,
};

/// Owns every live voice, mixes them and retires the finished ones.
///
/// Voices started while their instrument was recording carry that take's id;
/// their output is also summed into a per-instrument tap the recorder reads
/// after each block.
pub struct VoicePool {
    sample_rate: f32,
    voices: Vec<Voice>,
    next_id: u64,
    temp_buffer: Vec<f32>,
    taps: PerInstrument<Vec<f32>>,
    tap_len: usize,
}

impl VoicePool {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            voices: Vec::new(),
            next_id: 0,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            taps: PerInstrument::from_fn(|_| vec![0.0; MAX_BLOCK_SIZE]),
            tap_len: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Start `graph` at `frequency` and return its id.
    pub fn spawn(
        &mut self,
        instrument: Instrument,
        graph: Box<dyn GraphNode>,
        frequency: f32,
        take: Option<TakeId>,
    ) -> VoiceId {
        let id = VoiceId(self.next_id);
        self.next_id += 1;

        let ctx = RenderCtx::from_freq(self.sample_rate, frequency, 1.0);
        self.voices.push(Voice::start(id, instrument, graph, ctx, take));
        debug!(voice = %id, %instrument, frequency, recording = take.is_some(), "voice started");
        id
    }

    /// Close the voice's gate and halt it `tail` seconds after `now`.
    pub fn release(&mut self, id: VoiceId, now: u64, tail: f32) -> Result<(), VoiceError> {
        let tail_frames = (tail.max(0.0) * self.sample_rate).round() as u64;
        match self.voices.iter_mut().find(|v| v.id() == id) {
            Some(voice) if !voice.is_finished(now) => {
                voice.release(now, tail_frames);
                debug!(voice = %id, tail, "voice released");
                Ok(())
            }
            _ => Err(VoiceError::Finished(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn count_for(&self, instrument: Instrument) -> usize {
        self.voices
            .iter()
            .filter(|v| v.instrument() == instrument)
            .count()
    }

    /// Mix all voices into `out` (at most `MAX_BLOCK_SIZE` frames) starting
    /// at absolute frame `now`. `takes` is the active recording take per
    /// instrument.
    pub fn render_block(&mut self, out: &mut [f32], now: u64, takes: &PerInstrument<Option<TakeId>>) {
        let len = out.len().min(MAX_BLOCK_SIZE);
        let out = &mut out[..len];
        out.fill(0.0);
        for (_, tap) in self.taps.iter_mut() {
            tap[..len].fill(0.0);
        }
        self.tap_len = len;

        for voice in &mut self.voices {
            let frames = &mut self.temp_buffer[..len];
            frames.fill(0.0);
            voice.render(frames, now);

            for (o, v) in out.iter_mut().zip(frames.iter()) {
                *o += v;
            }

            let instrument = voice.instrument();
            if voice.take().is_some() && voice.take() == takes[instrument] {
                for (t, v) in self.taps[instrument][..len].iter_mut().zip(frames.iter()) {
                    *t += v;
                }
            }
        }

        let end = now + len as u64;
        self.voices.retain(|voice| {
            let done = voice.is_finished(end);
            if done {
                debug!(voice = %voice.id(), "voice finished");
            }
            !done
        });
    }

    /// Recorded-voice output of the last rendered block.
    pub fn tap(&self, instrument: Instrument) -> &[f32] {
        &self.taps[instrument][..self.tap_len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::EnvelopeShape;
    use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode};

    const SR: f32 = 1_000.0;

    fn no_takes() -> PerInstrument<Option<TakeId>> {
        PerInstrument::from_fn(|_| None)
    }

    fn held() -> Box<dyn GraphNode> {
        Box::new(OscNode::square().amplify(EnvNode::new(EnvelopeShape::attack_hold(0.001, 0.5, 0.01))))
    }

    #[test]
    fn one_shot_retires_itself() {
        let mut pool = VoicePool::new(SR);
        pool.spawn(Instrument::Janggu, Box::new(OscNode::sine().stop_after(0.05)), 100.0, None);

        let mut out = [0.0f32; 64];
        pool.render_block(&mut out, 0, &no_takes());
        assert!(pool.is_empty());
    }

    #[test]
    fn release_then_halt_after_tail() {
        let mut pool = VoicePool::new(SR);
        let id = pool.spawn(Instrument::Piri, held(), 100.0, None);
        let mut out = [0.0f32; 32];
        pool.render_block(&mut out, 0, &no_takes());

        assert_eq!(pool.release(id, 32, 0.015), Ok(()));
        pool.render_block(&mut out, 32, &no_takes());
        assert!(pool.is_empty(), "halted after 15 ms tail");
    }

    #[test]
    fn releasing_a_gone_voice_is_finished() {
        let mut pool = VoicePool::new(SR);
        let id = pool.spawn(Instrument::Janggu, Box::new(OscNode::sine().stop_after(0.001)), 100.0, None);
        let mut out = [0.0f32; 8];
        pool.render_block(&mut out, 0, &no_takes());

        assert_eq!(pool.release(id, 8, 0.1), Err(VoiceError::Finished(id)));
    }

    #[test]
    fn only_voices_of_the_current_take_are_tapped() {
        let mut pool = VoicePool::new(SR);
        let take = TakeId(7);
        pool.spawn(Instrument::Piri, held(), 100.0, Some(take));
        pool.spawn(Instrument::Piri, held(), 100.0, Some(TakeId(6)));
        pool.spawn(Instrument::Haegeum, held(), 100.0, None);

        let mut takes = no_takes();
        takes[Instrument::Piri] = Some(take);

        let mut out = [0.0f32; 16];
        pool.render_block(&mut out, 0, &takes);

        // square 100 Hz at 1 kHz: first 5 samples are +1 × gain
        let tapped = pool.tap(Instrument::Piri);
        assert_eq!(tapped.len(), 16);
        assert!((tapped[3] - 0.5).abs() < 1e-6);
        assert!((out[3] - 1.5).abs() < 1e-6);
        assert!(pool.tap(Instrument::Haegeum).iter().all(|&s| s == 0.0));
    }
}
