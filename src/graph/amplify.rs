use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Amplitude Control (Amplify)
===========================

Amplify multiplies a signal by a control signal, sample by sample:

  [Signal] ──┬──→ (×) ──→ output
  [Control] ─┘

Every voice in this crate ends in one of these. A sustained tone is
multiplied by its gated envelope; a drum hit is multiplied by a decaying
gain ramp. The control signal is the gain itself, so an envelope peaking at
0.4 yields a voice peaking at 0.4.

The node is active only while both sides are. A looping sample never stops
on its own, so a held note lasts exactly as long as its envelope.
*/

pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // Blocks longer than the scratch buffer are processed in pieces
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.signal.render_block(chunk, ctx);

            let control = &mut self.temp_buffer[..chunk.len()];
            control.fill(0.0);
            self.modulator.render_block(control, ctx);

            for (o, m) in chunk.iter_mut().zip(control.iter()) {
                *o *= *m;
            }
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
        self.modulator.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.modulator.is_active() && self.signal.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::ramp::Ramp;
    use crate::graph::{extensions::NodeExt, gain::GainNode, oscillator::OscNode};

    #[test]
    fn scales_signal_by_control() {
        let ctx = RenderCtx::from_freq(8_000.0, 1_000.0, 1.0);
        let mut node = OscNode::square().amplify(GainNode::new(Ramp::constant(0.25)));
        let mut buffer = [0.0f32; 8];
        node.render_block(&mut buffer, &ctx);

        assert_eq!(buffer, [0.25, 0.25, 0.25, 0.25, -0.25, -0.25, -0.25, -0.25]);
    }

    #[test]
    fn handles_blocks_longer_than_scratch() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);
        let mut node = OscNode::square().amplify(GainNode::new(Ramp::constant(0.5)));
        let mut buffer = vec![0.0f32; MAX_BLOCK_SIZE * 2 + 7];
        node.render_block(&mut buffer, &ctx);

        assert!(buffer.iter().all(|s| s.abs() == 0.5));
    }

    #[test]
    fn finishes_when_signal_finishes() {
        let ctx = RenderCtx::from_freq(1_000.0, 100.0, 1.0);
        let mut node = OscNode::sine()
            .stop_after(0.01)
            .amplify(GainNode::new(Ramp::constant(1.0)));
        node.note_on(&ctx);

        let mut buffer = [0.0f32; 32];
        node.render_block(&mut buffer, &ctx);
        assert!(!node.is_active());
    }
}
