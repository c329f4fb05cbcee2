use crate::{
    dsp::envelope::{Envelope, EnvelopeShape, EnvelopeState},
    graph::node::{GraphNode, RenderCtx},
};

/// Gated envelope as a control signal.
///
/// Renders the envelope's gain into the buffer; combine with `.amplify()` to
/// shape a source. Stays active until the release has faded to silence.
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    pub fn new(shape: EnvelopeShape) -> Self {
        Self {
            env: Envelope::new(shape),
        }
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }

    pub fn state(&self) -> EnvelopeState {
        self.env.state()
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.env.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.env.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{extensions::NodeExt, oscillator::OscNode};

    #[test]
    fn gates_a_source() {
        let ctx = RenderCtx::from_freq(1_000.0, 100.0, 1.0);
        let mut voice = OscNode::square().amplify(EnvNode::new(EnvelopeShape::attack_hold(
            0.01, 0.5, 0.02,
        )));

        voice.note_on(&ctx);
        let mut buffer = [0.0f32; 64];
        voice.render_block(&mut buffer, &ctx);
        assert!((buffer[20].abs() - 0.5).abs() < 1e-6);

        voice.note_off(&ctx);
        voice.render_block(&mut buffer, &ctx);
        assert!(buffer[30..].iter().all(|&s| s == 0.0));
        assert!(!voice.is_active());
    }
}
