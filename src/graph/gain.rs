use crate::{
    dsp::ramp::Ramp,
    graph::node::{GraphNode, RenderCtx},
};

/// Scheduled gain as a control signal.
///
/// One-shot voices don't get a note-off; their loudness follows a ramp that
/// starts on note-on. A gain node never ends a voice on its own, the source it
/// scales does.
pub struct GainNode {
    ramp: Ramp,
}

impl GainNode {
    pub fn new(ramp: Ramp) -> Self {
        Self { ramp }
    }

    pub fn constant(value: f32) -> Self {
        Self::new(Ramp::constant(value))
    }

    pub fn exponential(from: f32, to: f32, seconds: f32) -> Self {
        Self::new(Ramp::exponential(from, to, seconds))
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.ramp.render(out, ctx.sample_rate);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.ramp.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decays_and_holds_floor() {
        let ctx = RenderCtx::from_freq(1_000.0, 0.0, 1.0);
        let mut gain = GainNode::exponential(0.3, 0.01, 0.05);
        gain.note_on(&ctx);

        let mut buffer = [0.0f32; 100];
        gain.render_block(&mut buffer, &ctx);

        assert!((buffer[0] - 0.3).abs() < 1e-6);
        assert!(buffer.windows(2).take(50).all(|w| w[1] < w[0]));
        assert!(buffer[60..].iter().all(|&g| (g - 0.01).abs() < 1e-6));
        assert!(gain.is_active());
    }
}
