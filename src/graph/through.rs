use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two nodes in series, passing the output of the first
(source) into the second (effect), which processes the buffer in place:

  [Source] ──→ [Effect] ──→ output

The piri is a looping sample through a 3 kHz low-pass; the bass drum strokes
are a swept sine through a 200 Hz low-pass:

  SampleNode::looping(buffer, rate, region).through(FilterNode::lowpass(3000.0))

An effect never ends a voice by itself, so activity follows the source.
*/

pub struct Through<S, F> {
    source: S,
    filter: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, filter: F) -> Self {
        Self { source, filter }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.filter.render_block(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source.note_on(ctx);
        self.filter.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source.note_off(ctx);
        self.filter.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.source.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{extensions::NodeExt, filter::FilterNode, oscillator::OscNode};

    #[test]
    fn renders_source_then_filter() {
        let ctx = RenderCtx::from_freq(44_100.0, 5_000.0, 1.0);
        let mut dry = OscNode::sine();
        let mut wet = OscNode::sine().through(FilterNode::lowpass(200.0));

        let mut dry_buf = vec![0.0f32; 4096];
        let mut wet_buf = vec![0.0f32; 4096];
        dry.render_block(&mut dry_buf, &ctx);
        wet.render_block(&mut wet_buf, &ctx);

        let peak = |b: &[f32]| b[2048..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak(&wet_buf) < peak(&dry_buf) * 0.1);
    }

    #[test]
    fn activity_follows_source() {
        let ctx = RenderCtx::from_freq(1_000.0, 100.0, 1.0);
        let mut node = OscNode::sine()
            .stop_after(0.01)
            .through(FilterNode::lowpass(200.0));
        node.note_on(&ctx);
        assert!(node.is_active());

        let mut buffer = [0.0f32; 32];
        node.render_block(&mut buffer, &ctx);
        assert!(!node.is_active());
    }
}
