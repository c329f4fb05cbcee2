use crate::{
    dsp::filter::{FilterType, SVFilter},
    graph::node::{GraphNode, RenderCtx},
};

/// State-variable filter applied in place.
///
/// ```ignore
/// OscNode::square().through(FilterNode::bandpass(1200.0).with_q(5.0))
/// ```
pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::lowpass(cutoff_hz),
        }
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::bandpass(cutoff_hz),
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.filter.set_q(q);
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type()
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.filter.cutoff_hz
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_parameters() {
        let node = FilterNode::bandpass(800.0).with_q(5.0);
        assert_eq!(node.filter_type(), FilterType::BandPass);
        assert_eq!(node.cutoff_hz(), 800.0);
        assert_eq!(node.filter.q, 5.0);
    }

    #[test]
    fn note_on_clears_state() {
        let ctx = RenderCtx::from_freq(44_100.0, 0.0, 1.0);
        let mut node = FilterNode::lowpass(500.0);

        let mut buffer = [1.0f32; 64];
        node.render_block(&mut buffer, &ctx);
        node.note_on(&ctx);

        let mut silence = [0.0f32; 4];
        node.render_block(&mut silence, &ctx);
        assert!(silence.iter().all(|&s| s == 0.0));
    }
}
