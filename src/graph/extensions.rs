use crate::dsp::ramp::Ramp;
use crate::graph::{
    amplify::Amplify, gain::GainNode, mix::Mix, node::GraphNode, through::Through,
};

pub trait NodeExt: GraphNode + Sized {
    fn amplify<M: GraphNode>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn through<F: GraphNode>(self, filter: F) -> Through<Self, F> {
        Through::new(self, filter)
    }

    fn mix<M: GraphNode>(self, source: M) -> Mix<Self, M> {
        Mix::new(self, source)
    }

    /// Shorthand for `.amplify(GainNode::new(ramp))`.
    fn gain(self, ramp: Ramp) -> Amplify<Self, GainNode> {
        Amplify::new(self, GainNode::new(ramp))
    }
}

impl<T: GraphNode> NodeExt for T {}
