use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Parallel Layering (Mix)
=======================

Mix renders two graphs side by side and sums them:

  [A] ────┬──→ (+) ──→ output
  [B] ────┘

A stick stroke on the right drum head is a band-passed square tone layered
with a short burst of white noise. Each layer carries its own gain ramp, so
the sum is plain addition with no crossfade weights:

  tone.amplify(tone_gain).mix(noise.amplify(noise_gain))

Both layers receive note events. The mix stays active while either layer
still sounds.
*/

pub struct Mix<A, B> {
    pub source_a: A,
    pub source_b: B,
    temp_buffer: Vec<f32>,
}

impl<A, B> Mix<A, B> {
    pub fn new(source_a: A, source_b: B) -> Self {
        Mix {
            source_a,
            source_b,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<A: GraphNode, B: GraphNode> GraphNode for Mix<A, B> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.source_a.render_block(chunk, ctx);

            let frames = &mut self.temp_buffer[..chunk.len()];
            frames.fill(0.0);
            self.source_b.render_block(frames, ctx);

            for (o, b) in chunk.iter_mut().zip(frames.iter()) {
                *o += *b;
            }
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source_a.note_on(ctx);
        self.source_b.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source_a.note_off(ctx);
        self.source_b.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.source_a.is_active() || self.source_b.is_active()
    }
}
