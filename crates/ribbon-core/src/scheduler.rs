//! Frame scheduler: sample, integrate, advance, render, once per frame.

use log::debug;

use crate::audio::SpectralSampler;
use crate::layers::{render_frame, RibbonStyle};
use crate::state::AnimationState;
use crate::surface::Surface;

/// Host hook that paces the frame loop
pub trait FrameTiming {
    /// Wait until the next frame is due. Returning `false` stops the loop.
    fn next_frame(&mut self) -> bool;
}

impl<F: FnMut() -> bool> FrameTiming for F {
    fn next_frame(&mut self) -> bool {
        self()
    }
}

/// Timing source that grants a fixed number of frames back to back
#[derive(Clone, Debug)]
pub struct FrameLimit {
    remaining: u64,
}

impl FrameLimit {
    pub fn new(frames: u64) -> Self {
        Self { remaining: frames }
    }
}

impl FrameTiming for FrameLimit {
    fn next_frame(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

pub struct FrameScheduler<S> {
    sampler: S,
    style: RibbonStyle,
    state: AnimationState,
    /// Reused every frame; sized to the sampler's bin count
    snapshot: Vec<u8>,
    frames: u64,
}

impl<S: SpectralSampler> FrameScheduler<S> {
    pub fn new(sampler: S) -> Self {
        Self::with_style(sampler, RibbonStyle::default())
    }

    pub fn with_style(sampler: S, style: RibbonStyle) -> Self {
        let snapshot = vec![0; sampler.frequency_bin_count()];
        Self {
            sampler,
            style,
            state: AnimationState::new(),
            snapshot,
            frames: 0,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn style(&self) -> &RibbonStyle {
        &self.style
    }

    /// Frames rendered since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    /// Run one frame's work to completion
    pub fn tick<D: Surface + ?Sized>(&mut self, surface: &mut D) {
        let bins = self.sampler.frequency_bin_count();
        if self.snapshot.len() != bins {
            self.snapshot.resize(bins, 0);
        }
        self.sampler.byte_frequency_data(&mut self.snapshot);

        self.state = self.state.next(&self.snapshot);
        render_frame(surface, &self.state, &self.style);
        self.frames += 1;
    }

    /// Tick once per frame granted by `timing` until it declines.
    /// Returns the number of frames rendered by this call.
    pub fn run<T, D>(&mut self, timing: &mut T, surface: &mut D) -> u64
    where
        T: FrameTiming + ?Sized,
        D: Surface + ?Sized,
    {
        let start = self.frames;
        debug!("Frame loop started at frame {}", start);

        while timing.next_frame() {
            self.tick(surface);
        }

        let rendered = self.frames - start;
        debug!(
            "Frame loop stopped after {} frames (t = {:.3}, energy = {:.2})",
            rendered,
            self.state.time(),
            self.state.energy
        );
        rendered
    }
}
