//! Progressive accumulation state
//!
//! Each channel renders into one of two textures while reading the other,
//! then swaps. The shader blends its new sample with the previous image using
//! `num_samples / (num_samples + 1)`, so after `k` accumulated samples the
//! front texture holds their mean.

use tracing::trace;

/// Which accumulation target a pass renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Canvas-sized target.
    Full,
    /// Reduced-size target used while interacting.
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extent shrunk by `ratio`, never below one pixel per side.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scaled(self, ratio: f64) -> Self {
        let w = (f64::from(self.width) * ratio).floor().max(1.0) as u32;
        let h = (f64::from(self.height) * ratio).floor().max(1.0) as u32;
        Self::new(w, h)
    }

    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Index pair for two textures used alternately as source and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingPong {
    front: usize,
}

impl PingPong {
    /// Slot holding the most recent result.
    #[must_use]
    pub const fn front(self) -> usize {
        self.front
    }

    /// Slot the next pass writes to.
    #[must_use]
    pub const fn back(self) -> usize {
        1 - self.front
    }

    pub fn swap(&mut self) {
        self.front = self.back();
    }
}

/// Parameters of a single accumulation pass, captured before the channel
/// advances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPass {
    pub channel: Channel,
    pub extent: Extent,
    /// Slot holding the previous image.
    pub source: usize,
    /// Slot receiving the blended result.
    pub target: usize,
    pub texture_weight: f32,
    pub num_samples: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationChannel {
    channel: Channel,
    extent: Extent,
    num_samples: u32,
    max_samples: u32,
    keep_sampling: bool,
    slots: PingPong,
}

impl AccumulationChannel {
    #[must_use]
    pub fn new(channel: Channel, extent: Extent, max_samples: u32, keep_sampling: bool) -> Self {
        Self {
            channel,
            extent,
            num_samples: 0,
            max_samples,
            keep_sampling,
            slots: PingPong::default(),
        }
    }

    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    #[must_use]
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// Resize the targets. Previous samples no longer line up, so the counter
    /// restarts.
    pub fn set_extent(&mut self, extent: Extent) {
        self.extent = extent;
        self.reset();
    }

    #[must_use]
    pub const fn num_samples(&self) -> u32 {
        self.num_samples
    }

    #[must_use]
    pub const fn max_samples(&self) -> u32 {
        self.max_samples
    }

    #[must_use]
    pub const fn keep_sampling(&self) -> bool {
        self.keep_sampling
    }

    pub fn set_keep_sampling(&mut self, keep: bool) {
        self.keep_sampling = keep;
    }

    /// Slot holding the latest image.
    #[must_use]
    pub const fn front(&self) -> usize {
        self.slots.front()
    }

    /// Blend weight given to the previous image.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn texture_weight(&self) -> f32 {
        self.num_samples as f32 / (self.num_samples as f32 + 1.0)
    }

    pub fn reset(&mut self) {
        if self.num_samples != 0 {
            trace!(channel = ?self.channel, from = self.num_samples, "accumulation reset");
        }
        self.num_samples = 0;
    }

    #[must_use]
    pub const fn is_saturated(&self) -> bool {
        self.num_samples >= self.max_samples
    }

    /// Describe the next pass and advance the ping-pong state.
    ///
    /// Returns `None` once the sample cap is reached. The counter grows only
    /// while the channel keeps sampling; otherwise every pass replaces the
    /// image.
    pub fn next_pass(&mut self) -> Option<RenderPass> {
        if self.is_saturated() {
            return None;
        }
        let pass = RenderPass {
            channel: self.channel,
            extent: self.extent,
            source: self.slots.front(),
            target: self.slots.back(),
            texture_weight: self.texture_weight(),
            num_samples: self.num_samples,
        };
        self.slots.swap();
        if self.keep_sampling {
            self.num_samples += 1;
        }
        Some(pass)
    }
}

/// Running-mean blend used by the accumulation shaders.
#[must_use]
pub fn blend(previous: [f32; 4], sample: [f32; 4], weight: f32) -> [f32; 4] {
    std::array::from_fn(|i| sample[i] * (1.0 - weight) + previous[i] * weight)
}
