//! Reference [`RenderBackend`] running the sample shader on the CPU.
//!
//! Mirrors the GPU pipeline pixel for pixel: every pass evaluates the uniform
//! table, calls the [`SampleShader`] once per pixel with a jittered fragment
//! coordinate and blends the result with the source texture. Rows are stored
//! bottom-up like a GL framebuffer.

use scene::ShaderContext;
use tracing::debug;

use crate::accumulation::{blend, Channel, Extent};
use crate::backend::{PixelBuffer, RenderBackend, RowOrder};
use crate::error::RenderError;
use crate::uniforms::{FrameSnapshot, UniformTable, UniformValues};

const DEFAULT_SEED: u64 = 0x5eed;

/// Per-pixel colour function, the CPU counterpart of a fragment shader.
pub trait SampleShader {
    /// Colour seen through `frag_coord`, in pixels from the bottom-left
    /// corner of the target (pixel centres sit at `+0.5`).
    ///
    /// # Errors
    ///
    /// Implementations fail when a uniform they need is missing.
    fn sample(&self, uniforms: &UniformValues, frag_coord: [f32; 2]) -> Result<[f32; 4], RenderError>;
}

impl<F> SampleShader for F
where
    F: Fn(&UniformValues, [f32; 2]) -> Result<[f32; 4], RenderError>,
{
    fn sample(&self, uniforms: &UniformValues, frag_coord: [f32; 2]) -> Result<[f32; 4], RenderError> {
        self(uniforms, frag_coord)
    }
}

pub struct CpuBackend<S> {
    shader: S,
    table: UniformTable,
    full: [PixelBuffer; 2],
    preview: [PixelBuffer; 2],
    rng: fastrand::Rng,
}

impl<S: SampleShader> CpuBackend<S> {
    /// The uniform table is fixed for the scene layout described by `context`.
    #[must_use]
    pub fn new(shader: S, context: &ShaderContext, full: Extent, preview: Extent) -> Self {
        Self {
            shader,
            table: UniformTable::new(context),
            full: Self::textures(full),
            preview: Self::textures(preview),
            rng: fastrand::Rng::with_seed(DEFAULT_SEED),
        }
    }

    /// Reseed the sub-pixel jitter.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    pub const fn table(&self) -> &UniformTable {
        &self.table
    }

    fn textures(extent: Extent) -> [PixelBuffer; 2] {
        [
            PixelBuffer::new(extent, RowOrder::BottomUp),
            PixelBuffer::new(extent, RowOrder::BottomUp),
        ]
    }

    const fn channel(&self, channel: Channel) -> &[PixelBuffer; 2] {
        match channel {
            Channel::Full => &self.full,
            Channel::Preview => &self.preview,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut [PixelBuffer; 2] {
        match channel {
            Channel::Full => &mut self.full,
            Channel::Preview => &mut self.preview,
        }
    }

    /// Jitter inside the pixel once there is history to average against.
    fn jitter(&mut self, num_samples: u32) -> [f32; 2] {
        if num_samples == 0 {
            [0.5, 0.5]
        } else {
            [self.rng.f32(), self.rng.f32()]
        }
    }
}

impl<S: SampleShader> RenderBackend for CpuBackend<S> {
    fn resize(&mut self, full: Extent, preview: Extent) -> Result<(), RenderError> {
        for extent in [full, preview] {
            if extent.is_empty() {
                return Err(RenderError::EmptyTarget {
                    width: extent.width,
                    height: extent.height,
                });
            }
        }
        self.full = Self::textures(full);
        self.preview = Self::textures(preview);
        debug!(?full, ?preview, "cpu textures reallocated");
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), RenderError> {
        let pass = *frame.pass;
        let expected = self.channel(pass.channel)[0].extent();
        if expected != pass.extent {
            return Err(RenderError::ExtentMismatch {
                channel: pass.channel,
                expected,
                found: pass.extent,
            });
        }
        if pass.source > 1 || pass.target > 1 || pass.source == pass.target {
            return Err(RenderError::BadSlot {
                channel: pass.channel,
                slot: pass.target,
            });
        }

        let uniforms = self.table.evaluate(frame);
        let mut out = PixelBuffer::new(pass.extent, RowOrder::BottomUp);
        for row in 0..pass.extent.height {
            for x in 0..pass.extent.width {
                let [jx, jy] = self.jitter(pass.num_samples);
                let frag = [x as f32 + jx, row as f32 + jy];
                let sample = self.shader.sample(&uniforms, frag)?;
                let previous = self.channel(pass.channel)[pass.source].pixel(x, row);
                out.set_pixel(x, row, blend(previous, sample, pass.texture_weight));
            }
        }
        self.channel_mut(pass.channel)[pass.target] = out;
        Ok(())
    }

    fn read_pixels(&self, channel: Channel, slot: usize) -> Result<PixelBuffer, RenderError> {
        self.channel(channel)
            .get(slot)
            .cloned()
            .ok_or(RenderError::BadSlot { channel, slot })
    }
}
