use crate::accumulation::{Channel, Extent};
use crate::error::RenderError;
use crate::uniforms::FrameSnapshot;

/// Vertical order of rows in a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// First row is the bottom of the image (GL framebuffer convention).
    BottomUp,
    /// First row is the top of the image.
    TopDown,
}

/// RGBA32F pixels read back from an accumulation texture.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub rows: RowOrder,
    /// `width * height` RGBA quadruples, row-major.
    pub data: Vec<f32>,
}

impl PixelBuffer {
    #[must_use]
    pub fn new(extent: Extent, rows: RowOrder) -> Self {
        Self {
            width: extent.width,
            height: extent.height,
            rows,
            data: vec![0.0; extent.pixel_count() * 4],
        }
    }

    #[must_use]
    pub const fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    /// Pixel at column `x` of storage row `row`.
    #[must_use]
    pub fn pixel(&self, x: u32, row: u32) -> [f32; 4] {
        let i = (row as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set_pixel(&mut self, x: u32, row: u32, rgba: [f32; 4]) {
        let i = (row as usize * self.width as usize + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Pixel addressed from the top-left corner regardless of storage order.
    #[must_use]
    pub fn pixel_top_down(&self, x: u32, y: u32) -> [f32; 4] {
        match self.rows {
            RowOrder::TopDown => self.pixel(x, y),
            RowOrder::BottomUp => self.pixel(x, self.height - 1 - y),
        }
    }
}

/// Executes accumulation passes planned by the [`crate::RenderScheduler`].
///
/// A backend owns two textures per [`Channel`]. `render` reads the pass's
/// source slot, blends in one new sample and writes the target slot.
pub trait RenderBackend {
    /// Reallocate the textures of both channels.
    ///
    /// # Errors
    ///
    /// Fails when either extent is empty or the device refuses the allocation.
    fn resize(&mut self, full: Extent, preview: Extent) -> Result<(), RenderError>;

    /// Run the pass described by `frame.pass`.
    ///
    /// # Errors
    ///
    /// Fails when the pass extent does not match the channel's textures or
    /// the sample shader reports an error.
    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), RenderError>;

    /// Copy one texture back to host memory.
    ///
    /// # Errors
    ///
    /// [`RenderError::BadSlot`] for slots other than 0 and 1, or a device
    /// error while reading.
    fn read_pixels(&self, channel: Channel, slot: usize) -> Result<PixelBuffer, RenderError>;
}
