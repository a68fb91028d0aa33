//! Reading the finished image back for saving.

use tracing::debug;

use crate::accumulation::Channel;
use crate::backend::{PixelBuffer, RenderBackend, RowOrder};
use crate::error::RenderError;
use crate::scheduler::RenderScheduler;

/// Reverse the row order of `buffer`.
#[must_use]
pub fn flip_rows(buffer: &PixelBuffer) -> PixelBuffer {
    let stride = buffer.width as usize * 4;
    let mut data = Vec::with_capacity(buffer.data.len());
    for row in buffer.data.chunks_exact(stride).rev() {
        data.extend_from_slice(row);
    }
    PixelBuffer {
        width: buffer.width,
        height: buffer.height,
        rows: match buffer.rows {
            RowOrder::BottomUp => RowOrder::TopDown,
            RowOrder::TopDown => RowOrder::BottomUp,
        },
        data,
    }
}

/// `buffer` with its first row at the top of the image.
#[must_use]
pub fn to_top_down(buffer: PixelBuffer) -> PixelBuffer {
    match buffer.rows {
        RowOrder::TopDown => buffer,
        RowOrder::BottomUp => flip_rows(&buffer),
    }
}

/// Quantise to 8-bit RGBA, top row first.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_rgba8(buffer: &PixelBuffer) -> Vec<u8> {
    let quantise = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    match buffer.rows {
        RowOrder::TopDown => buffer.data.iter().copied().map(quantise).collect(),
        RowOrder::BottomUp => flip_rows(buffer).data.into_iter().map(quantise).collect(),
    }
}

/// The latest full-resolution image, top row first.
///
/// # Errors
///
/// Propagates the backend's read-back error.
pub fn export_full<B: RenderBackend + ?Sized>(
    backend: &B,
    scheduler: &RenderScheduler,
) -> Result<PixelBuffer, RenderError> {
    let full = scheduler.full();
    let pixels = backend.read_pixels(Channel::Full, full.front())?;
    debug!(
        width = pixels.width,
        height = pixels.height,
        samples = full.num_samples(),
        "exporting full image"
    );
    Ok(to_top_down(pixels))
}
