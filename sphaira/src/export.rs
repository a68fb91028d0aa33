//! PNG output for rendered images.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use render::{to_rgba8, PixelBuffer};
use tracing::info;

/// `sphaira-YYYYmmdd-HHMMSS.png` in the working directory.
#[must_use]
pub fn default_export_path() -> PathBuf {
    PathBuf::from(format!("sphaira-{}.png", chrono::Local::now().format("%Y%m%d-%H%M%S")))
}

/// Write `image` as an 8-bit RGBA PNG.
///
/// # Errors
///
/// Fails when the buffer size does not match its extent or the file cannot
/// be written.
pub fn save_png(path: &Path, image: &PixelBuffer) -> Result<()> {
    let rgba = image::RgbaImage::from_raw(image.width, image.height, to_rgba8(image))
        .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", image.width, image.height))?;
    rgba.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), width = image.width, height = image.height, "image saved");
    Ok(())
}
