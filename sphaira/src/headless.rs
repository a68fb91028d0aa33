//! Windowless rendering on the CPU backend.

use std::time::{Duration, Instant};

use render::{export_full, Channel, CpuBackend, PixelBuffer, RenderError};
use tracing::{debug, info};

use crate::tracer::SceneTracer;
use crate::viewer::Viewer;

/// Simulated time between two headless frames.
pub const FRAME_STEP: Duration = Duration::from_millis(16);

#[derive(Debug, Clone)]
pub struct HeadlessReport {
    /// Full-resolution image, top row first.
    pub image: PixelBuffer,
    /// Samples accumulated in the full channel.
    pub samples: u32,
    /// Passes executed across all frames.
    pub passes: usize,
}

/// Run `frames` scheduler ticks and read back the full image.
///
/// With no one interacting the preview would be the only channel sampling,
/// so the full channel is switched to free-running accumulation first.
///
/// # Errors
///
/// Fails when a pass is rejected or the image cannot be read back.
pub fn run_headless(viewer: &mut Viewer, frames: u32) -> Result<HeadlessReport, RenderError> {
    let scheduler = viewer.scheduler_mut();
    scheduler.channel_mut(Channel::Full).set_keep_sampling(true);
    scheduler.channel_mut(Channel::Preview).set_keep_sampling(false);

    let context = viewer.scene().shader_context();
    let mut backend = CpuBackend::new(
        SceneTracer::new(&context),
        &context,
        viewer.scheduler().full().extent(),
        viewer.scheduler().preview().extent(),
    );

    info!(frames, extent = ?viewer.scheduler().full().extent(), "headless run");
    let start = Instant::now();
    let mut executed = 0;
    for frame in 0..frames {
        let now = start + FRAME_STEP * frame;
        let passes = viewer.frame(now);
        viewer.render(&mut backend, &passes)?;
        executed += passes.len();
        if (frame + 1) % 50 == 0 {
            debug!(frame = frame + 1, samples = viewer.scheduler().full().num_samples(), "headless progress");
        }
    }

    let image = export_full(&backend, viewer.scheduler())?;
    let samples = viewer.scheduler().full().num_samples();
    info!(samples, passes = executed, elapsed = ?start.elapsed(), "headless run finished");
    Ok(HeadlessReport {
        image,
        samples,
        passes: executed,
    })
}
