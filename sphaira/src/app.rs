//! # Sphaira Application Logic
//!
//! Command-line parsing, logging setup and dispatch to the headless or
//! windowed front-end.
//!
//! Without `--window` the viewer runs a fixed number of frames on the CPU
//! backend and writes the converged full-resolution image as a PNG. With the
//! `window` feature and `--window`, a winit window presents the progressive
//! render through `wgpu` and forwards pointer, wheel and keyboard input to
//! the viewer.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use render::{Extent, SchedulerConfig};
use scene::{default_scene, CameraConfig, ManipulationConfig, SceneDesc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::export::{default_export_path, save_png};
use crate::headless::run_headless;
use crate::viewer::Viewer;

#[derive(Debug, Clone, Parser)]
#[command(name = "sphaira", version, about = "Interactive sphairahedron viewer")]
pub struct Args {
    /// JSON scene description; the built-in scene when omitted.
    #[arg(long)]
    pub scene: Option<PathBuf>,
    /// Frames to render in headless mode.
    #[arg(long, default_value_t = 64)]
    pub frames: u32,
    /// PNG output path for headless mode.
    #[arg(long)]
    pub export: Option<PathBuf>,
    #[arg(long, default_value_t = 640)]
    pub width: u32,
    #[arg(long, default_value_t = 480)]
    pub height: u32,
    /// Preview resolution relative to the canvas, in (0, 1].
    #[arg(long, default_value_t = 0.5)]
    pub preview_ratio: f64,
    /// Keep accumulating the full image while idle.
    #[arg(long)]
    pub keep_sampling: bool,
    /// Render interaction at preview resolution.
    #[arg(long)]
    pub low_res: bool,
    /// Open a window instead of rendering headless.
    #[arg(long)]
    pub window: bool,
}

impl Args {
    /// # Errors
    ///
    /// Rejects a preview ratio outside (0, 1].
    pub fn scheduler_config(&self) -> Result<SchedulerConfig> {
        if !(self.preview_ratio > 0.0 && self.preview_ratio <= 1.0) {
            bail!("--preview-ratio must be in (0, 1], got {}", self.preview_ratio);
        }
        Ok(SchedulerConfig {
            preview_ratio: self.preview_ratio,
            keep_sampling_full: self.keep_sampling,
            low_res_interaction: self.low_res,
            ..SchedulerConfig::default()
        })
    }

    /// # Errors
    ///
    /// Fails when the scene file cannot be read or parsed.
    pub fn scene_desc(&self) -> Result<SceneDesc> {
        match &self.scene {
            Some(path) => {
                let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                json.parse::<SceneDesc>().with_context(|| format!("parsing {}", path.display()))
            }
            None => Ok(default_scene()),
        }
    }

    /// Scene, camera and scheduler wired together at the requested size.
    ///
    /// # Errors
    ///
    /// Fails on an unusable scene, preview ratio or canvas size.
    pub fn build_viewer(&self) -> Result<Viewer> {
        let desc = self.scene_desc()?;
        let camera = desc.camera(CameraConfig::default());
        let scene = desc.into_scene(ManipulationConfig::default())?;
        let viewer = Viewer::new(
            scene,
            camera,
            self.scheduler_config()?,
            Extent::new(self.width, self.height),
        )?;
        Ok(viewer)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run the viewer as configured by `args`.
///
/// # Errors
///
/// Returns any error from scene loading, rendering or image export.
pub fn run(args: &Args) -> Result<()> {
    init_tracing();
    let mut viewer = args.build_viewer()?;
    info!(context = ?viewer.scene().shader_context(), "scene ready");

    if args.window {
        return run_window(viewer);
    }

    let report = run_headless(&mut viewer, args.frames)?;
    let path = args.export.clone().unwrap_or_else(default_export_path);
    save_png(&path, &report.image)?;
    Ok(())
}

#[cfg(feature = "window")]
fn run_window(viewer: Viewer) -> Result<()> {
    crate::window::run(viewer)
}

#[cfg(not(feature = "window"))]
fn run_window(_viewer: Viewer) -> Result<()> {
    bail!("this build has no window support; rebuild with `--features window`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_reach_the_scheduler() {
        let args = Args::parse_from(["sphaira", "--preview-ratio", "0.25", "--keep-sampling", "--width", "320"]);
        let config = args.scheduler_config().unwrap();
        assert_eq!(config.preview_ratio, 0.25);
        assert!(config.keep_sampling_full);
        assert!(!config.low_res_interaction);
        assert_eq!(config.debounce, SchedulerConfig::default().debounce);

        let viewer = args.build_viewer().unwrap();
        assert_eq!(viewer.scheduler().full().extent(), Extent::new(320, 480));
        assert_eq!(viewer.scheduler().preview().extent(), Extent::new(80, 120));
    }

    #[test]
    fn bad_preview_ratio_is_rejected() {
        for ratio in ["0", "1.5"] {
            let args = Args::parse_from(["sphaira", "--preview-ratio", ratio]);
            assert!(args.scheduler_config().is_err());
        }
    }
}
