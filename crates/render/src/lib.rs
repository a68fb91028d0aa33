#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

//! Progressive rendering for the sphairahedron viewer.
//!
//! A [`RenderScheduler`] decides every frame which accumulation passes to
//! run; a [`RenderBackend`] executes them, blending each new sample into a
//! ping-pong texture pair so the image converges to the mean of all samples.
//! [`CpuBackend`] is the reference implementation; the `gpu` feature adds a
//! `wgpu` backend with the same behaviour.

pub mod accumulation;
pub mod backend;
pub mod cpu_backend;
pub mod debounce;
pub mod error;
pub mod export;
pub mod gpu_types;
pub mod scheduler;
pub mod shaders;
pub mod uniforms;

#[cfg(feature = "gpu")]
pub mod pipeline;
#[cfg(feature = "gpu")]
pub mod wgpu_backend;

pub use accumulation::{blend, AccumulationChannel, Channel, Extent, RenderPass};
pub use backend::{PixelBuffer, RenderBackend, RowOrder};
pub use cpu_backend::{CpuBackend, SampleShader};
pub use debounce::Debounce;
pub use error::RenderError;
pub use export::{export_full, flip_rows, to_rgba8, to_top_down};
pub use scheduler::{RenderScheduler, SchedulerConfig, TickDecision, TickInput};
pub use uniforms::{FrameSnapshot, UniformTable, UniformTag, UniformValue, UniformValues};

#[cfg(feature = "gpu")]
pub use wgpu_backend::WgpuBackend;
