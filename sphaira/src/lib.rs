#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

//! # Sphaira: interactive sphairahedron viewer
//!
//! This crate ties the workspace together. The [`scene`] crate owns the
//! primitives, camera and manipulation state machine; the [`render`] crate
//! schedules progressive accumulation passes and executes them on a backend.
//! Here a [`Viewer`] routes device-independent input into both, and two
//! front-ends drive it:
//!
//! -   **Headless** ([`headless`]): a fixed number of frames on the CPU
//!     backend with the [`SceneTracer`] sample function, saved as a PNG.
//! -   **Windowed** (feature `window`): a winit event loop presenting through
//!     the `wgpu` backend with the WGSL produced by [`WgslSceneTemplate`].
//!
//! ## Input mapping
//!
//! | input | effect |
//! |---|---|
//! | left drag | orbit the camera around its target |
//! | right click | select the primitive under the pointer, or clear |
//! | right drag on a handle | move the selection along that axis |
//! | hold `s` + right drag | scale the selection |
//! | wheel | zoom towards the target |

pub mod app;
pub mod export;
pub mod headless;
pub mod input;
pub mod template;
pub mod tracer;
pub mod viewer;

#[cfg(feature = "window")]
pub mod window;

pub use headless::{run_headless, HeadlessReport};
pub use input::{CanvasGeometry, InputEvent, MouseButton};
pub use template::WgslSceneTemplate;
pub use tracer::SceneTracer;
pub use viewer::Viewer;

pub use render;
pub use scene;
