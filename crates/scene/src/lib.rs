#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]
//! # Sphaira scene core
//!
//! Geometry and interaction state for the sphairahedron viewer.
//!
//! ## Key Components
//!
//! -   **Math:** [`Transform`] pairs a 4x4 matrix with its inverse. Vectors are
//!     `glam` doubles re-exported as [`Vec2`] and [`Vec3`].
//! -   **Intersection:** the [`isect`] module holds the closed-form ray tests
//!     and the shared root-acceptance policy used for picking.
//! -   **Camera:** [`Camera`] orbits a target and maps canvas pixels to world
//!     rays and back.
//! -   **Scene:** [`Scene`] owns the generator spheres, generator planes,
//!     divide planes and control points, tracks the selection and applies
//!     axis and scale drags.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scene::{default_scene, raster_to_screen, CameraConfig, ManipulationConfig, Vec2};
//!
//! let desc = default_scene();
//! let camera = desc.camera(CameraConfig::default());
//! let mut scene = desc.into_scene(ManipulationConfig::default())?;
//!
//! let rts = raster_to_screen(800.0, 600.0);
//! if scene.mouse_right_down(&camera, Vec2::new(400.0, 300.0), &rts) {
//!     println!("selected {:?}", scene.selection());
//! }
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod isect;
pub mod math;
pub mod ray;
pub mod scene;
pub mod shape;

pub use camera::{raster_to_screen, Camera, CameraConfig};
pub use config::{default_scene, CameraDesc, ManipulationConfig, Primitive, SceneDesc};
pub use error::SceneError;
pub use events::SceneEvent;
pub use isect::{Axis, Component, IsectInfo, THRESHOLD};
pub use math::{Transform, Vec2, Vec3};
pub use ray::Ray;
pub use scene::{Scene, ShaderContext, ShaderTemplate};
pub use shape::{ControlPoint, Plane, Shape, ShapeId, ShapeKind, Sphere, MIN_SCALE};
