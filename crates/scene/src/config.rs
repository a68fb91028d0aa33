//! Tunables and the JSON scene description
//!
//! A scene file lists primitives tagged by kind, in collection order:
//!
//! ```json
//! {
//!   "camera": { "pos": [8, 0, 0], "target": [0, 0, 0], "fov": 60 },
//!   "primitives": [
//!     { "kind": "gen_sphere", "center": [0, 0, 0], "radius": 1 },
//!     { "kind": "gen_plane", "p1": [0, 0, 0], "p2": [1, 0, 0], "p3": [0, 0, 1], "extent": 3 },
//!     { "kind": "control_point", "name": "apex", "center": [0, 2, 0] }
//!   ]
//! }
//! ```

use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::camera::{Camera, CameraConfig};
use crate::error::SceneError;
use crate::math::Vec3;
use crate::scene::Scene;
use crate::shape::{ControlPoint, Plane, Sphere};

/// Handle geometry and drag sensitivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulationConfig {
    pub axis_cylinder_radius: f64,
    pub axis_cylinder_len: f64,
    /// Multiplier on the radial mouse travel added to the scale in a scale
    /// drag. At 1.0 each pixel outward adds one unit.
    pub scale_per_pixel: f64,
    pub scale_key: char,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            axis_cylinder_radius: 0.05,
            axis_cylinder_len: 1.0,
            scale_per_pixel: 1.0,
            scale_key: 's',
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub camera: CameraDesc,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CameraDesc {
    pub pos: [f64; 3],
    #[serde(default)]
    pub target: [f64; 3],
    #[serde(default = "y_up")]
    pub up: [f64; 3],
    #[serde(default = "default_fov")]
    pub fov: f64,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            pos: [8.0, 0.0, 0.0],
            target: [0.0; 3],
            up: y_up(),
            fov: default_fov(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    GenSphere {
        center: [f64; 3],
        radius: f64,
    },
    GenPlane {
        p1: [f64; 3],
        p2: [f64; 3],
        p3: [f64; 3],
        normal: Option<[f64; 3]>,
        #[serde(default = "plane_extent")]
        extent: f64,
    },
    DividePlane {
        p1: [f64; 3],
        p2: [f64; 3],
        p3: [f64; 3],
        normal: Option<[f64; 3]>,
        #[serde(default = "plane_extent")]
        extent: f64,
    },
    ControlPoint {
        name: String,
        center: [f64; 3],
        #[serde(default = "control_point_radius")]
        radius: f64,
    },
}

fn y_up() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f64 {
    60.0
}

fn control_point_radius() -> f64 {
    ControlPoint::DEFAULT_RADIUS
}

fn plane_extent() -> f64 {
    Plane::DEFAULT_EXTENT
}

fn plane(
    p1: [f64; 3],
    p2: [f64; 3],
    p3: [f64; 3],
    normal: Option<[f64; 3]>,
    extent: f64,
) -> Result<Plane, SceneError> {
    let (p1, p2, p3) = (Vec3::from(p1), Vec3::from(p2), Vec3::from(p3));
    let n = normal.map_or_else(|| (p2 - p1).cross(p3 - p1), Vec3::from);
    if n.length_squared() < f64::EPSILON {
        return Err(SceneError::Degenerate("plane normal"));
    }
    if extent <= 0.0 {
        return Err(SceneError::Degenerate("plane extent"));
    }
    Ok(Plane::new(p1, p2, p3, n).with_extent(extent))
}

impl FromStr for SceneDesc {
    type Err = SceneError;

    /// Returns [`SceneError::Parse`] for malformed JSON.
    fn from_str(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl SceneDesc {
    /// Build the scene in file order.
    ///
    /// # Errors
    ///
    /// Fails on non-positive radii or extents, planes without a usable normal and
    /// duplicate control point names.
    pub fn into_scene(self, config: ManipulationConfig) -> Result<Scene, SceneError> {
        let mut scene = Scene::new(config);
        for primitive in self.primitives {
            match primitive {
                Primitive::GenSphere { center, radius } => {
                    if radius <= 0.0 {
                        return Err(SceneError::Degenerate("sphere radius"));
                    }
                    scene.add_gen_sphere(Sphere::new(Vec3::from(center), radius));
                }
                Primitive::GenPlane {
                    p1,
                    p2,
                    p3,
                    normal,
                    extent,
                } => {
                    scene.add_gen_plane(plane(p1, p2, p3, normal, extent)?);
                }
                Primitive::DividePlane {
                    p1,
                    p2,
                    p3,
                    normal,
                    extent,
                } => {
                    scene.add_divide_plane(plane(p1, p2, p3, normal, extent)?);
                }
                Primitive::ControlPoint { name, center, radius } => {
                    if radius <= 0.0 {
                        return Err(SceneError::Degenerate("control point radius"));
                    }
                    let mut point = ControlPoint::new(name, Vec3::from(center));
                    point.radius = radius;
                    scene.add_control_point(point)?;
                }
            }
        }
        debug!(context = ?scene.shader_context(), "scene loaded");
        Ok(scene)
    }

    #[must_use]
    pub fn camera(&self, config: CameraConfig) -> Camera {
        let c = &self.camera;
        Camera::with_config(
            Vec3::from(c.pos),
            Vec3::from(c.target),
            Vec3::from(c.up),
            c.fov,
            config,
        )
    }
}

/// Scene used when no description file is given: three generator spheres
/// sitting on a floor plane, one divide plane and a control point at the top.
#[must_use]
pub fn default_scene() -> SceneDesc {
    let h = 3.0_f64.sqrt() / 2.0;
    SceneDesc {
        camera: CameraDesc::default(),
        primitives: vec![
            Primitive::GenSphere {
                center: [1.0, 0.0, 0.0],
                radius: h,
            },
            Primitive::GenSphere {
                center: [-0.5, 0.0, h],
                radius: h,
            },
            Primitive::GenSphere {
                center: [-0.5, 0.0, -h],
                radius: h,
            },
            Primitive::GenPlane {
                p1: [0.0, -1.0, 0.0],
                p2: [0.0, -1.0, 1.0],
                p3: [1.0, -1.0, 0.0],
                normal: None,
                extent: 3.0,
            },
            Primitive::DividePlane {
                p1: [0.0, 0.0, 0.0],
                p2: [0.0, 1.0, 0.0],
                p3: [0.0, 0.0, 1.0],
                normal: None,
                extent: 2.0,
            },
            Primitive::ControlPoint {
                name: "apex".to_owned(),
                center: [0.0, 1.0, 0.0],
                radius: ControlPoint::DEFAULT_RADIUS,
            },
        ],
    }
}
