//! Scene primitives and the shared shape interface
//!
//! Primitives live in per-kind vectors owned by [`crate::Scene`]. Everything
//! outside the scene refers to them through a [`ShapeId`], a kind plus an
//! index, so a selection can never dangle into a reallocated vector.

use crate::isect::{self, IsectInfo};
use crate::math::Vec3;
use crate::ray::Ray;

/// Smallest radius or extent a drag can shrink a primitive to.
pub const MIN_SCALE: f64 = 1e-4;

/// Collection a primitive belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    GenSphere,
    GenPlane,
    DividePlane,
    ControlPoint,
}

/// Handle to a primitive inside a [`crate::Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId {
    pub kind: ShapeKind,
    pub index: usize,
}

impl ShapeId {
    #[must_use]
    pub const fn new(kind: ShapeKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// Interface shared by every pickable primitive.
pub trait Shape {
    /// Intersect the primitive body, updating `info` on an accepted hit.
    fn intersect(&self, id: ShapeId, ray: &Ray, info: &mut IsectInfo) -> bool;

    /// Anchor point used for handles and translation.
    fn origin(&self) -> Vec3;

    fn set_origin(&mut self, origin: Vec3);

    /// Scalar size edited by scale drags.
    fn scale(&self) -> f64;

    fn set_scale(&mut self, scale: f64);

    /// Radius of the cylinder an axis drag is constrained to.
    fn bounding_radius(&self) -> f64;

    /// Test the three translation handles drawn at [`Shape::origin`].
    fn intersect_handles(&self, id: ShapeId, ray: &Ray, info: &mut IsectInfo, r: f64, len: f64) -> bool {
        isect::intersect_axis_handles(ray, info, id, self.origin(), r, len)
    }
}

/// Generator sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Sphere {
    #[must_use]
    pub const fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Shape for Sphere {
    fn intersect(&self, id: ShapeId, ray: &Ray, info: &mut IsectInfo) -> bool {
        isect::intersect_sphere(ray, info, id, self.center, self.radius)
    }

    fn origin(&self) -> Vec3 {
        self.center
    }

    fn set_origin(&mut self, origin: Vec3) {
        self.center = origin;
    }

    fn scale(&self) -> f64 {
        self.radius
    }

    fn set_scale(&mut self, scale: f64) {
        self.radius = scale.max(MIN_SCALE);
    }

    fn bounding_radius(&self) -> f64 {
        self.radius
    }
}

/// Plane given by three points and an explicit normal.
///
/// Generator planes bound the fundamental domain; divide planes split it.
/// For picking, a plane is the disc of radius `extent` around `p1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
    pub normal: Vec3,
    pub extent: f64,
}

impl Plane {
    pub const DEFAULT_EXTENT: f64 = 1.0;

    #[must_use]
    pub fn new(p1: Vec3, p2: Vec3, p3: Vec3, normal: Vec3) -> Self {
        Self {
            p1,
            p2,
            p3,
            normal: normal.normalize(),
            extent: Self::DEFAULT_EXTENT,
        }
    }

    /// Plane through three non-collinear points, normal by the right-hand rule.
    #[must_use]
    pub fn from_points(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self::new(p1, p2, p3, (p2 - p1).cross(p3 - p1))
    }

    #[must_use]
    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }
}

impl Shape for Plane {
    fn intersect(&self, id: ShapeId, ray: &Ray, info: &mut IsectInfo) -> bool {
        isect::intersect_plane(ray, info, id, self.p1, self.normal, self.extent)
    }

    fn origin(&self) -> Vec3 {
        self.p1
    }

    fn set_origin(&mut self, origin: Vec3) {
        let delta = origin - self.p1;
        self.p1 += delta;
        self.p2 += delta;
        self.p3 += delta;
    }

    fn scale(&self) -> f64 {
        self.extent
    }

    fn set_scale(&mut self, scale: f64) {
        self.extent = scale.max(MIN_SCALE);
    }

    fn bounding_radius(&self) -> f64 {
        self.extent
    }
}

/// Named marker point exposed to the shader.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    pub name: String,
    pub center: Vec3,
    pub radius: f64,
}

impl ControlPoint {
    pub const DEFAULT_RADIUS: f64 = 0.1;

    #[must_use]
    pub fn new(name: impl Into<String>, center: Vec3) -> Self {
        Self {
            name: name.into(),
            center,
            radius: Self::DEFAULT_RADIUS,
        }
    }
}

impl Shape for ControlPoint {
    fn intersect(&self, id: ShapeId, ray: &Ray, info: &mut IsectInfo) -> bool {
        isect::intersect_sphere(ray, info, id, self.center, self.radius)
    }

    fn origin(&self) -> Vec3 {
        self.center
    }

    fn set_origin(&mut self, origin: Vec3) {
        self.center = origin;
    }

    fn scale(&self) -> f64 {
        self.radius
    }

    fn set_scale(&mut self, scale: f64) {
        self.radius = scale.max(MIN_SCALE);
    }

    fn bounding_radius(&self) -> f64 {
        self.radius
    }
}
