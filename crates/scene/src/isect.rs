//! Closed-form ray intersection routines
//!
//! Every solver reduces to `a t^2 + b t + c = 0` (or a single division for
//! planes) and shares one acceptance policy:
//!
//! - a negative discriminant is a miss,
//! - the smaller root is preferred, but when it is at or below [`THRESHOLD`]
//!   the larger root is used so rays starting inside a volume still hit,
//! - a candidate is accepted only when `THRESHOLD < t < info.tmin`.
//!
//! Accepted hits are written into the caller's [`IsectInfo`]. Passing the
//! same info through several calls therefore keeps the nearest hit, with the
//! earlier of two equal-distance hits winning.

use crate::math::Vec3;
use crate::ray::Ray;
use crate::shape::ShapeId;

/// Hits at or below this distance are treated as self-intersections.
pub const THRESHOLD: f64 = 1e-6;

/// Cardinal world axis, used for manipulation handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis in a vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Indices of the two components orthogonal to this axis.
    #[must_use]
    pub const fn perpendicular(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }

    #[must_use]
    pub const fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Which part of a shape a ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Component {
    /// The primitive itself.
    #[default]
    Body,
    /// One of the translation handles drawn around a selected primitive.
    Handle(Axis),
}

/// Accumulator for a raycast over several shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsectInfo {
    /// Nearest accepted distance so far.
    pub tmin: f64,
    /// Reserved upper bound, not consulted by the current solvers.
    pub tmax: f64,
    pub hit_object: Option<ShapeId>,
    pub component: Component,
}

impl Default for IsectInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl IsectInfo {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_range(f64::INFINITY, f64::INFINITY)
    }

    #[must_use]
    pub const fn with_range(tmin: f64, tmax: f64) -> Self {
        Self {
            tmin,
            tmax,
            hit_object: None,
            component: Component::Body,
        }
    }

    /// Record a hit. No checks happen here; see [`IsectInfo::accepts`].
    pub fn set_info(&mut self, t: f64, hit_object: ShapeId, component: Component) {
        self.tmin = t;
        self.hit_object = Some(hit_object);
        self.component = component;
    }

    /// Whether `t` would strictly improve the nearest hit.
    #[must_use]
    pub fn accepts(&self, t: f64) -> bool {
        THRESHOLD < t && t < self.tmin
    }

    #[must_use]
    pub const fn is_hit(&self) -> bool {
        self.hit_object.is_some()
    }
}

/// Root of `a t^2 + b t + c = 0` chosen by the shared policy, or `None` when
/// there is no real root.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<f64> {
    if a <= 0.0 {
        return None;
    }
    let d = b * b - 4.0 * a * c;
    if d < 0.0 {
        return None;
    }
    let s = d.sqrt();
    let mut t = (-b - s) / (2.0 * a);
    if t <= THRESHOLD {
        t = (-b + s) / (2.0 * a);
    }
    Some(t)
}

/// Ray against a sphere. Returns `true` when `info` was updated.
pub fn intersect_sphere(ray: &Ray, info: &mut IsectInfo, id: ShapeId, center: Vec3, r: f64) -> bool {
    let oc = ray.origin - center;
    let a = ray.dir.dot(ray.dir);
    let b = 2.0 * oc.dot(ray.dir);
    let c = oc.dot(oc) - r * r;
    match solve_quadratic(a, b, c) {
        Some(t) if info.accepts(t) => {
            info.set_info(t, id, Component::Body);
            true
        }
        _ => false,
    }
}

/// Ray against a disc of radius `extent` lying in the plane through `origin`
/// with normal `normal`.
pub fn intersect_plane(
    ray: &Ray,
    info: &mut IsectInfo,
    id: ShapeId,
    origin: Vec3,
    normal: Vec3,
    extent: f64,
) -> bool {
    let denom = ray.dir.dot(normal);
    if denom.abs() < THRESHOLD {
        return false;
    }
    let t = (origin - ray.origin).dot(normal) / denom;
    if !info.accepts(t) {
        return false;
    }
    if ray.point(t).distance(origin) >= extent {
        return false;
    }
    info.set_info(t, id, Component::Body);
    true
}

/// Quadratic coefficients of a ray against the infinite cylinder of radius `r`
/// whose axis runs through `center` along `axis`.
fn axis_cylinder_coefficients(ray: &Ray, center: Vec3, axis: Axis, r: f64) -> (Vec3, f64, f64, f64) {
    let p = ray.origin - center;
    let d = ray.dir;
    let (i, j) = axis.perpendicular();
    let a = d[i] * d[i] + d[j] * d[j];
    let b = 2.0 * (p[i] * d[i] + p[j] * d[j]);
    let c = p[i] * p[i] + p[j] * p[j] - r * r;
    (p, a, b, c)
}

/// Ray against a finite handle: the cylinder of radius `r` starting at
/// `center` and extending `len` along the positive `axis`.
pub fn intersect_axis_handle(
    ray: &Ray,
    info: &mut IsectInfo,
    id: ShapeId,
    center: Vec3,
    axis: Axis,
    r: f64,
    len: f64,
) -> bool {
    let (p, a, b, c) = axis_cylinder_coefficients(ray, center, axis, r);
    let Some(t) = solve_quadratic(a, b, c) else {
        return false;
    };
    let along = (p + ray.dir * t)[axis.index()];
    if info.accepts(t) && 0.0 < along && along < len {
        info.set_info(t, id, Component::Handle(axis));
        return true;
    }
    false
}

/// Ray against the infinite cylinder of radius `r` around `axis` through
/// `center`.
pub fn intersect_axis_cylinder(
    ray: &Ray,
    info: &mut IsectInfo,
    id: ShapeId,
    center: Vec3,
    axis: Axis,
    r: f64,
) -> bool {
    let (_, a, b, c) = axis_cylinder_coefficients(ray, center, axis, r);
    match solve_quadratic(a, b, c) {
        Some(t) if info.accepts(t) => {
            info.set_info(t, id, Component::Handle(axis));
            true
        }
        _ => false,
    }
}

/// Test all three translation handles around `center`.
pub fn intersect_axis_handles(
    ray: &Ray,
    info: &mut IsectInfo,
    id: ShapeId,
    center: Vec3,
    r: f64,
    len: f64,
) -> bool {
    let mut hit = false;
    for axis in Axis::ALL {
        hit |= intersect_axis_handle(ray, info, id, center, axis, r, len);
    }
    hit
}
