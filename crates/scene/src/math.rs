//! Vector and transform utilities
//!
//! Scene math runs in double precision on top of `glam`'s `D*` types so that
//! the picking thresholds (1e-6) stay meaningful. A [`Transform`] carries its
//! inverse next to the forward matrix; the factories that matter for the
//! camera (`look_at`, `perspective`) build both analytically.
//!
//! Normalizing a zero-length vector is a caller error. Nothing here guards
//! against it, the result is NaN.

use glam::{DMat4, DVec4};
use std::ops::Mul;

pub use glam::{DVec2 as Vec2, DVec3 as Vec3};

/// 4x4 affine or projective transform with a cached inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: DMat4,
    m_inv: DMat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        m: DMat4::IDENTITY,
        m_inv: DMat4::IDENTITY,
    };

    /// Wrap an arbitrary matrix. The inverse is computed once here.
    #[must_use]
    pub fn new(m: DMat4) -> Self {
        Self {
            m,
            m_inv: m.inverse(),
        }
    }

    /// Build from a matrix and its known inverse.
    #[must_use]
    pub const fn from_parts(m: DMat4, m_inv: DMat4) -> Self {
        Self { m, m_inv }
    }

    #[must_use]
    pub fn translate(v: Vec3) -> Self {
        Self::from_parts(DMat4::from_translation(v), DMat4::from_translation(-v))
    }

    /// Non-uniform scale. Every factor must be non-zero.
    #[must_use]
    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self::from_parts(
            DMat4::from_scale(Vec3::new(x, y, z)),
            DMat4::from_scale(Vec3::new(1.0 / x, 1.0 / y, 1.0 / z)),
        )
    }

    /// Rotation of `angle_deg` degrees about `axis`.
    ///
    /// `axis` is normalized here and must not be zero.
    #[must_use]
    pub fn rotate(angle_deg: f64, axis: Vec3) -> Self {
        let m = DMat4::from_axis_angle(axis.normalize(), angle_deg.to_radians());
        Self::from_parts(m, m.transpose())
    }

    /// Right-handed world-to-camera transform.
    ///
    /// The camera looks down its local `-z`. Undefined when `up` is parallel to
    /// `target - eye`.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        let camera_to_world = DMat4::from_cols(
            s.extend(0.0),
            u.extend(0.0),
            (-f).extend(0.0),
            eye.extend(1.0),
        );
        let world_to_camera = DMat4::from_cols(
            DVec4::new(s.x, u.x, -f.x, 0.0),
            DVec4::new(s.y, u.y, -f.y, 0.0),
            DVec4::new(s.z, u.z, -f.z, 0.0),
            DVec4::new(-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0),
        );
        Self::from_parts(world_to_camera, camera_to_world)
    }

    /// Right-handed perspective projection with vertical field of view in
    /// degrees, clip depth mapped to `[-1, 1]`.
    ///
    /// The aspect ratio is not part of the projection; the raster-to-screen
    /// transform widens the screen window instead.
    #[must_use]
    pub fn perspective(fov_deg: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (fov_deg.to_radians() * 0.5).tan();
        let a = (far + near) / (near - far);
        let b = 2.0 * far * near / (near - far);

        let m = DMat4::from_cols(
            DVec4::new(f, 0.0, 0.0, 0.0),
            DVec4::new(0.0, f, 0.0, 0.0),
            DVec4::new(0.0, 0.0, a, -1.0),
            DVec4::new(0.0, 0.0, b, 0.0),
        );
        let m_inv = DMat4::from_cols(
            DVec4::new(1.0 / f, 0.0, 0.0, 0.0),
            DVec4::new(0.0, 1.0 / f, 0.0, 0.0),
            DVec4::new(0.0, 0.0, 0.0, 1.0 / b),
            DVec4::new(0.0, 0.0, -1.0, a / b),
        );
        Self::from_parts(m, m_inv)
    }

    #[must_use]
    pub const fn matrix(&self) -> &DMat4 {
        &self.m
    }

    #[must_use]
    pub const fn inverse_matrix(&self) -> &DMat4 {
        &self.m_inv
    }

    #[must_use]
    pub const fn inverse(&self) -> Self {
        Self::from_parts(self.m_inv, self.m)
    }

    /// `self * other`: `other` is applied first.
    #[must_use]
    pub fn mult(&self, other: &Self) -> Self {
        Self::from_parts(self.m * other.m, other.m_inv * self.m_inv)
    }

    /// Transform a point, including the homogeneous divide.
    #[must_use]
    pub fn apply_to_point(&self, p: Vec3) -> Vec3 {
        self.m.project_point3(p)
    }

    /// Transform a direction. Translation and the projective row are ignored.
    #[must_use]
    pub fn apply_to_vec(&self, v: Vec3) -> Vec3 {
        self.m.transform_vector3(v)
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.mult(&rhs)
    }
}

/// Column-major single precision copy of a matrix for GPU upload.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_gpu_matrix(m: &DMat4) -> [[f32; 4]; 4] {
    let cols = m.to_cols_array_2d();
    cols.map(|col| col.map(|v| v as f32))
}
