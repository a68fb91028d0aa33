use crate::math::Vec3;

/// Parametric ray `origin + dir * t`.
///
/// `dir` is not normalized here. Intersection routines that reason in world
/// distances expect callers to pass a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    #[must_use]
    pub const fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// Point reached at parameter `t`.
    #[must_use]
    pub fn point(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Copy of this ray with a unit-length direction.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self::new(self.origin, self.dir.normalize())
    }
}
