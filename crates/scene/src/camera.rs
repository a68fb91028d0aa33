//! Orbit camera and screen/world mapping
//!
//! The camera circles a target point. Its view and projection transforms are
//! caches derived from `pos`, `target`, `up` and `fov`; every mutating method
//! rebuilds them before returning.
//!
//! Screen coordinates are canvas pixels with the origin in the top-left corner
//! and `y` growing downwards. [`raster_to_screen`] maps them to the screen
//! window `[-aspect, aspect] x [-1, 1]` that the projection expects.

use crate::isect::Axis;
use crate::math::{Transform, Vec2, Vec3};
use crate::ray::Ray;

/// Tunables for camera interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Distance multiplier applied per wheel notch.
    pub zoom_factor: f64,
    /// Orbit angle per pixel of mouse travel.
    pub degrees_per_pixel: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.2,
            degrees_per_pixel: 1.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

/// State captured when an orbit drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrbitDrag {
    prev_position: Vec3,
    prev_up: Vec3,
    prev_mouse: Vec2,
}

/// Perspective camera orbiting `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pos: Vec3,
    target: Vec3,
    up: Vec3,
    fov: f64,
    dist_to_target: f64,
    config: CameraConfig,
    view: Transform,
    projection: Transform,
    drag: Option<OrbitDrag>,
}

impl Camera {
    /// `fov` is the vertical field of view in degrees.
    #[must_use]
    pub fn new(pos: Vec3, target: Vec3, up: Vec3, fov: f64) -> Self {
        Self::with_config(pos, target, up, fov, CameraConfig::default())
    }

    #[must_use]
    pub fn with_config(pos: Vec3, target: Vec3, up: Vec3, fov: f64, config: CameraConfig) -> Self {
        let mut camera = Self {
            pos,
            target,
            up,
            fov,
            dist_to_target: pos.distance(target),
            config,
            view: Transform::IDENTITY,
            projection: Transform::IDENTITY,
            drag: None,
        };
        camera.update();
        camera
    }

    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.pos
    }

    #[must_use]
    pub const fn target(&self) -> Vec3 {
        self.target
    }

    #[must_use]
    pub const fn up(&self) -> Vec3 {
        self.up
    }

    #[must_use]
    pub const fn fov(&self) -> f64 {
        self.fov
    }

    #[must_use]
    pub const fn distance_to_target(&self) -> f64 {
        self.dist_to_target
    }

    #[must_use]
    pub const fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// World-to-camera transform.
    #[must_use]
    pub const fn view(&self) -> &Transform {
        &self.view
    }

    #[must_use]
    pub const fn projection(&self) -> &Transform {
        &self.projection
    }

    /// Whether an orbit drag snapshot is active.
    #[must_use]
    pub const fn is_orbiting(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_position(&mut self, pos: Vec3) {
        self.pos = pos;
        self.update();
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.update();
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
        self.update();
    }

    pub fn set_fov(&mut self, fov: f64) {
        self.fov = fov;
        self.update();
    }

    /// Rebuild the derived distance, view and projection.
    pub fn update(&mut self) {
        self.dist_to_target = self.pos.distance(self.target);
        self.view = Transform::look_at(self.pos, self.target, self.up);
        self.projection = Transform::perspective(self.fov, self.config.near, self.config.far);
    }

    /// Capture the drag-start snapshot used by [`Camera::orbit`].
    pub fn begin_orbit(&mut self, mouse: Vec2) {
        self.drag = Some(OrbitDrag {
            prev_position: self.pos,
            prev_up: self.up,
            prev_mouse: mouse,
        });
    }

    /// Orbit by the total mouse travel since the drag started.
    ///
    /// The rotation is always applied to the drag-start position, so calling
    /// this with a cumulative delta gives the same result however many
    /// intermediate moves came before. Without an active drag the current
    /// pose becomes the snapshot.
    pub fn orbit(&mut self, delta: Vec2) {
        let drag = *self.drag.get_or_insert(OrbitDrag {
            prev_position: self.pos,
            prev_up: self.up,
            prev_mouse: Vec2::ZERO,
        });

        let dir = (self.target - drag.prev_position).normalize();
        let rot_axis = dir.cross(drag.prev_up);
        let vertical = Transform::rotate(-delta.y * self.config.degrees_per_pixel, rot_axis);
        let horizontal = Transform::rotate(delta.x * self.config.degrees_per_pixel, Vec3::Y);
        let rotation = horizontal * vertical;

        let to_target = Transform::translate(self.target);
        let m = to_target * rotation * to_target.inverse();

        self.pos = m.apply_to_point(drag.prev_position);
        self.up = rotation.apply_to_vec(drag.prev_up);
        self.update();
    }

    /// Orbit to follow the pointer at `mouse`.
    pub fn orbit_to(&mut self, mouse: Vec2) {
        match self.drag {
            Some(drag) => self.orbit(mouse - drag.prev_mouse),
            None => self.begin_orbit(mouse),
        }
    }

    pub fn end_orbit(&mut self) {
        self.drag = None;
    }

    /// Wheel zoom: negative deltas move closer, zero and positive deltas
    /// move away.
    pub fn zoom(&mut self, delta: f64) {
        let d = if delta < 0.0 {
            self.dist_to_target / self.config.zoom_factor
        } else {
            self.dist_to_target * self.config.zoom_factor
        };
        self.set_distance(d);
    }

    /// Move along the current viewing direction to `distance` from the target.
    pub fn set_distance(&mut self, distance: f64) {
        let dir = (self.pos - self.target).normalize();
        self.pos = self.target + dir * distance;
        self.update();
    }

    /// World-space ray from the camera through canvas pixel `coord`.
    #[must_use]
    pub fn generate_ray(&self, coord: Vec2, raster_to_screen: &Transform) -> Ray {
        let raster_to_camera = self.projection.inverse() * *raster_to_screen;
        let p_camera = raster_to_camera.apply_to_point(Vec3::new(coord.x, coord.y, 0.0));
        let dir = self.view.inverse().apply_to_vec(p_camera.normalize());
        Ray::new(self.pos, dir.normalize())
    }

    /// Canvas pixel a world point projects to.
    #[must_use]
    pub fn project(&self, world: Vec3, raster_to_screen: &Transform) -> Vec2 {
        let view_projection = self.projection * self.view;
        let p = view_projection.apply_to_point(world);
        let np = raster_to_screen.inverse().apply_to_point(p);
        Vec2::new(np.x, np.y)
    }

    /// Unit canvas direction of a world vector, with `y` flipped to grow
    /// downwards.
    #[must_use]
    pub fn project_direction(&self, v: Vec3) -> Vec2 {
        let view_projection = self.projection * self.view;
        let nv = view_projection.apply_to_vec(v.normalize()).normalize();
        Vec2::new(nv.x, -nv.y)
    }

    #[must_use]
    pub fn axis_direction_on_canvas(&self, axis: Axis) -> Vec2 {
        self.project_direction(axis.unit())
    }
}

/// Map canvas pixels of a `width` x `height` canvas to the screen window.
#[must_use]
pub fn raster_to_screen(width: f64, height: f64) -> Transform {
    let aspect = width / height;
    Transform::translate(Vec3::new(-aspect, 1.0, 0.0)) * Transform::scale(2.0 / height, -2.0 / height, 1.0)
}
