//! Scene ownership, selection and drag manipulation
//!
//! The scene owns every primitive in per-kind vectors and tracks at most one
//! selected primitive. Pointer input moves it through
//!
//! ```text
//! Idle -> Selected -> DraggingAxis(X | Y | Z) -> Selected
//!                  -> DraggingScale           -> Selected
//! ```
//!
//! Drag steps mutate primitives in place, raise `parameter_changing` and
//! queue a [`SceneEvent`]. Mouse-up is the only way a drag ends.

use tracing::{debug, trace, warn};

use crate::camera::Camera;
use crate::config::ManipulationConfig;
use crate::error::SceneError;
use crate::events::SceneEvent;
use crate::isect::{self, Axis, Component, IsectInfo};
use crate::math::{Transform, Vec2, Vec3};
use crate::ray::Ray;
use crate::shape::{ControlPoint, Plane, Shape, ShapeId, ShapeKind, Sphere};

/// Counts a shader template needs to size its uniform arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ShaderContext {
    pub num_gen_planes: usize,
    pub num_gen_spheres: usize,
    pub num_divide_planes: usize,
    pub num_control_points: usize,
}

/// Turns a [`ShaderContext`] into shader source.
///
/// The scene never looks at the produced text.
pub trait ShaderTemplate {
    fn render(&self, context: &ShaderContext) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragMode {
    Axis(Axis),
    Scale,
}

/// Snapshot taken on mouse-down, valid until the matching mouse-up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    mode: DragMode,
    prev_origin: Vec3,
    prev_scale: f64,
    prev_mouse: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    gen_spheres: Vec<Sphere>,
    gen_planes: Vec<Plane>,
    divide_planes: Vec<Plane>,
    control_points: Vec<ControlPoint>,
    config: ManipulationConfig,
    selection: Option<ShapeId>,
    selected_axis: Option<Axis>,
    drag: Option<DragSession>,
    scale_armed: bool,
    parameter_changing: bool,
    events: Vec<SceneEvent>,
}

impl Scene {
    #[must_use]
    pub fn new(config: ManipulationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn add_gen_sphere(&mut self, sphere: Sphere) -> ShapeId {
        self.gen_spheres.push(sphere);
        ShapeId::new(ShapeKind::GenSphere, self.gen_spheres.len() - 1)
    }

    pub fn add_gen_plane(&mut self, plane: Plane) -> ShapeId {
        self.gen_planes.push(plane);
        ShapeId::new(ShapeKind::GenPlane, self.gen_planes.len() - 1)
    }

    pub fn add_divide_plane(&mut self, plane: Plane) -> ShapeId {
        self.divide_planes.push(plane);
        ShapeId::new(ShapeKind::DividePlane, self.divide_planes.len() - 1)
    }

    /// # Errors
    ///
    /// Fails when another control point already uses the same name.
    pub fn add_control_point(&mut self, point: ControlPoint) -> Result<ShapeId, SceneError> {
        if self.control_point(&point.name).is_some() {
            return Err(SceneError::DuplicateControlPoint(point.name));
        }
        self.control_points.push(point);
        Ok(ShapeId::new(ShapeKind::ControlPoint, self.control_points.len() - 1))
    }

    #[must_use]
    pub fn gen_spheres(&self) -> &[Sphere] {
        &self.gen_spheres
    }

    #[must_use]
    pub fn gen_planes(&self) -> &[Plane] {
        &self.gen_planes
    }

    #[must_use]
    pub fn divide_planes(&self) -> &[Plane] {
        &self.divide_planes
    }

    #[must_use]
    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    #[must_use]
    pub fn control_point(&self, name: &str) -> Option<&ControlPoint> {
        self.control_points.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub const fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    /// # Errors
    ///
    /// Returns [`SceneError::UnknownShape`] for an index past the end of its
    /// collection.
    pub fn shape(&self, id: ShapeId) -> Result<&dyn Shape, SceneError> {
        let shape: Option<&dyn Shape> = match id.kind {
            ShapeKind::GenSphere => self.gen_spheres.get(id.index).map(|s| s as &dyn Shape),
            ShapeKind::GenPlane => self.gen_planes.get(id.index).map(|p| p as &dyn Shape),
            ShapeKind::DividePlane => self.divide_planes.get(id.index).map(|p| p as &dyn Shape),
            ShapeKind::ControlPoint => self.control_points.get(id.index).map(|c| c as &dyn Shape),
        };
        shape.ok_or(SceneError::UnknownShape {
            kind: id.kind,
            index: id.index,
        })
    }

    /// # Errors
    ///
    /// Same as [`Scene::shape`].
    pub fn shape_mut(&mut self, id: ShapeId) -> Result<&mut dyn Shape, SceneError> {
        let shape: Option<&mut dyn Shape> = match id.kind {
            ShapeKind::GenSphere => self.gen_spheres.get_mut(id.index).map(|s| s as &mut dyn Shape),
            ShapeKind::GenPlane => self.gen_planes.get_mut(id.index).map(|p| p as &mut dyn Shape),
            ShapeKind::DividePlane => self.divide_planes.get_mut(id.index).map(|p| p as &mut dyn Shape),
            ShapeKind::ControlPoint => self.control_points.get_mut(id.index).map(|c| c as &mut dyn Shape),
        };
        shape.ok_or(SceneError::UnknownShape {
            kind: id.kind,
            index: id.index,
        })
    }

    #[must_use]
    pub const fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    /// Axis handle being dragged. Always `None` without a selection.
    #[must_use]
    pub const fn selected_axis(&self) -> Option<Axis> {
        self.selected_axis
    }

    #[must_use]
    pub const fn is_scale_armed(&self) -> bool {
        self.scale_armed
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// True from the first drag step until mouse-up.
    #[must_use]
    pub const fn is_parameter_changing(&self) -> bool {
        self.parameter_changing
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn shader_context(&self) -> ShaderContext {
        ShaderContext {
            num_gen_planes: self.gen_planes.len(),
            num_gen_spheres: self.gen_spheres.len(),
            num_divide_planes: self.divide_planes.len(),
            num_control_points: self.control_points.len(),
        }
    }

    fn pickables(&self) -> impl Iterator<Item = (ShapeId, &dyn Shape)> + '_ {
        let spheres = self
            .gen_spheres
            .iter()
            .enumerate()
            .map(|(i, s)| (ShapeId::new(ShapeKind::GenSphere, i), s as &dyn Shape));
        let planes = self
            .gen_planes
            .iter()
            .enumerate()
            .map(|(i, p)| (ShapeId::new(ShapeKind::GenPlane, i), p as &dyn Shape));
        let divides = self
            .divide_planes
            .iter()
            .enumerate()
            .map(|(i, p)| (ShapeId::new(ShapeKind::DividePlane, i), p as &dyn Shape));
        let points = self
            .control_points
            .iter()
            .enumerate()
            .map(|(i, c)| (ShapeId::new(ShapeKind::ControlPoint, i), c as &dyn Shape));
        spheres.chain(planes).chain(divides).chain(points)
    }

    /// Nearest primitive body along `ray`. Ties keep the earlier primitive.
    #[must_use]
    pub fn cast(&self, ray: &Ray) -> IsectInfo {
        let mut info = IsectInfo::new();
        for (id, shape) in self.pickables() {
            shape.intersect(id, ray, &mut info);
        }
        info
    }

    /// Test the translation handles of the current selection.
    #[must_use]
    pub fn cast_handles(&self, ray: &Ray) -> IsectInfo {
        let mut info = IsectInfo::new();
        if let Some(id) = self.selection {
            if let Ok(shape) = self.shape(id) {
                shape.intersect_handles(
                    id,
                    ray,
                    &mut info,
                    self.config.axis_cylinder_radius,
                    self.config.axis_cylinder_len,
                );
            }
        }
        info
    }

    /// Pick under the pointer.
    ///
    /// With a selection, its axis handles are tested first; a handle hit arms
    /// an axis drag and keeps the selection. Otherwise the nearest primitive
    /// (or nothing) becomes the selection. Returns whether the selected
    /// primitive changed.
    pub fn select_obj(&mut self, camera: &Camera, mouse: Vec2, raster_to_screen: &Transform) -> bool {
        let ray = camera.generate_ray(mouse, raster_to_screen);

        let handle = self.cast_handles(&ray);
        if let (Some(id), Component::Handle(axis)) = (handle.hit_object, handle.component) {
            if let Ok(shape) = self.shape(id) {
                let (prev_origin, prev_scale) = (shape.origin(), shape.scale());
                self.drag = Some(DragSession {
                    mode: DragMode::Axis(axis),
                    prev_origin,
                    prev_scale,
                    prev_mouse: mouse,
                });
                self.selected_axis = Some(axis);
                debug!(?id, ?axis, "axis handle grabbed");
                return false;
            }
        }

        let hit = self.cast(&ray).hit_object;
        self.set_selection(hit)
    }

    /// Replace the selection. Returns whether it changed.
    pub fn set_selection(&mut self, selection: Option<ShapeId>) -> bool {
        let previous = self.selection;
        if previous == selection {
            return false;
        }
        self.selection = selection;
        self.selected_axis = None;
        self.drag = None;
        if selection.is_none() {
            self.scale_armed = false;
        }
        self.events.push(SceneEvent::SelectionChanged {
            previous,
            current: selection,
        });
        debug!(?previous, current = ?selection, "selection changed");
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        self.set_selection(None)
    }

    /// Secondary button pressed. Starts a scale drag when armed, otherwise
    /// picks. Returns whether the selection changed.
    pub fn mouse_right_down(&mut self, camera: &Camera, mouse: Vec2, raster_to_screen: &Transform) -> bool {
        if self.scale_armed {
            if let Some(id) = self.selection {
                if let Ok(shape) = self.shape(id) {
                    let (prev_origin, prev_scale) = (shape.origin(), shape.scale());
                    self.drag = Some(DragSession {
                        mode: DragMode::Scale,
                        prev_origin,
                        prev_scale,
                        prev_mouse: mouse,
                    });
                    debug!(?id, "scale drag started");
                    return false;
                }
            }
        }
        self.select_obj(camera, mouse, raster_to_screen)
    }

    /// Pointer moved with the secondary button held. Returns whether a
    /// primitive changed.
    ///
    /// # Errors
    ///
    /// Fails if a drag session outlived its selection.
    pub fn mouse_right_move(
        &mut self,
        camera: &Camera,
        mouse: Vec2,
        raster_to_screen: &Transform,
    ) -> Result<bool, SceneError> {
        let Some(drag) = self.drag else {
            return Ok(false);
        };
        let id = self.selection.ok_or(SceneError::NoSelection)?;

        let changed = match drag.mode {
            DragMode::Axis(axis) => self.drag_axis(id, axis, &drag, camera, mouse, raster_to_screen)?,
            DragMode::Scale => self.drag_scale(id, &drag, camera, mouse, raster_to_screen)?,
        };
        if changed {
            self.parameter_changing = true;
            self.events.push(SceneEvent::ParameterChanged { id });
        }
        Ok(changed)
    }

    fn drag_axis(
        &mut self,
        id: ShapeId,
        axis: Axis,
        drag: &DragSession,
        camera: &Camera,
        mouse: Vec2,
        raster_to_screen: &Transform,
    ) -> Result<bool, SceneError> {
        let v = camera.axis_direction_on_canvas(axis);
        let along = (mouse - drag.prev_mouse).dot(v);
        let start = camera.project(drag.prev_origin, raster_to_screen);
        let ray = camera.generate_ray(start + v * along, raster_to_screen);

        let mut r = self.shape(id)?.bounding_radius();
        if axis == Axis::Y {
            r *= 2.0;
        }

        let mut info = IsectInfo::new();
        if !isect::intersect_axis_cylinder(&ray, &mut info, id, drag.prev_origin, axis, r) {
            trace!(?id, ?axis, "drag ray missed the axis cylinder");
            return Ok(false);
        }

        let reached = camera.position() + ray.dir * (info.tmin + r);
        let mut origin = drag.prev_origin;
        origin[axis.index()] = reached[axis.index()];
        self.shape_mut(id)?.set_origin(origin);
        trace!(?id, ?axis, ?origin, "axis drag step");
        Ok(true)
    }

    fn drag_scale(
        &mut self,
        id: ShapeId,
        drag: &DragSession,
        camera: &Camera,
        mouse: Vec2,
        raster_to_screen: &Transform,
    ) -> Result<bool, SceneError> {
        let c = camera.project(drag.prev_origin, raster_to_screen);
        let grown = mouse.distance(c) - drag.prev_mouse.distance(c);
        let scale = drag.prev_scale + grown * self.config.scale_per_pixel;
        let shape = self.shape_mut(id)?;
        shape.set_scale(scale);
        trace!(?id, scale = shape.scale(), "scale drag step");
        Ok(true)
    }

    /// Any button released. Ends the drag but keeps the selection.
    pub fn mouse_up(&mut self) {
        if self.drag.take().is_some() {
            debug!(selection = ?self.selection, "drag finished");
        }
        self.selected_axis = None;
        self.parameter_changing = false;
    }

    /// Arms scale dragging while the scale key is held over a selection.
    pub fn key_down(&mut self, key: char) {
        if key != self.config.scale_key {
            return;
        }
        if self.selection.is_some() {
            self.scale_armed = true;
        } else {
            warn!("scale key pressed without a selection");
        }
    }

    pub fn key_up(&mut self, key: char) {
        if key == self.config.scale_key {
            self.scale_armed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::raster_to_screen;

    fn front_camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO, Vec3::Y, 60.0)
    }

    #[test]
    fn shape_lookup_rejects_bad_index() {
        let mut scene = Scene::default();
        let id = scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
        assert!(scene.shape(id).is_ok());
        let bad = ShapeId::new(ShapeKind::GenPlane, 3);
        assert!(matches!(
            scene.shape(bad),
            Err(SceneError::UnknownShape { kind: ShapeKind::GenPlane, index: 3 })
        ));
    }

    #[test]
    fn duplicate_control_point_names_are_rejected() {
        let mut scene = Scene::default();
        scene.add_control_point(ControlPoint::new("a", Vec3::ZERO)).unwrap();
        let err = scene.add_control_point(ControlPoint::new("a", Vec3::X));
        assert!(matches!(err, Err(SceneError::DuplicateControlPoint(_))));
        assert_eq!(scene.control_points().len(), 1);
    }

    #[test]
    fn shader_context_counts_collections() {
        let mut scene = Scene::default();
        scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
        scene.add_gen_sphere(Sphere::new(Vec3::X, 1.0));
        scene.add_gen_plane(Plane::from_points(Vec3::ZERO, Vec3::X, Vec3::Z));
        let ctx = scene.shader_context();
        assert_eq!(ctx.num_gen_spheres, 2);
        assert_eq!(ctx.num_gen_planes, 1);
        assert_eq!(ctx.num_divide_planes, 0);
        assert_eq!(ctx.num_control_points, 0);
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let mut scene = Scene::default();
        scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
        let cam = front_camera();
        let rts = raster_to_screen(800.0, 600.0);
        assert!(!scene.mouse_right_move(&cam, Vec2::new(10.0, 10.0), &rts).unwrap());
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn scale_key_needs_a_selection() {
        let mut scene = Scene::default();
        let id = scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
        scene.key_down('s');
        assert!(!scene.is_scale_armed());
        scene.set_selection(Some(id));
        scene.key_down('x');
        assert!(!scene.is_scale_armed());
        scene.key_down('s');
        assert!(scene.is_scale_armed());
        scene.key_up('s');
        assert!(!scene.is_scale_armed());
    }

    #[test]
    fn clearing_selection_disarms_scale() {
        let mut scene = Scene::default();
        let id = scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
        scene.set_selection(Some(id));
        scene.key_down('s');
        assert!(scene.clear_selection());
        assert!(!scene.is_scale_armed());
        assert_eq!(scene.selected_axis(), None);
        assert!(!scene.clear_selection());
    }
}
