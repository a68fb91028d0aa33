//! GPU-compatible type definitions for rendering
//!
//! Buffer records uploaded to the WGSL accumulation shader. All types are
//! `Pod` and laid out to match WGSL's alignment rules; padding is spelled out
//! as scalar fields so the shader-side structs can mirror them one to one.

use bytemuck::{Pod, Zeroable};
use scene::math::to_gpu_matrix;
use scene::{ControlPoint, Plane, Sphere, Vec3};

use crate::uniforms::FrameSnapshot;

#[allow(clippy::cast_possible_truncation)]
fn f32x3(v: Vec3) -> [f32; 3] {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Per-pass uniform block.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniformGpu {
    /// Inverse projection, clip space to camera space
    pub project_inverse: [[f32; 4]; 4],
    pub camera_to_world: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    /// Weight of the previous image in the running mean
    pub texture_weight: f32,
    pub num_samples: f32,
    pub max_iterations: u32,
    pub fudge_factor: f32,
    pub num_gen_spheres: u32,
    pub num_gen_planes: u32,
    pub num_divide_planes: u32,
    pub num_control_points: u32,
    pub has_selection: u32,
    pub _pad0: u32,
    pub selection_origin: [f32; 3],
    pub handle_radius: f32,
    pub handle_length: f32,
    pub _pad1: [f32; 3],
}

impl From<&FrameSnapshot<'_>> for FrameUniformGpu {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from(frame: &FrameSnapshot<'_>) -> Self {
        let scene = frame.scene;
        let ctx = scene.shader_context();
        let selection_origin = scene
            .selection()
            .and_then(|id| scene.shape(id).ok())
            .map_or(Vec3::ZERO, |shape| shape.origin());
        Self {
            project_inverse: to_gpu_matrix(frame.camera.projection().inverse_matrix()),
            camera_to_world: to_gpu_matrix(frame.camera.view().inverse_matrix()),
            resolution: [frame.pass.extent.width as f32, frame.pass.extent.height as f32],
            texture_weight: frame.pass.texture_weight,
            num_samples: frame.pass.num_samples as f32,
            max_iterations: frame.max_iterations,
            fudge_factor: frame.fudge_factor,
            num_gen_spheres: ctx.num_gen_spheres as u32,
            num_gen_planes: ctx.num_gen_planes as u32,
            num_divide_planes: ctx.num_divide_planes as u32,
            num_control_points: ctx.num_control_points as u32,
            has_selection: u32::from(scene.selection().is_some()),
            _pad0: 0,
            selection_origin: f32x3(selection_origin),
            handle_radius: scene.config().axis_cylinder_radius as f32,
            handle_length: scene.config().axis_cylinder_len as f32,
            _pad1: [0.0; 3],
        }
    }
}

/// GPU representation of a generator sphere
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SphereGpu {
    pub center: [f32; 3],
    pub r: f32,
    /// Squared radius, precomputed for inversions
    pub r2: f32,
    pub _pad: [f32; 3],
}

impl From<&Sphere> for SphereGpu {
    #[allow(clippy::cast_possible_truncation)]
    fn from(sphere: &Sphere) -> Self {
        Self {
            center: f32x3(sphere.center),
            r: sphere.radius as f32,
            r2: (sphere.radius * sphere.radius) as f32,
            _pad: [0.0; 3],
        }
    }
}

/// GPU representation of a generator or divide plane
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PlaneGpu {
    /// A point on the plane
    pub origin: [f32; 3],
    /// Radius of the drawn disc around `origin`
    pub extent: f32,
    /// Unit normal
    pub normal: [f32; 3],
    pub _pad1: f32,
}

impl From<&Plane> for PlaneGpu {
    #[allow(clippy::cast_possible_truncation)]
    fn from(plane: &Plane) -> Self {
        Self {
            origin: f32x3(plane.p1),
            extent: plane.extent as f32,
            normal: f32x3(plane.normal),
            _pad1: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ControlPointGpu {
    pub center: [f32; 3],
    pub r: f32,
}

impl From<&ControlPoint> for ControlPointGpu {
    #[allow(clippy::cast_possible_truncation)]
    fn from(point: &ControlPoint) -> Self {
        Self {
            center: f32x3(point.center),
            r: point.radius as f32,
        }
    }
}

/// Convert a primitive slice for upload.
///
/// Storage bindings may not be empty, so an empty slice yields one zeroed
/// record; the shader ignores it because the matching count is zero.
pub fn pack<'a, T, G>(items: &'a [T]) -> Vec<G>
where
    G: From<&'a T> + Zeroable,
{
    if items.is_empty() {
        return vec![G::zeroed()];
    }
    items.iter().map(G::from).collect()
}
