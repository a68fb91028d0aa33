//! CPU sample function for headless rendering.
//!
//! Casts one primary ray per sample through the frame's camera uniforms and
//! shades the nearest generator sphere, plane disc, divide plane disc,
//! control point or selection handle with a headlight. Everything is read
//! from the evaluated uniforms by name, the same way the GPU shader sees it.

use glam::DMat4;
use render::{RenderError, SampleShader, UniformTag, UniformValues};
use scene::isect::{self, Axis, Component, IsectInfo};
use scene::{Ray, ShaderContext, ShapeId, ShapeKind, Vec3};

const SPHERE_COLOR: Vec3 = Vec3::new(0.85, 0.6, 0.35);
const PLANE_COLOR: Vec3 = Vec3::new(0.55, 0.6, 0.65);
const DIVIDE_COLOR: Vec3 = Vec3::new(0.35, 0.55, 0.8);
const CONTROL_POINT_COLOR: Vec3 = Vec3::new(0.95, 0.95, 0.3);

fn handle_color(axis: Axis) -> Vec3 {
    match axis {
        Axis::X => Vec3::new(0.9, 0.15, 0.15),
        Axis::Y => Vec3::new(0.15, 0.85, 0.15),
        Axis::Z => Vec3::new(0.2, 0.3, 0.95),
    }
}

struct SphereNames {
    center: String,
    r: String,
}

struct PlaneNames {
    origin: String,
    normal: String,
    extent: String,
}

/// Shades the scene layout described by a [`ShaderContext`].
pub struct SceneTracer {
    spheres: Vec<SphereNames>,
    planes: Vec<PlaneNames>,
    divide_planes: Vec<PlaneNames>,
    control_points: Vec<SphereNames>,
}

impl SceneTracer {
    #[must_use]
    pub fn new(context: &ShaderContext) -> Self {
        Self {
            spheres: (0..context.num_gen_spheres)
                .map(|i| SphereNames {
                    center: UniformTag::GenSphereCenter(i).name(),
                    r: UniformTag::GenSphereRadius(i).name(),
                })
                .collect(),
            planes: (0..context.num_gen_planes)
                .map(|i| PlaneNames {
                    origin: UniformTag::GenPlaneOrigin(i).name(),
                    normal: UniformTag::GenPlaneNormal(i).name(),
                    extent: UniformTag::GenPlaneExtent(i).name(),
                })
                .collect(),
            divide_planes: (0..context.num_divide_planes)
                .map(|i| PlaneNames {
                    origin: UniformTag::DividePlaneOrigin(i).name(),
                    normal: UniformTag::DividePlaneNormal(i).name(),
                    extent: UniformTag::DividePlaneExtent(i).name(),
                })
                .collect(),
            control_points: (0..context.num_control_points)
                .map(|i| SphereNames {
                    center: UniformTag::ControlPointCenter(i).name(),
                    r: UniformTag::ControlPointRadius(i).name(),
                })
                .collect(),
        }
    }
}

fn vec3(uniforms: &UniformValues, name: &str) -> Result<Vec3, RenderError> {
    let [x, y, z] = uniforms.vec3(name)?;
    Ok(Vec3::new(f64::from(x), f64::from(y), f64::from(z)))
}

fn float(uniforms: &UniformValues, name: &str) -> Result<f64, RenderError> {
    uniforms.float(name).map(f64::from)
}

fn mat4(uniforms: &UniformValues, name: &str) -> Result<DMat4, RenderError> {
    let cols = uniforms.mat4(name)?;
    Ok(DMat4::from_cols_array_2d(&cols.map(|col| col.map(f64::from))))
}

/// World ray through `frag_coord`, measured from the bottom-left corner.
///
/// # Errors
///
/// Fails when a camera uniform is missing.
pub fn camera_ray(uniforms: &UniformValues, frag_coord: [f32; 2]) -> Result<Ray, RenderError> {
    let [w, h] = uniforms.vec2("u_resolution")?.map(f64::from);
    let screen = Vec3::new(
        (f64::from(frag_coord[0]) - 0.5 * w) * 2.0 / h,
        (f64::from(frag_coord[1]) - 0.5 * h) * 2.0 / h,
        0.0,
    );
    let project_inverse = mat4(uniforms, "u_projectInverse")?;
    let camera_to_world = mat4(uniforms, "u_cameraToWorld")?;
    let p_camera = project_inverse.project_point3(screen);
    let dir = camera_to_world.transform_vector3(p_camera.normalize()).normalize();
    Ok(Ray::new(vec3(uniforms, "u_cameraPos")?, dir))
}

fn background(dir: Vec3) -> Vec3 {
    let t = 0.5 * (dir.y + 1.0);
    Vec3::new(0.12, 0.12, 0.15).lerp(Vec3::new(0.35, 0.4, 0.5), t)
}

impl SampleShader for SceneTracer {
    fn sample(&self, uniforms: &UniformValues, frag_coord: [f32; 2]) -> Result<[f32; 4], RenderError> {
        let ray = camera_ray(uniforms, frag_coord)?;
        let mut info = IsectInfo::new();
        let mut normal = Vec3::ZERO;
        let mut color = background(ray.dir);
        let mut lit = false;

        for (i, names) in self.spheres.iter().enumerate() {
            let center = vec3(uniforms, &names.center)?;
            let id = ShapeId::new(ShapeKind::GenSphere, i);
            if isect::intersect_sphere(&ray, &mut info, id, center, float(uniforms, &names.r)?) {
                normal = (ray.point(info.tmin) - center).normalize();
                color = SPHERE_COLOR;
                lit = true;
            }
        }
        for (kind, planes, plane_color) in [
            (ShapeKind::GenPlane, &self.planes, PLANE_COLOR),
            (ShapeKind::DividePlane, &self.divide_planes, DIVIDE_COLOR),
        ] {
            for (i, names) in planes.iter().enumerate() {
                let n = vec3(uniforms, &names.normal)?;
                let origin = vec3(uniforms, &names.origin)?;
                let extent = float(uniforms, &names.extent)?;
                if isect::intersect_plane(&ray, &mut info, ShapeId::new(kind, i), origin, n, extent) {
                    normal = n;
                    color = plane_color;
                    lit = true;
                }
            }
        }
        for (i, names) in self.control_points.iter().enumerate() {
            let center = vec3(uniforms, &names.center)?;
            let id = ShapeId::new(ShapeKind::ControlPoint, i);
            if isect::intersect_sphere(&ray, &mut info, id, center, float(uniforms, &names.r)?) {
                normal = (ray.point(info.tmin) - center).normalize();
                color = CONTROL_POINT_COLOR;
                lit = true;
            }
        }

        if uniforms.boolean("u_selection.hasSelection")? {
            let origin = vec3(uniforms, "u_selection.origin")?;
            let r = float(uniforms, "u_selection.axisRadius")?;
            let len = float(uniforms, "u_selection.axisLength")?;
            // Handles draw over everything, flat.
            let mut handles = IsectInfo::new();
            let id = ShapeId::new(ShapeKind::GenSphere, usize::MAX);
            if isect::intersect_axis_handles(&ray, &mut handles, id, origin, r, len) {
                if let Component::Handle(axis) = handles.component {
                    color = handle_color(axis);
                    lit = false;
                }
            }
        }

        if lit {
            let facing = normal.dot(-ray.dir).abs();
            color *= 0.25 + 0.75 * facing;
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok([color.x as f32, color.y as f32, color.z as f32, 1.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render::{Channel, Extent, FrameSnapshot, RenderPass, UniformTable};
    use scene::{Camera, ManipulationConfig, Scene, Sphere};

    fn pass() -> RenderPass {
        RenderPass {
            channel: Channel::Full,
            extent: Extent::new(80, 60),
            source: 0,
            target: 1,
            texture_weight: 0.0,
            num_samples: 0,
        }
    }

    #[test]
    fn centre_ray_looks_at_the_target() {
        let scene = Scene::default();
        let camera = Camera::new(Vec3::new(8.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y, 60.0);
        let pass = pass();
        let frame = FrameSnapshot {
            scene: &scene,
            camera: &camera,
            pass: &pass,
            max_iterations: 50,
            fudge_factor: 0.2,
        };
        let uniforms = UniformTable::new(&scene.shader_context()).evaluate(&frame);
        let ray = camera_ray(&uniforms, [40.0, 30.0]).unwrap();
        assert!((ray.dir - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-6);
        assert!((ray.origin - Vec3::new(8.0, 0.0, 0.0)).length() < 1e-6);

        // Top edge sits half the field of view above the axis.
        let top = camera_ray(&uniforms, [40.0, 60.0]).unwrap();
        assert!((top.dir.y.atan2(-top.dir.x).to_degrees() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn sphere_is_shaded_and_selection_draws_handles() {
        let mut scene = Scene::new(ManipulationConfig::default());
        let id = scene.add_gen_sphere(Sphere::new(Vec3::ZERO, 1.0));
        let camera = Camera::new(Vec3::new(0.0, 0.0, 8.0), Vec3::ZERO, Vec3::Y, 60.0);
        let tracer = SceneTracer::new(&scene.shader_context());
        let table = UniformTable::new(&scene.shader_context());
        let pass = pass();

        let uniforms = table.evaluate(&FrameSnapshot {
            scene: &scene,
            camera: &camera,
            pass: &pass,
            max_iterations: 50,
            fudge_factor: 0.2,
        });
        let centre = tracer.sample(&uniforms, [40.0, 30.0]).unwrap();
        assert!((f64::from(centre[0]) - SPHERE_COLOR.x).abs() < 1e-6);
        let corner = tracer.sample(&uniforms, [0.5, 0.5]).unwrap();
        assert!(corner[0] < 0.3);

        scene.set_selection(Some(id));
        let uniforms = table.evaluate(&FrameSnapshot {
            scene: &scene,
            camera: &camera,
            pass: &pass,
            max_iterations: 50,
            fudge_factor: 0.2,
        });
        // Just right of centre the X handle covers the sphere.
        let handle = tracer.sample(&uniforms, [40.5, 30.0]).unwrap();
        assert!((f64::from(handle[0]) - 0.9).abs() < 1e-6);
    }
}
