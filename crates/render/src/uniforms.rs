//! Named shader inputs
//!
//! The accumulation shader reads a fixed set of named uniforms. Which names
//! exist depends only on the scene's primitive counts, so the table mapping
//! each name to its accessor is built once from a [`ShaderContext`] when a
//! pipeline is set up. Every frame the table is evaluated against a
//! [`FrameSnapshot`]; accessors are pure reads of that snapshot.

use std::collections::HashMap;

use scene::math::to_gpu_matrix;
use scene::{Camera, Scene, ShaderContext, Vec3};
use tracing::warn;

use crate::accumulation::RenderPass;
use crate::error::RenderError;

/// Everything a frame's uniforms are computed from.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub pass: &'a RenderPass,
    pub max_iterations: u32,
    pub fudge_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Vec2(_) => "vec2",
            Self::Vec3(_) => "vec3",
            Self::Mat4(_) => "mat4",
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn vec3(v: Vec3) -> UniformValue {
    UniformValue::Vec3([v.x as f32, v.y as f32, v.z as f32])
}

#[allow(clippy::cast_possible_truncation)]
fn float(v: f64) -> UniformValue {
    UniformValue::Float(v as f32)
}

/// Identifies one uniform and how to read it from a [`FrameSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformTag {
    ProjectInverse,
    CameraToWorld,
    CameraPosition,
    TextureWeight,
    NumSamples,
    Resolution,
    MaxIterations,
    FudgeFactor,
    GenSphereCenter(usize),
    GenSphereRadius(usize),
    GenSphereRadiusSquared(usize),
    GenPlaneOrigin(usize),
    GenPlaneNormal(usize),
    GenPlaneExtent(usize),
    DividePlaneOrigin(usize),
    DividePlaneNormal(usize),
    DividePlaneExtent(usize),
    ControlPointCenter(usize),
    ControlPointRadius(usize),
    HasSelection,
    SelectionOrigin,
    SelectionHandleRadius,
    SelectionHandleLength,
}

impl UniformTag {
    /// Name the shader declares this uniform under.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::ProjectInverse => "u_projectInverse".to_owned(),
            Self::CameraToWorld => "u_cameraToWorld".to_owned(),
            Self::CameraPosition => "u_cameraPos".to_owned(),
            Self::TextureWeight => "u_textureWeight".to_owned(),
            Self::NumSamples => "u_numSamples".to_owned(),
            Self::Resolution => "u_resolution".to_owned(),
            Self::MaxIterations => "u_maxIISIterations".to_owned(),
            Self::FudgeFactor => "u_fudgeFactor".to_owned(),
            Self::GenSphereCenter(i) => format!("u_genSpheres[{i}].center"),
            Self::GenSphereRadius(i) => format!("u_genSpheres[{i}].r"),
            Self::GenSphereRadiusSquared(i) => format!("u_genSpheres[{i}].r2"),
            Self::GenPlaneOrigin(i) => format!("u_genPlanes[{i}].origin"),
            Self::GenPlaneNormal(i) => format!("u_genPlanes[{i}].normal"),
            Self::GenPlaneExtent(i) => format!("u_genPlanes[{i}].extent"),
            Self::DividePlaneOrigin(i) => format!("u_dividePlanes[{i}].origin"),
            Self::DividePlaneNormal(i) => format!("u_dividePlanes[{i}].normal"),
            Self::DividePlaneExtent(i) => format!("u_dividePlanes[{i}].extent"),
            Self::ControlPointCenter(i) => format!("u_controlPoints[{i}].center"),
            Self::ControlPointRadius(i) => format!("u_controlPoints[{i}].r"),
            Self::HasSelection => "u_selection.hasSelection".to_owned(),
            Self::SelectionOrigin => "u_selection.origin".to_owned(),
            Self::SelectionHandleRadius => "u_selection.axisRadius".to_owned(),
            Self::SelectionHandleLength => "u_selection.axisLength".to_owned(),
        }
    }

    /// Read the value from a snapshot. `None` when the indexed primitive no
    /// longer exists.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    pub fn extract(&self, frame: &FrameSnapshot<'_>) -> Option<UniformValue> {
        let scene = frame.scene;
        let camera = frame.camera;
        let value = match *self {
            Self::ProjectInverse => UniformValue::Mat4(to_gpu_matrix(camera.projection().inverse_matrix())),
            Self::CameraToWorld => UniformValue::Mat4(to_gpu_matrix(camera.view().inverse_matrix())),
            Self::CameraPosition => vec3(camera.position()),
            Self::TextureWeight => UniformValue::Float(frame.pass.texture_weight),
            Self::NumSamples => UniformValue::Float(frame.pass.num_samples as f32),
            Self::Resolution => UniformValue::Vec2([
                frame.pass.extent.width as f32,
                frame.pass.extent.height as f32,
            ]),
            Self::MaxIterations => UniformValue::Int(frame.max_iterations as i32),
            Self::FudgeFactor => UniformValue::Float(frame.fudge_factor),
            Self::GenSphereCenter(i) => vec3(scene.gen_spheres().get(i)?.center),
            Self::GenSphereRadius(i) => float(scene.gen_spheres().get(i)?.radius),
            Self::GenSphereRadiusSquared(i) => {
                let r = scene.gen_spheres().get(i)?.radius;
                float(r * r)
            }
            Self::GenPlaneOrigin(i) => vec3(scene.gen_planes().get(i)?.p1),
            Self::GenPlaneNormal(i) => vec3(scene.gen_planes().get(i)?.normal),
            Self::GenPlaneExtent(i) => float(scene.gen_planes().get(i)?.extent),
            Self::DividePlaneOrigin(i) => vec3(scene.divide_planes().get(i)?.p1),
            Self::DividePlaneNormal(i) => vec3(scene.divide_planes().get(i)?.normal),
            Self::DividePlaneExtent(i) => float(scene.divide_planes().get(i)?.extent),
            Self::ControlPointCenter(i) => vec3(scene.control_points().get(i)?.center),
            Self::ControlPointRadius(i) => float(scene.control_points().get(i)?.radius),
            Self::HasSelection => UniformValue::Bool(scene.selection().is_some()),
            Self::SelectionOrigin => {
                let origin = scene
                    .selection()
                    .and_then(|id| scene.shape(id).ok())
                    .map_or(Vec3::ZERO, |shape| shape.origin());
                vec3(origin)
            }
            Self::SelectionHandleRadius => float(scene.config().axis_cylinder_radius),
            Self::SelectionHandleLength => float(scene.config().axis_cylinder_len),
        };
        Some(value)
    }
}

/// Tag list for a scene with the given primitive counts.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformTable {
    bindings: Vec<(String, UniformTag)>,
}

impl UniformTable {
    #[must_use]
    pub fn new(context: &ShaderContext) -> Self {
        let mut tags = vec![
            UniformTag::ProjectInverse,
            UniformTag::CameraToWorld,
            UniformTag::CameraPosition,
            UniformTag::TextureWeight,
            UniformTag::NumSamples,
            UniformTag::Resolution,
            UniformTag::MaxIterations,
            UniformTag::FudgeFactor,
        ];
        for i in 0..context.num_gen_spheres {
            tags.extend([
                UniformTag::GenSphereCenter(i),
                UniformTag::GenSphereRadius(i),
                UniformTag::GenSphereRadiusSquared(i),
            ]);
        }
        for i in 0..context.num_gen_planes {
            tags.extend([
                UniformTag::GenPlaneOrigin(i),
                UniformTag::GenPlaneNormal(i),
                UniformTag::GenPlaneExtent(i),
            ]);
        }
        for i in 0..context.num_divide_planes {
            tags.extend([
                UniformTag::DividePlaneOrigin(i),
                UniformTag::DividePlaneNormal(i),
                UniformTag::DividePlaneExtent(i),
            ]);
        }
        for i in 0..context.num_control_points {
            tags.extend([UniformTag::ControlPointCenter(i), UniformTag::ControlPointRadius(i)]);
        }
        tags.extend([
            UniformTag::HasSelection,
            UniformTag::SelectionOrigin,
            UniformTag::SelectionHandleRadius,
            UniformTag::SelectionHandleLength,
        ]);
        Self {
            bindings: tags.into_iter().map(|tag| (tag.name(), tag)).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformTag)> + '_ {
        self.bindings.iter().map(|(name, tag)| (name.as_str(), *tag))
    }

    /// Evaluate every binding against `frame`.
    #[must_use]
    pub fn evaluate(&self, frame: &FrameSnapshot<'_>) -> UniformValues {
        let mut values = HashMap::with_capacity(self.bindings.len());
        for (name, tag) in &self.bindings {
            match tag.extract(frame) {
                Some(value) => {
                    values.insert(name.clone(), value);
                }
                None => warn!(%name, "uniform source missing, skipped"),
            }
        }
        UniformValues { values }
    }
}

/// One frame's evaluated uniforms, looked up by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformValues {
    values: HashMap<String, UniformValue>,
}

macro_rules! typed_getter {
    ($fn_name:ident, $variant:ident, $ty:ty, $label:literal) => {
        /// # Errors
        ///
        /// Fails when the uniform is missing or has another type.
        pub fn $fn_name(&self, name: &str) -> Result<$ty, RenderError> {
            match self.get(name)? {
                UniformValue::$variant(v) => Ok(v),
                other => Err(RenderError::UniformType {
                    name: name.to_owned(),
                    expected: $label,
                    found: other.type_name(),
                }),
            }
        }
    };
}

impl UniformValues {
    /// # Errors
    ///
    /// Returns [`RenderError::MissingUniform`] for unknown names.
    pub fn get(&self, name: &str) -> Result<UniformValue, RenderError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::MissingUniform(name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    typed_getter!(float, Float, f32, "float");
    typed_getter!(int, Int, i32, "int");
    typed_getter!(boolean, Bool, bool, "bool");
    typed_getter!(vec2, Vec2, [f32; 2], "vec2");
    typed_getter!(vec3, Vec3, [f32; 3], "vec3");
    typed_getter!(mat4, Mat4, [[f32; 4]; 4], "mat4");
}
