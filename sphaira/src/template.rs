//! WGSL source for the GPU sample function.

use scene::{ShaderContext, ShaderTemplate};

const SCENE_SHADER: &str = include_str!("../shaders/scene.wgsl");

/// Emits `sample_scene` for a scene layout. Appended to
/// [`render::shaders::ACCUMULATE_PRELUDE`] it forms a complete module.
#[derive(Debug, Clone, Copy, Default)]
pub struct WgslSceneTemplate;

impl ShaderTemplate for WgslSceneTemplate {
    fn render(&self, context: &ShaderContext) -> String {
        format!(
            "const NUM_GEN_SPHERES: u32 = {}u;\n\
             const NUM_GEN_PLANES: u32 = {}u;\n\
             const NUM_DIVIDE_PLANES: u32 = {}u;\n\
             const NUM_CONTROL_POINTS: u32 = {}u;\n\n{SCENE_SHADER}",
            context.num_gen_spheres, context.num_gen_planes, context.num_divide_planes, context.num_control_points,
        )
    }
}
