//! WGSL sources for the accumulation and present passes.

/// Bindings, fullscreen vertex stage and the blending fragment stage. A
/// complete module appends `fn sample_scene(frag_coord: vec2<f32>) -> vec4<f32>`.
pub const ACCUMULATE_PRELUDE: &str = include_str!("../shaders/accumulate.wgsl");

pub const PRESENT_SHADER: &str = include_str!("../shaders/present.wgsl");

/// Full accumulation module for a given sample function.
#[must_use]
pub fn accumulate_module(sample_source: &str) -> String {
    format!("{ACCUMULATE_PRELUDE}\n{sample_source}")
}
