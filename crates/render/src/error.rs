use thiserror::Error;

use crate::accumulation::{Channel, Extent};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render target {width}x{height} has no pixels")]
    EmptyTarget { width: u32, height: u32 },
    #[error("{channel:?} texture slot {slot} does not exist")]
    BadSlot { channel: Channel, slot: usize },
    #[error("{channel:?} pass is {found:?} but the textures are {expected:?}")]
    ExtentMismatch {
        channel: Channel,
        expected: Extent,
        found: Extent,
    },
    #[error("uniform {0} was not bound")]
    MissingUniform(String),
    #[error("uniform {name} has type {found}, expected {expected}")]
    UniformType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("sample shader failed: {0}")]
    Shader(String),
    #[error("backend not available: {0}")]
    BackendUnavailable(String),
    #[error("pixel read-back failed: {0}")]
    ReadBack(String),
}
