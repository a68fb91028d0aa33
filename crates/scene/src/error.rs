use thiserror::Error;

use crate::shape::ShapeKind;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("no {kind:?} at index {index}")]
    UnknownShape { kind: ShapeKind, index: usize },
    #[error("no object selected")]
    NoSelection,
    #[error("control point name {0:?} is already taken")]
    DuplicateControlPoint(String),
    #[error("degenerate {0}")]
    Degenerate(&'static str),
    #[error("invalid scene description: {0}")]
    Parse(#[from] serde_json::Error),
}
