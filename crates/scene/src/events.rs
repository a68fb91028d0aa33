//! Change notifications produced by the scene

use crate::shape::ShapeId;

/// Something the render side has to react to.
///
/// The scene only queues events; whoever drives the frame loop drains them
/// with [`crate::Scene::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// A primitive moved or was resized by a drag step.
    ParameterChanged { id: ShapeId },
    SelectionChanged {
        previous: Option<ShapeId>,
        current: Option<ShapeId>,
    },
}

impl SceneEvent {
    /// Whether the event invalidates accumulated samples.
    #[must_use]
    pub const fn is_parameter_change(&self) -> bool {
        matches!(self, Self::ParameterChanged { .. })
    }
}
