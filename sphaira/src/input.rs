//! Device-independent input events.
//!
//! Window backends translate their native events into [`InputEvent`]s in
//! canvas pixel coordinates before handing them to the [`crate::Viewer`].

use scene::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Orbits the camera.
    Left,
    /// Selects and drags scene objects.
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { button: MouseButton, position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { button: MouseButton },
    /// Vertical scroll amount; positive scrolls towards the user and zooms
    /// out.
    Wheel { delta_y: f64 },
    KeyDown(char),
    KeyUp(char),
}

/// Placement of the canvas inside its window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// Window-relative position of the canvas' top-left corner, in logical
    /// pixels.
    pub origin: Vec2,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f64,
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            pixel_ratio: 1.0,
        }
    }
}

impl CanvasGeometry {
    /// Canvas pixel under a window-relative pointer position.
    #[must_use]
    pub fn to_canvas(&self, client: Vec2) -> Vec2 {
        (client - self.origin) * self.pixel_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_coordinates_follow_offset_and_ratio() {
        let geometry = CanvasGeometry {
            origin: Vec2::new(10.0, 20.0),
            pixel_ratio: 2.0,
        };
        assert_eq!(geometry.to_canvas(Vec2::new(10.0, 20.0)), Vec2::ZERO);
        assert_eq!(geometry.to_canvas(Vec2::new(15.0, 30.0)), Vec2::new(10.0, 20.0));
        assert_eq!(CanvasGeometry::default().to_canvas(Vec2::new(3.0, 4.0)), Vec2::new(3.0, 4.0));
    }
}
