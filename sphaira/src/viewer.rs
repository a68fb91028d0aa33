//! Input routing and per-frame orchestration.
//!
//! The [`Viewer`] owns the scene, the camera and the render scheduler. Input
//! events are dispatched by button: the left button orbits the camera, the
//! right button picks and drags scene objects, the wheel zooms. Each call
//! returns the render passes that must run right away; [`Viewer::frame`]
//! returns the passes of the regular per-frame tick.

use std::time::Instant;

use render::{Extent, FrameSnapshot, RenderBackend, RenderError, RenderPass, RenderScheduler, SchedulerConfig, TickInput};
use scene::{raster_to_screen, Camera, Scene, SceneEvent, Transform, Vec2};
use tracing::{debug, trace, warn};

use crate::input::{InputEvent, MouseButton};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct PointerState {
    pressed: Option<MouseButton>,
    position: Vec2,
}

pub struct Viewer {
    scene: Scene,
    camera: Camera,
    scheduler: RenderScheduler,
    raster_to_screen: Transform,
    pointer: PointerState,
}

impl Viewer {
    /// # Errors
    ///
    /// Fails when `canvas` has no pixels.
    pub fn new(scene: Scene, camera: Camera, config: SchedulerConfig, canvas: Extent) -> Result<Self, RenderError> {
        let scheduler = RenderScheduler::new(config, canvas)?;
        Ok(Self {
            scene,
            camera,
            scheduler,
            raster_to_screen: raster_to_screen(f64::from(canvas.width), f64::from(canvas.height)),
            pointer: PointerState::default(),
        })
    }

    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    pub const fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut RenderScheduler {
        &mut self.scheduler
    }

    pub const fn raster_to_screen(&self) -> &Transform {
        &self.raster_to_screen
    }

    /// Follow a canvas resize. The caller resizes the backend to match
    /// `self.scheduler()`'s extents.
    ///
    /// # Errors
    ///
    /// Fails when `canvas` has no pixels; nothing changes in that case.
    pub fn resize(&mut self, canvas: Extent) -> Result<(), RenderError> {
        self.scheduler.resize(canvas)?;
        self.raster_to_screen = raster_to_screen(f64::from(canvas.width), f64::from(canvas.height));
        Ok(())
    }

    /// Apply one input event. Returns passes to render immediately.
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Vec<RenderPass> {
        let mut passes = Vec::new();
        match event {
            InputEvent::PointerDown { button, position } => {
                self.pointer = PointerState {
                    pressed: Some(button),
                    position,
                };
                match button {
                    MouseButton::Left => self.camera.begin_orbit(position),
                    MouseButton::Right => {
                        self.scene.mouse_right_down(&self.camera, position, &self.raster_to_screen);
                    }
                    MouseButton::Middle => {}
                }
            }
            InputEvent::PointerMove { position } => {
                self.pointer.position = position;
                match self.pointer.pressed {
                    Some(MouseButton::Left) => {
                        self.camera.orbit_to(position);
                        self.scheduler.begin_camera_move();
                        passes.extend(self.scheduler.call_render(now));
                    }
                    Some(MouseButton::Right) => {
                        if let Err(err) = self.scene.mouse_right_move(&self.camera, position, &self.raster_to_screen) {
                            warn!(%err, "drag step rejected");
                        }
                    }
                    Some(MouseButton::Middle) | None => {}
                }
            }
            InputEvent::PointerUp { button } => {
                if button == MouseButton::Left {
                    self.camera.end_orbit();
                }
                self.pointer.pressed = None;
                self.scene.mouse_up();
                self.scheduler.end_camera_move();
            }
            InputEvent::Wheel { delta_y } => {
                self.camera.zoom(delta_y);
                passes.extend(self.scheduler.wheel(now));
            }
            InputEvent::KeyDown(key) => self.scene.key_down(key),
            InputEvent::KeyUp(key) => {
                self.scene.key_up(key);
                self.scheduler.end_camera_move();
            }
        }
        trace!(?event, passes = passes.len(), "input handled");
        passes
    }

    /// Drain scene notifications and plan this frame's passes.
    pub fn frame(&mut self, now: Instant) -> Vec<RenderPass> {
        for event in self.scene.drain_events() {
            if let SceneEvent::SelectionChanged { previous, current } = event {
                // Handles are part of the image.
                debug!(?previous, ?current, "selection changed, restarting accumulation");
                self.scheduler.reset();
            }
        }
        let input = TickInput {
            parameter_changing: self.scene.is_parameter_changing(),
        };
        self.scheduler.tick(input, now)
    }

    pub fn snapshot<'a>(&'a self, pass: &'a RenderPass) -> FrameSnapshot<'a> {
        let config = self.scheduler.config();
        FrameSnapshot {
            scene: &self.scene,
            camera: &self.camera,
            pass,
            max_iterations: config.max_iterations,
            fudge_factor: config.fudge_factor,
        }
    }

    /// Execute `passes` in order on `backend`.
    ///
    /// # Errors
    ///
    /// Stops at the first pass the backend rejects.
    pub fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B, passes: &[RenderPass]) -> Result<(), RenderError> {
        for pass in passes {
            backend.render(&self.snapshot(pass))?;
        }
        Ok(())
    }
}
