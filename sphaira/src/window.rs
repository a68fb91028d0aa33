//! Interactive window: winit input, `wgpu` accumulation and presentation.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use render::{Channel, Extent, RenderBackend, RenderPass, WgpuBackend};
use scene::{ShaderTemplate, Vec2};
use tracing::{debug, error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::Key;
use winit::window::{Window, WindowBuilder};

use crate::input::{CanvasGeometry, InputEvent, MouseButton};
use crate::template::WgslSceneTemplate;
use crate::viewer::Viewer;

struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    config: wgpu::SurfaceConfiguration,
    backend: WgpuBackend,
    viewer: Viewer,
    geometry: CanvasGeometry,
    cursor: Vec2,
    pending: Vec<RenderPass>,
    /// Texture shown last, re-presented while nothing new is rendered.
    shown: Option<(Channel, usize)>,
}

fn extent(size: PhysicalSize<u32>) -> Extent {
    Extent::new(size.width, size.height)
}

fn mouse_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

impl State {
    async fn new(window: Arc<Window>, mut viewer: Viewer) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to get adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to request device")?;
        let device = Arc::new(device);

        let size = window.inner_size();
        viewer.resize(extent(size))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = *surface_caps.formats.first().context("surface reports no formats")?;
        let alpha_mode = *surface_caps.alpha_modes.first().context("surface reports no alpha modes")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let sample_source = WgslSceneTemplate.render(&viewer.scene().shader_context());
        let backend = WgpuBackend::from_device(
            device.clone(),
            Arc::new(queue),
            &sample_source,
            viewer.scheduler().full().extent(),
            viewer.scheduler().preview().extent(),
        )?;
        info!(?format, width = size.width, height = size.height, "window surface ready");

        Ok(Self {
            geometry: CanvasGeometry {
                origin: Vec2::ZERO,
                pixel_ratio: window.scale_factor(),
            },
            window,
            surface,
            device,
            config,
            backend,
            viewer,
            cursor: Vec2::ZERO,
            pending: Vec::new(),
            shown: None,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Err(err) = self.viewer.resize(extent(size)) {
            warn!(%err, "resize ignored");
            return;
        }
        let scheduler = self.viewer.scheduler();
        if let Err(err) = self.backend.resize(scheduler.full().extent(), scheduler.preview().extent()) {
            error!(%err, "failed to resize accumulation targets");
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.shown = None;
    }

    fn input(&mut self, event: InputEvent) {
        let passes = self.viewer.handle(event, Instant::now());
        self.pending.extend(passes);
    }

    /// Translate one window event. Returns `false` for events the viewer
    /// does not consume.
    fn window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(self.geometry.pixel_ratio);
                self.cursor = self.geometry.to_canvas(Vec2::new(logical.x, logical.y));
                self.input(InputEvent::PointerMove { position: self.cursor });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = mouse_button(*button) else {
                    return false;
                };
                let event = match state {
                    ElementState::Pressed => InputEvent::PointerDown {
                        button,
                        position: self.cursor,
                    },
                    ElementState::Released => InputEvent::PointerUp { button },
                };
                self.input(event);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -f64::from(*y),
                    MouseScrollDelta::PixelDelta(pos) => -pos.y,
                };
                // Horizontal-only scrolling is not a zoom.
                if delta_y.abs() < f64::EPSILON {
                    return false;
                }
                self.input(InputEvent::Wheel { delta_y });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Character(text),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let Some(key) = text.chars().next() else {
                    return false;
                };
                let event = match state {
                    ElementState::Pressed => InputEvent::KeyDown(key),
                    ElementState::Released => InputEvent::KeyUp(key),
                };
                self.input(event);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.geometry.pixel_ratio = *scale_factor;
            }
            _ => return false,
        }
        true
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let mut passes = std::mem::take(&mut self.pending);
        passes.extend(self.viewer.frame(Instant::now()));
        match self.viewer.render(&mut self.backend, &passes) {
            Ok(()) => {
                if let Some(last) = passes.last() {
                    self.shown = Some((last.channel, last.target));
                }
            }
            Err(err) => error!(%err, "accumulation pass failed"),
        }

        let Some((channel, slot)) = self.shown else {
            return Ok(());
        };
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.backend.present(&view, self.config.format, channel, slot);
        output.present();
        Ok(())
    }
}

/// Open a window and run the viewer until it is closed.
///
/// # Errors
///
/// Fails when the window, surface or GPU pipeline cannot be created.
pub fn run(viewer: Viewer) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Sphaira")
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut state = pollster::block_on(State::new(window, viewer))?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == state.window.id() => {
            if state.window_event(event) {
                return;
            }
            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => state.resize(*physical_size),
                WindowEvent::RedrawRequested => match state.render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory");
                        elwt.exit();
                    }
                    Err(err) => debug!(?err, "frame skipped"),
                },
                _ => {}
            }
        }
        Event::AboutToWait => state.window.request_redraw(),
        _ => {}
    })?;
    Ok(())
}
