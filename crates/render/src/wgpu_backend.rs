//! GPU implementation of [`RenderBackend`] built on [`wgpu`].
//!
//! Each channel owns two `Rgba32Float` textures. A pass binds the source
//! texture, draws a fullscreen quad into the target and leaves the blend to
//! the fragment stage. Read-back copies through a staging buffer whose rows
//! are padded to wgpu's copy alignment. Textures are stored top row first.

use std::sync::Arc;

use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::accumulation::{Channel, Extent};
use crate::backend::{PixelBuffer, RenderBackend, RowOrder};
use crate::error::RenderError;
use crate::gpu_types::{pack, ControlPointGpu, FrameUniformGpu, PlaneGpu, SphereGpu};
use crate::pipeline;
use crate::uniforms::FrameSnapshot;

const BYTES_PER_PIXEL: u32 = 16;

struct TexturePair {
    extent: Extent,
    textures: [wgpu::Texture; 2],
    views: [wgpu::TextureView; 2],
}

impl TexturePair {
    fn new(device: &wgpu::Device, label: &str, extent: Extent) -> Self {
        let textures = [0, 1].map(|slot| {
            pipeline::create_accumulation_texture(device, &format!("{label} {slot}"), extent.width, extent.height)
        });
        let views = [
            textures[0].create_view(&wgpu::TextureViewDescriptor::default()),
            textures[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];
        Self {
            extent,
            textures,
            views,
        }
    }
}

/// Present pipeline built for one target format.
struct PresentPipeline {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
}

/// GPU-backed implementation of [`RenderBackend`].
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    accumulate: wgpu::RenderPipeline,
    accumulate_layout: wgpu::BindGroupLayout,
    present: Option<PresentPipeline>,
    sampler: wgpu::Sampler,
    quad: wgpu::Buffer,
    frame_buffer: wgpu::Buffer,
    full: TexturePair,
    preview: TexturePair,
}

impl WgpuBackend {
    /// Creates a headless backend on the system's default high-performance GPU.
    ///
    /// # Errors
    ///
    /// Fails when no adapter or device is available or `sample_source` does
    /// not compile.
    pub fn new(sample_source: &str, full: Extent, preview: Extent) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .ok_or_else(|| RenderError::BackendUnavailable("no compatible adapter".to_owned()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Accumulation Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .map_err(|e| RenderError::BackendUnavailable(e.to_string()))?;

        info!(adapter = ?adapter.get_info().name, "wgpu backend ready");
        Self::from_device(Arc::new(device), Arc::new(queue), sample_source, full, preview)
    }

    /// Builds the backend on a device the caller already owns, such as the
    /// one driving a window surface.
    ///
    /// # Errors
    ///
    /// Fails when either extent is empty or `sample_source` does not compile.
    pub fn from_device(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        sample_source: &str,
        full: Extent,
        preview: Extent,
    ) -> Result<Self, RenderError> {
        for extent in [full, preview] {
            if extent.is_empty() {
                return Err(RenderError::EmptyTarget {
                    width: extent.width,
                    height: extent.height,
                });
            }
        }
        let accumulate_layout = pipeline::create_accumulate_layout(&device);
        let accumulate = pipeline::create_accumulate_pipeline(&device, &accumulate_layout, sample_source)?;
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Present Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::bytes_of(&<FrameUniformGpu as bytemuck::Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Ok(Self {
            quad: pipeline::create_fullscreen_quad(&device),
            full: TexturePair::new(&device, "Full Accumulation", full),
            preview: TexturePair::new(&device, "Preview Accumulation", preview),
            present: None,
            device,
            queue,
            accumulate,
            accumulate_layout,
            sampler,
            frame_buffer,
        })
    }

    const fn pair(&self, channel: Channel) -> &TexturePair {
        match channel {
            Channel::Full => &self.full,
            Channel::Preview => &self.preview,
        }
    }

    /// Format the present pipeline was last built for.
    #[must_use]
    pub fn present_format(&self) -> Option<wgpu::TextureFormat> {
        self.present.as_ref().map(|p| p.format)
    }

    /// Draw one accumulation texture over `target`, stretching it to fit.
    ///
    /// The present pipeline is rebuilt whenever `format` differs from the one
    /// it was built for.
    pub fn present(&mut self, target: &wgpu::TextureView, format: wgpu::TextureFormat, channel: Channel, slot: usize) {
        if self.present_format() != Some(format) {
            let layout = pipeline::create_present_layout(&self.device);
            let pipeline = pipeline::create_present_pipeline(&self.device, &layout, format);
            debug!(?format, "present pipeline built");
            self.present = Some(PresentPipeline {
                format,
                pipeline,
                layout,
            });
        }
        let Some(PresentPipeline { pipeline: present, layout, .. }) = &self.present else {
            return;
        };
        let source = match channel {
            Channel::Full => &self.full.views[slot & 1],
            Channel::Preview => &self.preview.views[slot & 1],
        };
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Present Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Present Encoder") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(present);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad.slice(..));
            rpass.draw(0..4, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
    }
}

impl RenderBackend for WgpuBackend {
    fn resize(&mut self, full: Extent, preview: Extent) -> Result<(), RenderError> {
        for extent in [full, preview] {
            if extent.is_empty() {
                return Err(RenderError::EmptyTarget {
                    width: extent.width,
                    height: extent.height,
                });
            }
        }
        self.full = TexturePair::new(&self.device, "Full Accumulation", full);
        self.preview = TexturePair::new(&self.device, "Preview Accumulation", preview);
        debug!(?full, ?preview, "gpu textures reallocated");
        Ok(())
    }

    fn render(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), RenderError> {
        let pass = *frame.pass;
        let pair = self.pair(pass.channel);
        if pair.extent != pass.extent {
            return Err(RenderError::ExtentMismatch {
                channel: pass.channel,
                expected: pair.extent,
                found: pass.extent,
            });
        }
        if pass.source > 1 || pass.target > 1 || pass.source == pass.target {
            return Err(RenderError::BadSlot {
                channel: pass.channel,
                slot: pass.target,
            });
        }

        let uniform = FrameUniformGpu::from(frame);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));

        let scene = frame.scene;
        let spheres: Vec<SphereGpu> = pack(scene.gen_spheres());
        let planes: Vec<PlaneGpu> = pack(scene.gen_planes());
        let divides: Vec<PlaneGpu> = pack(scene.divide_planes());
        let points: Vec<ControlPointGpu> = pack(scene.control_points());
        let buffers = [
            pipeline::create_storage_buffer(&self.device, "Generator Spheres", bytemuck::cast_slice(&spheres)),
            pipeline::create_storage_buffer(&self.device, "Generator Planes", bytemuck::cast_slice(&planes)),
            pipeline::create_storage_buffer(&self.device, "Divide Planes", bytemuck::cast_slice(&divides)),
            pipeline::create_storage_buffer(&self.device, "Control Points", bytemuck::cast_slice(&points)),
        ];

        let pair = self.pair(pass.channel);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Accumulate Bind Group"),
            layout: &self.accumulate_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers[0].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers[1].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffers[2].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: buffers[3].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&pair.views[pass.source]),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Accumulate Encoder") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Accumulate Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &pair.views[pass.target],
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.accumulate);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad.slice(..));
            rpass.draw(0..4, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn read_pixels(&self, channel: Channel, slot: usize) -> Result<PixelBuffer, RenderError> {
        let pair = self.pair(channel);
        let texture = pair.textures.get(slot).ok_or(RenderError::BadSlot { channel, slot })?;
        let Extent { width, height } = pair.extent;

        let unpadded = width * BYTES_PER_PIXEL;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Read-back Buffer"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Read-back Encoder") });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| RenderError::ReadBack(e.to_string()))?
            .map_err(|e| RenderError::ReadBack(e.to_string()))?;

        let mut out = PixelBuffer::new(pair.extent, RowOrder::TopDown);
        {
            let mapped = slice.get_mapped_range();
            let row_bytes = unpadded as usize;
            for (row, chunk) in mapped.chunks(padded as usize).enumerate() {
                let floats: &[f32] = bytemuck::try_cast_slice(&chunk[..row_bytes])
                    .map_err(|e| RenderError::ReadBack(e.to_string()))?;
                let start = row * width as usize * 4;
                out.data[start..start + floats.len()].copy_from_slice(floats);
            }
        }
        staging.unmap();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT_SAMPLE: &str = "fn sample_scene(frag_coord: vec2<f32>) -> vec4<f32> {\n    return vec4<f32>(0.5, 0.5, 0.5, 1.0);\n}\n";

    fn target(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Present Target"),
                size: wgpu::Extent3d {
                    width: 8,
                    height: 6,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    #[test]
    fn present_pipeline_follows_the_target_format() {
        let mut backend = match WgpuBackend::new(FLAT_SAMPLE, Extent::new(8, 6), Extent::new(4, 3)) {
            Ok(backend) => backend,
            Err(RenderError::BackendUnavailable(reason)) => {
                eprintln!("no GPU available: {reason}");
                return;
            }
            Err(e) => panic!("backend setup failed: {e}"),
        };
        assert_eq!(backend.present_format(), None);

        let rgba = target(&backend.device, wgpu::TextureFormat::Rgba8Unorm);
        backend.present(&rgba, wgpu::TextureFormat::Rgba8Unorm, Channel::Full, 0);
        assert_eq!(backend.present_format(), Some(wgpu::TextureFormat::Rgba8Unorm));

        let bgra = target(&backend.device, wgpu::TextureFormat::Bgra8Unorm);
        backend.present(&bgra, wgpu::TextureFormat::Bgra8Unorm, Channel::Preview, 1);
        assert_eq!(backend.present_format(), Some(wgpu::TextureFormat::Bgra8Unorm));
    }
}
