//! GPU-backed surface: an offscreen wgpu texture with a scissored fill
//! pipeline and a blocking host read-back path.

use crate::error::SnapError;
use crate::geom::IRect;
use crate::image::Image;
use crate::pixel::{AlphaMode, Color};
use crate::surface::SurfaceBackend;

const FILL_SHADER: &str = r#"
struct VsOut {
  @builtin(position) pos: vec4<f32>,
};

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> VsOut {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 3.0, -1.0),
    vec2<f32>(-1.0,  3.0),
  );
  var o: VsOut;
  o.pos = vec4<f32>(p[vi], 0.0, 1.0);
  return o;
}

@group(0) @binding(0) var<uniform> fill_color: vec4<f32>;

@fragment
fn fs(_in: VsOut) -> @location(0) vec4<f32> {
  return fill_color;
}
"#;

pub(crate) struct AcceleratedBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    params: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    readback: wgpu::Buffer,
    readback_bytes_per_row: u32,
    width: u32,
    height: u32,
    alpha: AlphaMode,
}

impl AcceleratedBackend {
    pub(crate) fn new(width: u32, height: u32, alpha: AlphaMode) -> Result<Self, SnapError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                SnapError::BackendUnavailable("no gpu adapter available".into())
            }
            other => {
                SnapError::BackendUnavailable(format!("wgpu request_adapter failed: {other:?}"))
            }
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| {
            SnapError::BackendUnavailable(format!("wgpu request_device failed: {e:?}"))
        })?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("snaptile_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("snaptile_fill_params"),
            size: 16,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("snaptile_fill_bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(16),
                    },
                    count: None,
                }],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("snaptile_fill_bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("snaptile_fill_shader"),
            source: wgpu::ShaderSource::Wgsl(FILL_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("snaptile_fill_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("snaptile_fill_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let bytes_per_row_unpadded = width
            .checked_mul(4)
            .ok_or(SnapError::DimensionsTooLarge { width, height })?;
        let readback_bytes_per_row =
            align_to(bytes_per_row_unpadded, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let buffer_size = (readback_bytes_per_row as u64)
            .checked_mul(height as u64)
            .ok_or(SnapError::DimensionsTooLarge { width, height })?;

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("snaptile_readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut backend = Self {
            device,
            queue,
            texture,
            view,
            pipeline,
            params,
            bind_group,
            readback,
            readback_bytes_per_row,
            width,
            height,
            alpha,
        };
        // match the raster backend's initial state
        backend.clear(if alpha == AlphaMode::Opaque {
            Color::BLACK
        } else {
            Color::TRANSPARENT
        });
        Ok(backend)
    }

    fn wgpu_color(&self, color: Color) -> wgpu::Color {
        let [r, g, b, mut a] = color.premultiplied();
        if self.alpha == AlphaMode::Opaque {
            a = 255;
        }
        wgpu::Color {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }
}

impl SurfaceBackend for AcceleratedBackend {
    fn clear(&mut self, color: Color) {
        let clear = self.wgpu_color(color);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("snaptile_clear_encoder"),
            });
        {
            let _rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("snaptile_clear_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(Some(encoder.finish()));
    }

    fn draw_rect(&mut self, rect: IRect, color: Color) {
        // rect arrives pre-clipped from Surface::draw_rect. The source alpha
        // is not forced here: on an opaque surface the destination alpha is
        // already 1, and source-over keeps it there.
        let [r, g, b, a] = color.premultiplied();
        let mut params = [0u8; 16];
        params[0..4].copy_from_slice(&(r as f32 / 255.0).to_le_bytes());
        params[4..8].copy_from_slice(&(g as f32 / 255.0).to_le_bytes());
        params[8..12].copy_from_slice(&(b as f32 / 255.0).to_le_bytes());
        params[12..16].copy_from_slice(&(a as f32 / 255.0).to_le_bytes());
        self.queue.write_buffer(&self.params, 0, &params);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("snaptile_fill_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("snaptile_fill_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.bind_group, &[]);
            rp.set_scissor_rect(rect.x as u32, rect.y as u32, rect.width, rect.height);
            rp.draw(0..3, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
    }

    #[tracing::instrument(skip(self), fields(width = self.width, height = self.height))]
    fn snapshot(&mut self) -> Result<Image, SnapError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("snaptile_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.readback_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| SnapError::ReadbackFailed(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| SnapError::ReadbackFailed("readback channel closed".into()))?
            .map_err(|e| SnapError::ReadbackFailed(format!("readback map failed: {e:?}")))?;

        let mapped = buffer_slice.get_mapped_range();
        let row_bytes = self.width as usize * 4;
        let padded_row_bytes = self.readback_bytes_per_row as usize;
        let mut out = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height as usize {
            let start = row * padded_row_bytes;
            out.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        self.readback.unmap();

        Image::from_pixels(out, self.width, self.height, self.alpha)
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}
