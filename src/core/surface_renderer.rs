use std::sync::{Arc, Weak};

use glam::UVec2;
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, Sampler, Surface,
    SurfaceConfiguration,
};
use winit::window::Window;

use super::compositor::{FramePlan, FrameStatus, QuadDraw, QuadLayer, Vertex};
use super::error::{PresentError, Result};
use super::gpu_context::GpuContext;
use super::viewport::{Uniforms, ViewportTransform};
use super::wgpu_device::GpuTexture;
use crate::config::PresenterConfig;
use crate::traits::PresentableSurface;

/// Display quad plus cursor quad
const MAX_QUADS: usize = 2;
const VERTICES_PER_QUAD: u32 = 6;

/// Bind group built for one texture, dropped once the texture is gone
struct CachedBinding {
    texture: Weak<GpuTexture>,
    bind_group: BindGroup,
}

/// Presents frame plans on a window surface
///
/// Draws the display quad with replace blending and the cursor quad on top
/// with alpha blending. The surface is reconfigured lazily from the plan's
/// drawable size, so resizes recorded on any thread land before the next draw.
pub struct SurfaceRenderer {
    gpu: GpuContext,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    configured: bool,
    display_pipeline: RenderPipeline,
    cursor_pipeline: RenderPipeline,
    texture_layout: BindGroupLayout,
    sampler: Sampler,
    uniform_buffer: Buffer,
    uniform_bind_group: BindGroup,
    vertex_buffer: Buffer,
    display_binding: Option<CachedBinding>,
    cursor_binding: Option<CachedBinding>,
}

impl SurfaceRenderer {
    /// Create the GPU context and a renderer for `window`
    pub async fn for_window(window: Arc<Window>, config: &PresenterConfig) -> Result<Self> {
        let instance = GpuContext::create_instance();
        let surface = instance
            .create_surface(window)
            .map_err(|e| PresentError::Surface(format!("failed to create surface: {}", e)))?;
        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;
        Self::new(gpu, surface, config)
    }

    pub fn new(gpu: GpuContext, surface: Surface<'static>, config: &PresenterConfig) -> Result<Self> {
        let surface_caps = surface.get_capabilities(gpu.adapter());

        // Framebuffer bytes are already display-encoded; an sRGB target would encode them twice
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| PresentError::Surface("surface reports no formats".into()))?;

        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: 0,
            height: 0,
            present_mode: config.present_mode(),
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let device = gpu.device();
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Quad Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Quad Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Uniform Buffer"),
            contents: bytemuck::bytes_of(&ViewportTransform::default().uniforms()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Quad Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Vertex Buffer"),
            size: (MAX_QUADS * VERTICES_PER_QUAD as usize * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let filter = config.filter.filter_mode();
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Quad Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/quad.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Quad Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let display_pipeline = Self::create_pipeline(
            device,
            &shader,
            &pipeline_layout,
            surface_format,
            "fs_display",
            wgpu::BlendState::REPLACE,
        );
        let cursor_pipeline = Self::create_pipeline(
            device,
            &shader,
            &pipeline_layout,
            surface_format,
            "fs_cursor",
            wgpu::BlendState::ALPHA_BLENDING,
        );

        Ok(Self {
            gpu,
            surface,
            surface_config,
            configured: false,
            display_pipeline,
            cursor_pipeline,
            texture_layout,
            sampler,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            display_binding: None,
            cursor_binding: None,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Reconfigure only when the drawable size actually changed
    fn ensure_configured(&mut self, size: UVec2) {
        if self.configured && self.surface_config.width == size.x && self.surface_config.height == size.y {
            return;
        }
        self.surface_config.width = size.x;
        self.surface_config.height = size.y;
        self.surface.configure(self.gpu.device(), &self.surface_config);
        self.configured = true;
        log::debug!("surface configured at {}x{}", size.x, size.y);
    }

    /// Clear, draw `quads` in order and present. Returns false when the frame was skipped.
    fn draw(
        &mut self,
        clear_color: wgpu::Color,
        transform: &ViewportTransform,
        quads: &[QuadDraw<GpuTexture>],
    ) -> Result<bool> {
        self.ensure_configured(transform.drawable_size);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(self.gpu.device(), &self.surface_config);
                return Ok(false);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("surface acquire timed out");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let uniforms: Uniforms = transform.uniforms();
        self.gpu
            .queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let quads = &quads[..quads.len().min(MAX_QUADS)];
        let vertices: Vec<Vertex> = quads.iter().flat_map(|quad| quad.vertices()).collect();
        if !vertices.is_empty() {
            self.gpu
                .queue()
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }
        for quad in quads {
            self.refresh_binding(quad.layer, &quad.texture);
        }
        self.drop_dead_bindings();

        let device = self.gpu.device();
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            for (index, quad) in quads.iter().enumerate() {
                let (pipeline, binding) = match quad.layer {
                    QuadLayer::Display => (&self.display_pipeline, &self.display_binding),
                    QuadLayer::Cursor => (&self.cursor_pipeline, &self.cursor_binding),
                };
                let Some(binding) = binding else { continue };
                let first = index as u32 * VERTICES_PER_QUAD;
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &binding.bind_group, &[]);
                render_pass.draw(first..first + VERTICES_PER_QUAD, 0..1);
            }
        }

        self.gpu.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(true)
    }

    /// Rebuild the layer's bind group only when its texture was replaced
    fn refresh_binding(&mut self, layer: QuadLayer, texture: &Arc<GpuTexture>) {
        let cached = match layer {
            QuadLayer::Display => &self.display_binding,
            QuadLayer::Cursor => &self.cursor_binding,
        };
        let current = Arc::downgrade(texture);
        if cached.as_ref().is_some_and(|c| c.texture.ptr_eq(&current)) {
            return;
        }

        let binding = CachedBinding {
            texture: current,
            bind_group: self.texture_bind_group(texture),
        };
        match layer {
            QuadLayer::Display => self.display_binding = Some(binding),
            QuadLayer::Cursor => self.cursor_binding = Some(binding),
        }
    }

    /// A cached bind group keeps its texture's memory alive; let go after a release
    fn drop_dead_bindings(&mut self) {
        for slot in [&mut self.display_binding, &mut self.cursor_binding] {
            if slot.as_ref().is_some_and(|c| c.texture.strong_count() == 0) {
                *slot = None;
            }
        }
    }

    fn texture_bind_group(&self, texture: &GpuTexture) -> BindGroup {
        self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Quad Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn create_pipeline(
        device: &Device,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        format: wgpu::TextureFormat,
        fragment_entry: &str,
        blend: wgpu::BlendState,
    ) -> RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(fragment_entry),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

impl PresentableSurface<GpuTexture> for SurfaceRenderer {
    fn present(&mut self, plan: &FramePlan<GpuTexture>) -> Result<FrameStatus> {
        let (clear_color, transform, quads, status) = match plan {
            FramePlan::Suspended => return Ok(FrameStatus::Suspended),
            FramePlan::Blank {
                clear_color,
                transform,
            } => (*clear_color, transform, &[][..], FrameStatus::Blank),
            FramePlan::Composite(composition) => (
                composition.clear_color,
                &composition.transform,
                composition.quads.as_slice(),
                FrameStatus::Presented,
            ),
        };

        if self.draw(clear_color, transform, quads)? {
            Ok(status)
        } else {
            Ok(FrameStatus::Skipped)
        }
    }
}
