//! wgpu presentation glue
//!
//! Consumes a `scene::Scene` per frame and draws it: a perspective pass for
//! the field (triangles) and particles (points), then a screen-space overlay
//! pass for panels and the health bar. Vertices are rebuilt on the CPU every
//! frame and uploaded in one shot; there is no retained geometry.

pub mod scene;

pub use scene::{compose, Hud, Overlay, Scene};

use glam::{Mat4, Vec3};
use winit::window::Window;

use crate::errors::GameError;
use crate::mesh::MeshSet;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 4],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4,
    ];

    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex capacity of the per-frame buffers
const MAX_WORLD_VERTICES: usize = 16384;
const MAX_POINT_VERTICES: usize = 4096;
const MAX_OVERLAY_VERTICES: usize = 256;

pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: (u32, u32),

    depth_view: wgpu::TextureView,

    world_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    overlay_bind_group: wgpu::BindGroup,

    world_buffer: wgpu::Buffer,
    point_buffer: wgpu::Buffer,
    overlay_buffer: wgpu::Buffer,

    world_vertices: Vec<Vertex>,
    point_vertices: Vec<Vertex>,
    overlay_vertices: Vec<Vertex>,
}

impl Renderer {
    pub async fn new(window: &Window) -> Result<Self, GameError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: Default::default(),
        });

        let surface = unsafe { instance.create_surface(window) }
            .map_err(|e| GameError::Render(format!("failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| GameError::Render("no suitable adapter".to_string()))?;

        log::info!("using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| GameError::Render(format!("failed to create device: {}", e)))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("Camera Bind Group Layout"),
        });

        let camera_buffer = create_uniform_buffer(&device, "Camera Buffer");
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("Camera Bind Group"),
        });

        // The overlay draws in clip space; its matrix never changes
        let overlay_buffer_uniform = create_uniform_buffer(&device, "Overlay Camera Buffer");
        queue.write_buffer(
            &overlay_buffer_uniform,
            0,
            bytemuck::cast_slice(&[CameraUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }]),
        );
        let overlay_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: overlay_buffer_uniform.as_entire_binding(),
            }],
            label: Some("Overlay Bind Group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });

        let world_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            wgpu::PrimitiveTopology::TriangleList,
            true,
        );
        let point_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            wgpu::PrimitiveTopology::PointList,
            true,
        );
        let overlay_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            wgpu::PrimitiveTopology::TriangleList,
            false,
        );

        let world_buffer = create_vertex_buffer(&device, "World Vertex Buffer", MAX_WORLD_VERTICES);
        let point_buffer = create_vertex_buffer(&device, "Point Vertex Buffer", MAX_POINT_VERTICES);
        let overlay_buffer =
            create_vertex_buffer(&device, "Overlay Vertex Buffer", MAX_OVERLAY_VERTICES);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size: (size.width, size.height),
            depth_view,
            world_pipeline,
            point_pipeline,
            overlay_pipeline,
            camera_buffer,
            camera_bind_group,
            overlay_bind_group,
            world_buffer,
            point_buffer,
            overlay_buffer,
            world_vertices: Vec::new(),
            point_vertices: Vec::new(),
            overlay_vertices: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    /// Draw one frame
    pub fn render(&mut self, scene: &Scene, meshes: &MeshSet) -> Result<(), wgpu::SurfaceError> {
        self.build_world(scene, meshes);
        self.build_points(scene);
        self.build_overlay(scene);

        let aspect = self.config.width as f32 / self.config.height.max(1) as f32;
        // 45 degree fov, eye slightly above and behind the mower
        let view_proj = Mat4::perspective_rh(45.0f32.to_radians(), aspect, 0.1, 120.0)
            * Mat4::from_translation(Vec3::new(0.0, -1.3, -5.0));
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform {
                view_proj: view_proj.to_cols_array_2d(),
            }]),
        );

        clamp_vertices(&mut self.world_vertices, MAX_WORLD_VERTICES, "world");
        clamp_vertices(&mut self.point_vertices, MAX_POINT_VERTICES, "point");
        clamp_vertices(&mut self.overlay_vertices, MAX_OVERLAY_VERTICES, "overlay");

        if !self.world_vertices.is_empty() {
            self.queue
                .write_buffer(&self.world_buffer, 0, bytemuck::cast_slice(&self.world_vertices));
        }
        if !self.point_vertices.is_empty() {
            self.queue
                .write_buffer(&self.point_buffer, 0, bytemuck::cast_slice(&self.point_vertices));
        }
        if !self.overlay_vertices.is_empty() {
            self.queue.write_buffer(
                &self.overlay_buffer,
                0,
                bytemuck::cast_slice(&self.overlay_vertices),
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Sky color behind everything
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.35,
                            g: 0.55,
                            b: 0.8,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            if !self.world_vertices.is_empty() {
                pass.set_pipeline(&self.world_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, self.world_buffer.slice(..));
                pass.draw(0..self.world_vertices.len() as u32, 0..1);
            }
            if !self.point_vertices.is_empty() {
                pass.set_pipeline(&self.point_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, self.point_buffer.slice(..));
                pass.draw(0..self.point_vertices.len() as u32, 0..1);
            }
            if !self.overlay_vertices.is_empty() {
                pass.set_pipeline(&self.overlay_pipeline);
                pass.set_bind_group(0, &self.overlay_bind_group, &[]);
                pass.set_vertex_buffer(0, self.overlay_buffer.slice(..));
                pass.draw(0..self.overlay_vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn build_world(&mut self, scene: &Scene, meshes: &MeshSet) {
        self.world_vertices.clear();
        for prop in &scene.props {
            let color = [prop.color[0], prop.color[1], prop.color[2], 1.0];
            for tri in meshes.get(prop.mesh).triangles() {
                for corner in tri {
                    self.world_vertices.push(Vertex {
                        position: (corner + prop.position).to_array(),
                        color,
                    });
                }
            }
        }
    }

    fn build_points(&mut self, scene: &Scene) {
        self.point_vertices.clear();
        for set in &scene.points {
            let color = [set.color[0], set.color[1], set.color[2], 1.0];
            for point in &set.points {
                self.point_vertices.push(Vertex {
                    position: point.to_array(),
                    color,
                });
            }
        }
    }

    fn build_overlay(&mut self, scene: &Scene) {
        self.overlay_vertices.clear();

        match scene.overlay {
            Overlay::None => {}
            Overlay::Menu => {
                // Centered title and hint panels
                push_rect(&mut self.overlay_vertices, -0.45, 0.25, 0.9, 0.25, [0.0, 0.0, 0.0, 0.35]);
                push_rect(&mut self.overlay_vertices, -0.55, -0.15, 1.1, 0.15, [0.0, 0.0, 0.0, 0.35]);
            }
            Overlay::Paused => {
                push_rect(&mut self.overlay_vertices, -1.0, -1.0, 2.0, 2.0, [0.0, 0.0, 0.0, 0.45]);
                push_rect(&mut self.overlay_vertices, -0.35, -0.1, 0.7, 0.3, [0.0, 0.0, 0.0, 0.5]);
            }
            Overlay::GameOver => {
                push_rect(&mut self.overlay_vertices, -1.0, -1.0, 2.0, 2.0, [0.3, 0.0, 0.0, 0.4]);
                push_rect(&mut self.overlay_vertices, -0.5, -0.05, 1.0, 0.4, [0.0, 0.0, 0.0, 0.5]);
            }
        }

        if let Some(hud) = scene.hud {
            // Health bar, top-left
            let fill = hud.health as f32 / hud.max_health as f32;
            push_rect(&mut self.overlay_vertices, -0.97, 0.86, 0.54, 0.08, [0.0, 0.0, 0.0, 0.25]);
            push_rect(&mut self.overlay_vertices, -0.95, 0.88, 0.5, 0.05, [0.1, 0.05, 0.05, 0.9]);
            push_rect(
                &mut self.overlay_vertices,
                -0.95,
                0.88,
                0.5 * fill,
                0.05,
                [0.0, 0.8, 0.2, 0.95],
            );
        }
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_uniform_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<CameraUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_vertex_buffer(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (capacity * std::mem::size_of::<Vertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[Vertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: if depth_write {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// Append a screen-space rectangle (clip-space coordinates, origin bottom-left)
fn push_rect(vertices: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
    let corners = [
        [x, y],
        [x + w, y],
        [x + w, y + h],
        [x, y + h],
    ];
    for &i in &[0usize, 1, 2, 2, 3, 0] {
        vertices.push(Vertex {
            position: [corners[i][0], corners[i][1], 0.0],
            color,
        });
    }
}

fn clamp_vertices(vertices: &mut Vec<Vertex>, capacity: usize, which: &str) {
    if vertices.len() > capacity {
        log::warn!("{} vertex buffer full, dropping {}", which, vertices.len() - capacity);
        vertices.truncate(capacity);
    }
}
