//! Rendering system with wgpu pipeline and shader management.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::{SceneError, SceneResult};
use crate::geometry::{Mesh, MeshVertex};
use crate::lifecycle::Release;
use crate::params::RenderConfig;
use crate::scene::Scene;
use crate::sync::UniformSync;
use crate::uniforms::CameraUniforms;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Vertex and index buffers of one static mesh
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// One material: pipeline, its uniform block and the mesh it draws
struct MaterialPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    mesh: GpuMesh,
}

impl MaterialPass {
    fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }

    fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.mesh.destroy();
    }
}

/// Fixed-function state that differs between materials
struct PipelineState<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    cull_mode: Option<wgpu::Face>,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    state: PipelineState<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(state.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: state.shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: state.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: state.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: state.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: state.depth_write,
            depth_compare: state.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    noise_table_buffer: wgpu::Buffer,
    sky: MaterialPass,
    terrain: MaterialPass,
    cloud_volumes: MaterialPass,
    cloud_dome: MaterialPass,
    clear_color: wgpu::Color,
    released: bool,
}

impl RenderSystem {
    /// Acquire the surface and GPU, then upload the scene's static geometry
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        render_config: &RenderConfig,
    ) -> SceneResult<Self> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Window must have 'static lifetime via Arc
        let surface = instance
            .create_surface(window)
            .map_err(|e| SceneError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SceneError::Adapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Scene Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| SceneError::Device(e.to_string()))?;

        // Prefer an sRGB surface; uniforms carry linear colors
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| SceneError::Surface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (depth_texture, depth_view) = create_depth_texture(&device, width, height);

        // Camera (group 0, shared)
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniforms::new(Mat4::IDENTITY, Vec3::ZERO)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[uniform_entry(0)],
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Material layouts (group 1)
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[uniform_entry(0)],
        });
        let dome_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cloud Dome Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let material_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Material Pipeline Layout"),
                bind_group_layouts: &[&camera_layout, &material_layout],
                push_constant_ranges: &[],
            });
        let dome_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cloud Dome Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &dome_layout],
            push_constant_ranges: &[],
        });

        let noise_table_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Noise Permutation Buffer"),
            contents: bytemuck::cast_slice(&scene.noise.state().gpu_table()),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let uniforms = scene.sync.uniforms();
        let uniform_buffer = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let material_bind_group = |label: &str, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &material_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };
        let shader = |label: &str, source: &'static str| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        };

        // Sky: gradient sphere seen from inside, always behind everything
        let sky_shader = shader("Sky Shader", include_str!("shaders/sky.wgsl"));
        let sky_buffer = uniform_buffer("Sky Uniform Buffer", bytemuck::bytes_of(&uniforms.sky));
        let sky = MaterialPass {
            pipeline: create_pipeline(
                &device,
                &material_pipeline_layout,
                config.format,
                PipelineState {
                    label: "Sky Pipeline",
                    shader: &sky_shader,
                    cull_mode: Some(wgpu::Face::Front),
                    blend: None,
                    depth_write: false,
                    depth_compare: wgpu::CompareFunction::Always,
                },
            ),
            bind_group: material_bind_group("Sky Bind Group", &sky_buffer),
            uniform_buffer: sky_buffer,
            mesh: GpuMesh::upload(&device, "Sky", &scene.sky_mesh),
        };

        // Terrain: lit heightfield
        let terrain_shader = shader("Terrain Shader", include_str!("shaders/terrain.wgsl"));
        let terrain_buffer = uniform_buffer(
            "Terrain Uniform Buffer",
            bytemuck::bytes_of(&uniforms.terrain),
        );
        let terrain = MaterialPass {
            pipeline: create_pipeline(
                &device,
                &material_pipeline_layout,
                config.format,
                PipelineState {
                    label: "Terrain Pipeline",
                    shader: &terrain_shader,
                    cull_mode: Some(wgpu::Face::Back),
                    blend: None,
                    depth_write: true,
                    depth_compare: wgpu::CompareFunction::Less,
                },
            ),
            bind_group: material_bind_group("Terrain Bind Group", &terrain_buffer),
            uniform_buffer: terrain_buffer,
            mesh: GpuMesh::upload(&device, "Terrain", &scene.terrain_world_mesh()),
        };

        // Cloud volumes: every cluster baked into one cel-shaded mesh
        let volume_shader = shader("Cloud Volume Shader", include_str!("shaders/cloud_volume.wgsl"));
        let volume_buffer = uniform_buffer(
            "Cloud Volume Uniform Buffer",
            bytemuck::bytes_of(&uniforms.cloud_volume),
        );
        let cloud_volumes = MaterialPass {
            pipeline: create_pipeline(
                &device,
                &material_pipeline_layout,
                config.format,
                PipelineState {
                    label: "Cloud Volume Pipeline",
                    shader: &volume_shader,
                    cull_mode: Some(wgpu::Face::Back),
                    blend: None,
                    depth_write: true,
                    depth_compare: wgpu::CompareFunction::Less,
                },
            ),
            bind_group: material_bind_group("Cloud Volume Bind Group", &volume_buffer),
            uniform_buffer: volume_buffer,
            mesh: GpuMesh::upload(&device, "Cloud Volumes", &scene.clouds.world_mesh()),
        };

        // Cloud dome: double-sided, blended, depth-tested but never written
        let dome_shader = shader("Cloud Dome Shader", include_str!("shaders/cloud_dome.wgsl"));
        let dome_buffer = uniform_buffer(
            "Cloud Dome Uniform Buffer",
            bytemuck::bytes_of(&uniforms.cloud_dome),
        );
        let dome_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cloud Dome Bind Group"),
            layout: &dome_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: dome_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: noise_table_buffer.as_entire_binding(),
                },
            ],
        });
        let cloud_dome = MaterialPass {
            pipeline: create_pipeline(
                &device,
                &dome_pipeline_layout,
                config.format,
                PipelineState {
                    label: "Cloud Dome Pipeline",
                    shader: &dome_shader,
                    cull_mode: None,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    depth_write: false,
                    depth_compare: wgpu::CompareFunction::Less,
                },
            ),
            bind_group: dome_bind_group,
            uniform_buffer: dome_buffer,
            mesh: GpuMesh::upload(&device, "Cloud Dome", &scene.dome_mesh),
        };

        let [r, g, b] = render_config.clear_color;
        log::info!(
            "Render system ready: {}x{} {:?}, adapter {}",
            width,
            height,
            surface_format,
            adapter.get_info().name
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            depth_view,
            camera_buffer,
            camera_bind_group,
            noise_table_buffer,
            sky,
            terrain,
            cloud_volumes,
            cloud_dome,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            released: false,
        })
    }

    /// Reconfigure the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.released {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture.destroy();
        let (depth_texture, depth_view) = create_depth_texture(&self.device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
        log::debug!("Resized surface to {}x{}", width, height);
    }

    /// Reconfigure at the current size (after an outdated surface)
    pub fn reconfigure(&mut self) {
        self.resize(self.config.width, self.config.height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Update camera uniforms
    pub fn update_camera(&self, view_proj: Mat4, eye: Vec3) {
        if self.released {
            return;
        }
        let uniforms = CameraUniforms::new(view_proj, eye);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Write every uniform block the sync layer marked dirty
    pub fn upload(&self, sync: &mut UniformSync) {
        if self.released {
            return;
        }
        let dirty = sync.take_dirty();
        let uniforms = sync.uniforms();

        if dirty.sky {
            self.queue
                .write_buffer(&self.sky.uniform_buffer, 0, bytemuck::bytes_of(&uniforms.sky));
        }
        if dirty.terrain {
            self.queue.write_buffer(
                &self.terrain.uniform_buffer,
                0,
                bytemuck::bytes_of(&uniforms.terrain),
            );
        }
        if dirty.cloud_volume {
            self.queue.write_buffer(
                &self.cloud_volumes.uniform_buffer,
                0,
                bytemuck::bytes_of(&uniforms.cloud_volume),
            );
        }
        if dirty.cloud_dome {
            self.queue.write_buffer(
                &self.cloud_dome.uniform_buffer,
                0,
                bytemuck::bytes_of(&uniforms.cloud_dome),
            );
        }
    }

    /// Render a frame: sky, terrain, cloud volumes, then the blended dome
    pub fn render(&self) -> Result<(), wgpu::SurfaceError> {
        if self.released {
            return Ok(());
        }
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            self.sky.draw(&mut render_pass);
            self.terrain.draw(&mut render_pass);
            self.cloud_volumes.draw(&mut render_pass);
            self.cloud_dome.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl Release for RenderSystem {
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for pass in [&self.sky, &self.terrain, &self.cloud_volumes, &self.cloud_dome] {
            pass.destroy();
        }
        self.camera_buffer.destroy();
        self.noise_table_buffer.destroy();
        self.depth_texture.destroy();
        log::debug!("Released GPU resources");
    }
}
