use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Mat4;
use terrain_viewer::display::{
    self, AMBIENT_FACTOR, DIFFUSE_FACTOR, Light, MeshMode, SHININESS, SPECULAR_FACTOR, WIRE_COLOR,
};
use terrain_viewer::{GridSize, Projection, Viewer};
use wgpu::util::DeviceExt;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LightRaw {
    position: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

impl From<&Light> for LightRaw {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position.extend(1.0).to_array(),
            ambient: light.ambient.extend(light.linear_attenuation).to_array(),
            diffuse: light.diffuse.extend(1.0).to_array(),
            specular: light.specular.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    lights: [LightRaw; 2],
    material: [f32; 4],
    wire_color: [f32; 4],
    flags: [u32; 4],
}

impl SceneUniform {
    fn new(lights: &[Light; 2]) -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0; 4],
            lights: [LightRaw::from(&lights[0]), LightRaw::from(&lights[1])],
            material: [AMBIENT_FACTOR, DIFFUSE_FACTOR, SPECULAR_FACTOR, SHININESS],
            wire_color: [WIRE_COLOR[0], WIRE_COLOR[1], WIRE_COLOR[2], 1.0],
            flags: [1, 0, 0, 0],
        }
    }

    fn update(&mut self, viewer: &Viewer, projection: &Projection) {
        let camera = &viewer.camera;
        self.view_proj =
            (projection.build_projection_matrix() * camera.build_view_matrix()).to_cols_array_2d();
        self.camera_pos = camera.position.to_vec3().extend(1.0).to_array();
        self.flags[0] = u32::from(viewer.display.lighting);
        self.flags[1] = u32::from(viewer.display.wire_uses_overlay_color());
    }
}

/// Vertices for the displayed (animated) heights, laid out like the grid.
pub fn terrain_vertices(viewer: &Viewer) -> Vec<Vertex> {
    let terrain = viewer.terrain();
    let animated = viewer.animated();
    let normals = terrain.normals();
    let max_height = terrain.max_height();

    animated
        .size()
        .coords()
        .map(|(x, z)| {
            let height = animated[(x, z)];
            Vertex {
                position: [x as f32, height, z as f32],
                normal: normals[(x, z)].to_array(),
                color: display::topographic_color(height, max_height),
            }
        })
        .collect()
}

fn vertex_index(size: GridSize, x: usize, z: usize) -> u32 {
    (x * size.z_size() + z) as u32
}

/// Two counter-clockwise (seen from above) triangles per grid cell.
pub fn fill_indices(size: GridSize) -> Vec<u32> {
    let mut indices = Vec::new();
    for x in 0..size.x_size().saturating_sub(1) {
        for z in 0..size.z_size().saturating_sub(1) {
            let a = vertex_index(size, x, z);
            let b = vertex_index(size, x, z + 1);
            let c = vertex_index(size, x + 1, z);
            let d = vertex_index(size, x + 1, z + 1);
            indices.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }
    indices
}

/// Line-list edges of every cell; triangle mode adds the diagonal the fill uses.
pub fn wire_indices(size: GridSize, mesh_mode: MeshMode) -> Vec<u32> {
    let mut indices = Vec::new();
    for x in 0..size.x_size() {
        for z in 0..size.z_size() {
            let here = vertex_index(size, x, z);
            if x + 1 < size.x_size() {
                indices.extend_from_slice(&[here, vertex_index(size, x + 1, z)]);
            }
            if z + 1 < size.z_size() {
                indices.extend_from_slice(&[here, vertex_index(size, x, z + 1)]);
            }
            if mesh_mode == MeshMode::Triangles && x + 1 < size.x_size() && z + 1 < size.z_size() {
                indices.extend_from_slice(&[
                    vertex_index(size, x + 1, z),
                    vertex_index(size, x, z + 1),
                ]);
            }
        }
    }
    indices
}

struct IndexedBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexedBuffer {
    fn new(device: &wgpu::Device, label: &str, indices: &[u32]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            buffer,
            count: indices.len() as u32,
        }
    }
}

pub struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    smooth_pipeline: wgpu::RenderPipeline,
    flat_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    fill_indices: IndexedBuffer,
    quad_wire_indices: IndexedBuffer,
    triangle_wire_indices: IndexedBuffer,
    projection: Projection,
    scene_uniform: SceneUniform,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
}

impl State {
    pub async fn new(window: Arc<Window>, viewer: &Viewer) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor { ..Default::default() });
        let surface = instance.create_surface(window).context("creating surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("no suitable graphics adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                ..Default::default()
            })
            .await
            .context("requesting device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let projection = Projection::new(config.width, config.height, 90.0, 0.1, 1000.0);
        let grid = viewer.terrain().size();
        let mut scene_uniform = SceneUniform::new(&display::terrain_lights(grid));
        scene_uniform.update(viewer, &projection);

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Buffer"),
            contents: bytemuck::cast_slice(&[scene_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("scene_bind_group_layout"),
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
            label: Some("scene_bind_group"),
        });

        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let vertices = terrain_vertices(viewer);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let fill_indices = IndexedBuffer::new(&device, "Terrain Fill Indices", &fill_indices(grid));
        let quad_wire_indices =
            IndexedBuffer::new(&device, "Terrain Quad Wire Indices", &wire_indices(grid, MeshMode::Quads));
        let triangle_wire_indices = IndexedBuffer::new(
            &device,
            "Terrain Triangle Wire Indices",
            &wire_indices(grid, MeshMode::Triangles),
        );

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |label: &str, vs: &str, fs: &str, topology: wgpu::PrimitiveTopology| {
            let filled = topology == wgpu::PrimitiveTopology::TriangleList;
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&render_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: filled.then_some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    // Push the fill back so the wireframe wins in doubled mode.
                    bias: if filled {
                        wgpu::DepthBiasState {
                            constant: 2,
                            slope_scale: 1.0,
                            clamp: 0.0,
                        }
                    } else {
                        wgpu::DepthBiasState::default()
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let smooth_pipeline = pipeline(
            "Smooth Terrain Pipeline",
            "vs_main",
            "fs_main",
            wgpu::PrimitiveTopology::TriangleList,
        );
        let flat_pipeline = pipeline(
            "Flat Terrain Pipeline",
            "vs_flat",
            "fs_flat",
            wgpu::PrimitiveTopology::TriangleList,
        );
        let wire_pipeline = pipeline(
            "Wire Terrain Pipeline",
            "vs_main",
            "fs_wire",
            wgpu::PrimitiveTopology::LineList,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            smooth_pipeline,
            flat_pipeline,
            wire_pipeline,
            vertex_buffer,
            fill_indices,
            quad_wire_indices,
            triangle_wire_indices,
            projection,
            scene_uniform,
            scene_buffer,
            scene_bind_group,
            depth_view,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.projection.resize(new_size.width, new_size.height);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    /// Uploads the frame's snapshot: camera transform and the animated mesh.
    fn upload(&mut self, viewer: &Viewer) {
        self.scene_uniform.update(viewer, &self.projection);
        self.queue.write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[self.scene_uniform]));

        let vertices = terrain_vertices(viewer);
        self.queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
    }

    pub fn render(&mut self, viewer: &Viewer) -> Result<(), wgpu::SurfaceError> {
        self.upload(viewer);

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
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
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

            let settings = &viewer.display;
            if settings.draws_fill() {
                let pipeline = if settings.smooth_shading {
                    &self.smooth_pipeline
                } else {
                    &self.flat_pipeline
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_index_buffer(self.fill_indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.fill_indices.count, 0, 0..1);
            }
            if settings.draws_wire() {
                let wire = match settings.mesh_mode {
                    MeshMode::Quads => &self.quad_wire_indices,
                    MeshMode::Triangles => &self.triangle_wire_indices,
                };
                render_pass.set_pipeline(&self.wire_pipeline);
                render_pass.set_index_buffer(wire.buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..wire.count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(x: usize, z: usize) -> GridSize {
        GridSize::new(x, z).unwrap()
    }

    #[test]
    fn fill_has_two_triangles_per_cell() {
        let indices = fill_indices(size(3, 4));
        assert_eq!(indices.len(), 2 * 3 * 2 * 3);
        assert_eq!(&indices[..6], &[0, 1, 4, 4, 1, 5]);
        assert!(indices.iter().all(|&i| i < 12));
    }

    #[test]
    fn fill_of_degenerate_grid_is_empty() {
        assert!(fill_indices(size(1, 5)).is_empty());
    }

    #[test]
    fn wire_edge_counts() {
        // A 3x3 grid has 12 cell edges and 4 diagonals.
        assert_eq!(wire_indices(size(3, 3), MeshMode::Quads).len(), 2 * 12);
        assert_eq!(wire_indices(size(3, 3), MeshMode::Triangles).len(), 2 * 16);
    }

    #[test]
    fn only_doubled_mode_recolours_the_wireframe() {
        let mut viewer = Viewer::new(size(4, 4), 1);
        let lights = display::terrain_lights(viewer.terrain().size());
        let mut uniform = SceneUniform::new(&lights);
        let projection = Projection::default();

        viewer.display.cycle_render_mode();
        uniform.update(&viewer, &projection);
        assert_eq!(uniform.flags[1], 0);

        viewer.display.cycle_render_mode();
        uniform.update(&viewer, &projection);
        assert_eq!(uniform.flags[1], 1);
        assert_eq!(uniform.flags[0], 1);
    }

    #[test]
    fn vertices_follow_animated_heights() {
        let mut viewer = Viewer::new(size(6, 5), 4);
        let vertices = terrain_vertices(&viewer);
        assert_eq!(vertices.len(), 30);
        assert!(vertices.iter().all(|v| v.position[1] == 0.0));
        assert_eq!(vertices[7].position, [1.0, 0.0, 2.0]);

        viewer.tick();
        let raised = terrain_vertices(&viewer);
        for ((x, z), v) in viewer.animated().size().coords().zip(&raised) {
            assert_eq!(v.position[1], viewer.animated()[(x, z)]);
            assert_eq!(v.normal, viewer.terrain().normals()[(x, z)].to_array());
        }
    }
}
