//! Per-scene render pipelines and the wgpu-backed program compiler.

use bytemuck::{Pod, Zeroable};
use engine::{CompileError, ProgramCompiler, UniformSchema};
use wgpu::util::DeviceExt;

use crate::compile::{compile_fragment_shader, compile_vertex_shader};

use super::context::GpuContext;
use super::uniforms::UboLayout;

/// One vertex of the shared full-screen quad.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 2],
}

/// Unit quad in clip space, wound for a triangle strip.
const UNIT_QUAD: [QuadVertex; 4] = [
    QuadVertex {
        position: [-1.0, -1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
    },
];

/// The fixed full-screen geometry every scene draws with.
pub(crate) struct QuadGeometry {
    buffer: wgpu::Buffer,
}

impl QuadGeometry {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("unit quad"),
            contents: bytemuck::cast_slice(&UNIT_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { buffer }
    }

    pub(crate) fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(..)
    }

    pub(crate) const VERTEX_COUNT: u32 = UNIT_QUAD.len() as u32;

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Compiled program handle stored in the registry: the render pipeline plus
/// its schema-derived uniform buffer and bind group.
pub struct ScenePipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    layout: UboLayout,
}

impl ScenePipeline {
    /// Writes one frame's packed uniform block.
    pub(crate) fn upload(&self, queue: &wgpu::Queue, bundle: &engine::UniformBundle) {
        queue.write_buffer(&self.uniform_buffer, 0, &self.layout.pack(bundle));
    }

    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }
}

/// [`ProgramCompiler`] implementation over a live device.
///
/// Borrowed from the context only during startup registration; the produced
/// [`ScenePipeline`] handles own their GPU objects outright.
pub struct SceneCompiler<'a> {
    device: &'a wgpu::Device,
    surface_format: wgpu::TextureFormat,
    uniform_layout: wgpu::BindGroupLayout,
}

impl<'a> SceneCompiler<'a> {
    pub(crate) fn new(gpu: &'a GpuContext) -> Self {
        let uniform_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene uniform layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        Self {
            device: &gpu.device,
            surface_format: gpu.format(),
            uniform_layout,
        }
    }
}

impl ProgramCompiler for SceneCompiler<'_> {
    type Handle = ScenePipeline;

    fn compile(
        &mut self,
        vertex: &str,
        fragment: &str,
        schema: &UniformSchema,
    ) -> Result<ScenePipeline, CompileError> {
        let vertex_module = compile_vertex_shader(self.device, vertex)?;
        let fragment_module = compile_fragment_shader(self.device, fragment, schema)?;

        let layout = UboLayout::from_schema(schema);
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene uniforms"),
            size: layout.size() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("scene pipeline layout"),
                bind_group_layouts: &[&self.uniform_layout],
                push_constant_ranges: &[],
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("scene pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: Some("main"),
                    buffers: &[QuadGeometry::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: Some("main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview: None,
                cache: None,
            });

        Ok(ScenePipeline {
            pipeline,
            uniform_buffer,
            bind_group,
            layout,
        })
    }
}
