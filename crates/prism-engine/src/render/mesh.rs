use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawList, Mesh, MeshHandle, MeshStyle};

/// Renderer for translucent mesh instances recorded in a `DrawList`.
///
/// Templates are registered CPU-side and uploaded on the next `render` call,
/// because the device is only reachable while a frame is being recorded.
/// Wireframe instances use a line-list pipeline, solid instances a triangle-list
/// pipeline; both blend premultiplied alpha and skip depth testing, relying on
/// the list's back-to-front order instead.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    wire_pipeline: Option<wgpu::RenderPipeline>,
    solid_pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    camera_ubo: Option<wgpu::Buffer>,

    templates: Vec<Option<Template>>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
    instances: Vec<MeshInstance>,
    batches: Vec<(MeshHandle, MeshStyle)>,
}

struct Template {
    mesh: Mesh,
    gpu: Option<GpuMesh>,
}

struct GpuMesh {
    vbo: wgpu::Buffer,
    triangles: Option<(wgpu::Buffer, u32)>,
    edges: Option<(wgpu::Buffer, u32)>,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mesh template and returns its handle. Released slots are reused.
    pub fn register(&mut self, mesh: Mesh) -> MeshHandle {
        let template = Some(Template { mesh, gpu: None });
        match self.templates.iter().position(Option::is_none) {
            Some(slot) => {
                self.templates[slot] = template;
                MeshHandle(slot as u32)
            }
            None => {
                self.templates.push(template);
                MeshHandle((self.templates.len() - 1) as u32)
            }
        }
    }

    /// Drops a template and its GPU buffers. Returns `false` for unknown handles.
    pub fn release(&mut self, handle: MeshHandle) -> bool {
        self.templates
            .get_mut(handle.0 as usize)
            .and_then(Option::take)
            .is_some()
    }

    /// Drops every template and all GPU resources owned by the renderer.
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// Number of live templates.
    pub fn template_count(&self) -> usize {
        self.templates.iter().flatten().count()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
    ) {
        if self.prepare(draw_list) == 0 {
            return;
        }

        self.ensure_pipelines(ctx);
        self.ensure_bindings(ctx);
        self.ensure_uploaded(ctx);
        self.write_camera_uniform(ctx, draw_list);
        self.ensure_instance_capacity(ctx, self.instances.len());

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        ctx.queue
            .write_buffer(instance_vbo, 0, bytemuck::cast_slice(&self.instances));

        let Some(wire) = self.wire_pipeline.as_ref() else { return };
        let Some(solid) = self.solid_pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));

        let mut bound_style = None;
        for (i, (handle, style)) in self.batches.iter().enumerate() {
            let Some(Some(Template { gpu: Some(gpu), .. })) = self.templates.get(handle.0 as usize)
            else {
                continue;
            };

            let indices = match style {
                MeshStyle::Wireframe => gpu.edges.as_ref(),
                MeshStyle::Solid => gpu.triangles.as_ref(),
            };
            let Some((ibo, count)) = indices else { continue };

            if bound_style != Some(*style) {
                rpass.set_pipeline(match style {
                    MeshStyle::Wireframe => wire,
                    MeshStyle::Solid => solid,
                });
                bound_style = Some(*style);
            }

            let i = i as u32;
            rpass.set_vertex_buffer(0, gpu.vbo.slice(..));
            rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..*count, 0, i..i + 1);
        }
    }

    /// Fills the reused instance and batch buffers from `draw_list` in paint
    /// order, skipping released templates and invisible commands. Returns the
    /// instance count.
    fn prepare(&mut self, draw_list: &mut DrawList) -> usize {
        self.instances.clear();
        self.batches.clear();

        for item in draw_list.iter_in_paint_order() {
            let cmd = &item.cmd;
            let live = matches!(self.templates.get(cmd.mesh.0 as usize), Some(Some(_)));
            if !live || cmd.color.a <= 0.0 {
                continue;
            }
            self.instances.push(MeshInstance {
                model: cmd.model.to_cols_array_2d(),
                color: cmd.color.to_array(),
            });
            self.batches.push((cmd.mesh, cmd.style));
        }
        self.instances.len()
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format)
            && self.wire_pipeline.is_some()
            && self.solid_pipeline.is_some()
        {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prism mesh bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(camera_ubo_min_binding_size()),
                    },
                    count: None,
                }],
            });

        let pipeline_layout =
            ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("prism mesh pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let build = |label: &str, fs: &str, topology: wgpu::PrimitiveTopology| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout(), MeshInstance::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(premul_alpha_blend()),
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
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let wire = build("prism wire pipeline", "fs_wire", wgpu::PrimitiveTopology::LineList);
        let solid = build("prism solid pipeline", "fs_solid", wgpu::PrimitiveTopology::TriangleList);

        self.pipeline_format = Some(ctx.surface_format);
        self.wire_pipeline = Some(wire);
        self.solid_pipeline = Some(solid);
        self.bind_group_layout = Some(bind_group_layout);
        self.bind_group = None;
        self.camera_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.camera_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let camera_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism mesh bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        self.camera_ubo = Some(camera_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_uploaded(&mut self, ctx: &RenderCtx<'_>) {
        for template in self.templates.iter_mut().flatten() {
            if template.gpu.is_some() {
                continue;
            }
            let mesh = &template.mesh;
            let vertices: Vec<[f32; 3]> = mesh.positions.iter().map(|p| p.to_array()).collect();

            let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("prism mesh vbo"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

            let index_buffer = |label: &str, indices: Vec<u32>| {
                (!indices.is_empty()).then(|| {
                    let buf = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(&indices),
                        usage: wgpu::BufferUsages::INDEX,
                    });
                    (buf, indices.len() as u32)
                })
            };

            template.gpu = Some(GpuMesh {
                vbo,
                triangles: index_buffer("prism mesh triangle ibo", mesh.triangle_indices()),
                edges: index_buffer("prism mesh edge ibo", mesh.edge_indices()),
            });
        }
    }

    fn write_camera_uniform(&mut self, ctx: &RenderCtx<'_>, draw_list: &DrawList) {
        let Some(ubo) = self.camera_ubo.as_ref() else { return };
        ctx.queue.write_buffer(
            ubo,
            0,
            bytemuck::bytes_of(&CameraUniform {
                view_proj: draw_list.view_proj().to_cols_array_2d(),
                eye: draw_list.eye().extend(1.0).to_array(),
            }),
        );
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(16);
        let new_size = (new_cap * std::mem::size_of::<MeshInstance>()) as u64;
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism mesh instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

fn camera_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<CameraUniform>() as u64)
        .expect("CameraUniform has non-zero size by construction")
}

// ── GPU types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
}

/// Instance data layout (80 bytes):
///
///  offset  0  model   [[f32; 4]; 4]  loc 1..=4 (columns)
///  offset 64  color   [f32; 4]       loc 5     (premultiplied)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MeshInstance {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl MeshInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
