use antler_render::{
    AttribLocation, BufferHandle, GpuContext, GpuError, ProgramHandle, UniformLocation,
};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

/// Stride between per-draw uniform snapshots; the WebGPU default for
/// `min_uniform_buffer_offset_alignment`.
pub const UNIFORM_SLOT_SIZE: u64 = 256;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const ATTRIB_SLOTS: usize = 2;
const INITIAL_SLOTS: u64 = 64;

const POSITION_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

/// The uniform block shared by every program, padded to one slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    pub p: [[f32; 4]; 4],
    pub v: [[f32; 4]; 4],
    pub w: [[f32; 4]; 4],
    pub m: [f32; 4],
    _pad: [f32; 12],
}

impl Default for UniformBlock {
    fn default() -> Self {
        Self {
            p: Mat4::IDENTITY.to_cols_array_2d(),
            v: Mat4::IDENTITY.to_cols_array_2d(),
            w: Mat4::IDENTITY.to_cols_array_2d(),
            m: Vec4::ONE.to_array(),
            _pad: [0.0; 12],
        }
    }
}

impl UniformBlock {
    fn set_mat4(&mut self, offset: u32, value: &Mat4) -> bool {
        let cols = value.to_cols_array_2d();
        match offset {
            0 => self.p = cols,
            64 => self.v = cols,
            128 => self.w = cols,
            _ => return false,
        }
        true
    }

    fn set_vec4(&mut self, offset: u32, value: Vec4) -> bool {
        if offset != 192 {
            return false;
        }
        self.m = value.to_array();
        true
    }
}

/// Byte offset of a uniform inside [`UniformBlock`].
pub fn uniform_offset(name: &str) -> Option<u32> {
    match name {
        "p" => Some(0),
        "v" => Some(64),
        "w" => Some(128),
        "m" => Some(192),
        _ => None,
    }
}

fn attrib_slot(name: &str) -> Option<u32> {
    match name {
        "P" => Some(0),
        "N" => Some(1),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferUsage {
    Vertex,
    Index,
}

struct Program {
    label: String,
    pipeline: wgpu::RenderPipeline,
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    usage: BufferUsage,
    len: usize,
}

#[derive(Debug, Clone, Copy)]
struct QueuedDraw {
    program: ProgramHandle,
    slot: u32,
    attribs: [BufferHandle; ATTRIB_SLOTS],
    index: BufferHandle,
    count: u32,
}

/// [`GpuContext`] backed by a wgpu device.
///
/// Binding calls update a CPU-side copy of the current state. `draw_elements`
/// validates it, snapshots the uniform block and queues the draw; nothing
/// reaches the GPU until [`WgpuContext::encode_frame`] or
/// [`WgpuContext::finish_frame`].
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_capacity: u64,
    depth_view: wgpu::TextureView,
    clear_color: wgpu::Color,
    programs: Vec<Program>,
    buffers: Vec<GpuBuffer>,
    current_program: Option<ProgramHandle>,
    current_block: UniformBlock,
    current_attribs: [Option<BufferHandle>; ATTRIB_SLOTS],
    current_index: Option<BufferHandle>,
    slots: Vec<UniformBlock>,
    draws: Vec<QueuedDraw>,
}

impl WgpuContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        device.on_uncaptured_error(Box::new(|error: wgpu::Error| {
            tracing::error!(%error, "uncaptured wgpu error");
        }));

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SLOT_SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let (uniform_buffer, uniform_bind_group) =
            Self::create_uniforms(&device, &bind_group_layout, INITIAL_SLOTS);
        let depth_view = Self::create_depth_texture(&device, width, height);

        Self {
            device,
            queue,
            surface_format,
            bind_group_layout,
            pipeline_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity: INITIAL_SLOTS,
            depth_view,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.15,
                a: 1.0,
            },
            programs: Vec::new(),
            buffers: Vec::new(),
            current_program: None,
            current_block: UniformBlock::default(),
            current_attribs: [None; ATTRIB_SLOTS],
            current_index: None,
            slots: Vec::new(),
            draws: Vec::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// Draws queued since the last flush.
    pub fn pending_draws(&self) -> usize {
        self.draws.len()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_view = Self::create_depth_texture(&self.device, width, height);
    }

    /// Record every queued draw into one render pass on `target` and reset
    /// the queue. Returns the number of draws encoded.
    pub fn encode_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) -> usize {
        self.ensure_uniform_capacity(self.slots.len() as u64);
        if !self.slots.is_empty() {
            self.queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&self.slots));
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
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
                ..Default::default()
            });

            for draw in &self.draws {
                let Some(program) = self.programs.get(draw.program.0 as usize) else {
                    continue;
                };
                let (Some(positions), Some(normals), Some(indices)) = (
                    self.buffers.get(draw.attribs[0].0 as usize),
                    self.buffers.get(draw.attribs[1].0 as usize),
                    self.buffers.get(draw.index.0 as usize),
                ) else {
                    continue;
                };
                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(
                    0,
                    &self.uniform_bind_group,
                    &[draw.slot * UNIFORM_SLOT_SIZE as u32],
                );
                pass.set_vertex_buffer(0, positions.buffer.slice(..));
                pass.set_vertex_buffer(1, normals.buffer.slice(..));
                pass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..draw.count, 0, 0..1);
            }
        }

        let drawn = self.draws.len();
        self.draws.clear();
        self.slots.clear();
        tracing::trace!(drawn, "frame encoded");
        drawn
    }

    /// Encode and submit the queued draws on their own command buffer.
    pub fn finish_frame(&mut self, target: &wgpu::TextureView) -> usize {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        let drawn = self.encode_frame(&mut encoder, target);
        self.queue.submit(std::iter::once(encoder.finish()));
        drawn
    }

    fn ensure_uniform_capacity(&mut self, slots: u64) {
        if slots <= self.uniform_capacity {
            return;
        }
        let capacity = slots.next_power_of_two();
        let (buffer, bind_group) =
            Self::create_uniforms(&self.device, &self.bind_group_layout, capacity);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
        tracing::debug!(capacity, "uniform buffer grown");
    }

    fn create_uniforms(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        slots: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: slots * UNIFORM_SLOT_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_SLOT_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn buffer(&self, handle: BufferHandle, usage: BufferUsage) -> Result<&GpuBuffer, GpuError> {
        self.buffers
            .get(handle.0 as usize)
            .filter(|b| b.usage == usage)
            .ok_or(GpuError::UnknownBuffer(handle))
    }

    fn push_buffer(&mut self, buffer: wgpu::Buffer, usage: BufferUsage, len: usize) -> BufferHandle {
        let handle = BufferHandle(self.buffers.len() as u32);
        self.buffers.push(GpuBuffer { buffer, usage, len });
        handle
    }
}

impl GpuContext for WgpuContext {
    fn create_program(
        &mut self,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, GpuError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: None,
                    compilation_options: Default::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: 3 * std::mem::size_of::<f32>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &POSITION_ATTRIBS,
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: 3 * std::mem::size_of::<f32>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &NORMAL_ATTRIBS,
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: None,
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::Compile {
                label: label.to_string(),
                message: error.to_string(),
            });
        }

        let handle = ProgramHandle(self.programs.len() as u32);
        self.programs.push(Program {
            label: label.to_string(),
            pipeline,
        });
        tracing::debug!(label, ?handle, "pipeline created");
        Ok(handle)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.programs.get(program.0 as usize)?;
        uniform_offset(name).map(UniformLocation)
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        self.programs.get(program.0 as usize)?;
        attrib_slot(name).map(AttribLocation)
    }

    fn create_float_buffer(&mut self, label: &str, data: &[f32]) -> BufferHandle {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.push_buffer(buffer, BufferUsage::Vertex, data.len())
    }

    fn create_index_buffer(&mut self, label: &str, data: &[u16]) -> BufferHandle {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.push_buffer(buffer, BufferUsage::Index, data.len())
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.current_program = Some(program);
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        if !self.current_block.set_mat4(location.0, value) {
            tracing::warn!(?location, "no mat4 uniform at offset");
        }
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        if !self.current_block.set_vec4(location.0, value) {
            tracing::warn!(?location, "no vec4 uniform at offset");
        }
    }

    fn bind_vertex_attrib(&mut self, attrib: AttribLocation, buffer: BufferHandle, components: u32) {
        if components != 3 {
            tracing::warn!(?attrib, components, "only 3-component attributes are supported");
            return;
        }
        match self.current_attribs.get_mut(attrib.0 as usize) {
            Some(slot) => *slot = Some(buffer),
            None => tracing::warn!(?attrib, "attribute slot out of range"),
        }
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) {
        self.current_index = buffer;
    }

    fn draw_elements(&mut self, count: u32) -> Result<(), GpuError> {
        let program = self.current_program.ok_or(GpuError::NoProgram)?;
        if self.programs.get(program.0 as usize).is_none() {
            return Err(GpuError::UnknownProgram(program));
        }
        let index = self.current_index.ok_or(GpuError::NoIndexBuffer)?;
        let available = self.buffer(index, BufferUsage::Index)?.len;
        if count as usize > available {
            return Err(GpuError::IndexRange {
                count,
                available: available as u32,
            });
        }

        let mut attribs = [BufferHandle(0); ATTRIB_SLOTS];
        for (slot, bound) in self.current_attribs.iter().enumerate() {
            let buffer = bound.ok_or(GpuError::MissingAttribute(AttribLocation(slot as u32)))?;
            self.buffer(buffer, BufferUsage::Vertex)?;
            attribs[slot] = buffer;
        }

        let slot = self.slots.len() as u32;
        self.slots.push(self.current_block);
        self.draws.push(QueuedDraw {
            program,
            slot,
            attribs,
            index,
            count,
        });
        tracing::trace!(
            program = %self.programs[program.0 as usize].label,
            count,
            slot,
            "draw queued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_fills_one_slot() {
        assert_eq!(std::mem::size_of::<UniformBlock>() as u64, UNIFORM_SLOT_SIZE);
    }

    #[test]
    fn offsets_address_block_fields() {
        let mut block = UniformBlock::default();
        let world = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let color = Vec4::new(0.25, 0.5, 0.75, 1.0);
        assert!(block.set_mat4(uniform_offset("w").unwrap(), &world));
        assert!(block.set_vec4(uniform_offset("m").unwrap(), color));

        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&block));
        let w = 128 / 4;
        assert_eq!(&floats[w..w + 16], &world.to_cols_array());
        let m = 192 / 4;
        assert_eq!(&floats[m..m + 4], &color.to_array());
    }

    #[test]
    fn unknown_names_and_offsets_are_rejected() {
        assert_eq!(uniform_offset("q"), None);
        assert_eq!(attrib_slot("T"), None);
        let mut block = UniformBlock::default();
        assert!(!block.set_mat4(192, &Mat4::IDENTITY));
        assert!(!block.set_vec4(0, Vec4::ONE));
        assert_eq!(block, UniformBlock::default());
    }

    #[test]
    fn basic_shader_names_resolve() {
        for name in ["p", "v", "w", "m"] {
            assert!(uniform_offset(name).is_some(), "{name}");
        }
        assert_eq!(attrib_slot("P"), Some(0));
        assert_eq!(attrib_slot("N"), Some(1));
        assert!(antler_render::shaders::BASIC_VERTEX_SHADER.contains("@location(1) N"));
    }
}
