use glam::{Mat4, Vec4};

/// A compiled and linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

/// A GPU buffer holding vertex floats or `u16` indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

/// A resolved uniform slot inside a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// A resolved vertex attribute slot inside a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttribLocation(pub u32);

/// Errors reported by a GPU backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GpuError {
    #[error("shader program {label:?} failed to compile: {message}")]
    Compile { label: String, message: String },
    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramHandle),
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferHandle),
    #[error("draw issued with no program bound")]
    NoProgram,
    #[error("draw issued with no index buffer bound")]
    NoIndexBuffer,
    #[error("draw of {count} indices exceeds bound index buffer of {available}")]
    IndexRange { count: u32, available: u32 },
    #[error("vertex attribute {0:?} has no buffer bound")]
    MissingAttribute(AttribLocation),
}

/// Shared, mutable GPU binding state.
///
/// Modelled on a bind-then-draw API: a material selects a program, sets
/// uniforms, binds buffers and finally issues a draw. Bindings made for one
/// entity must not be assumed to survive into the next material call.
pub trait GpuContext {
    /// Compile and link a program from vertex and fragment source.
    fn create_program(
        &mut self,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, GpuError>;

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation>;

    fn create_float_buffer(&mut self, label: &str, data: &[f32]) -> BufferHandle;

    fn create_index_buffer(&mut self, label: &str, data: &[u16]) -> BufferHandle;

    fn use_program(&mut self, program: ProgramHandle);

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4);

    /// Source `attrib` from `buffer`, `components` floats per vertex.
    fn bind_vertex_attrib(&mut self, attrib: AttribLocation, buffer: BufferHandle, components: u32);

    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>);

    /// Draw `count` indexed triangles' worth of indices from the bound index buffer.
    fn draw_elements(&mut self, count: u32) -> Result<(), GpuError>;
}
