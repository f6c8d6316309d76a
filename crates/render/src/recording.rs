use crate::gpu::{
    AttribLocation, BufferHandle, GpuContext, GpuError, ProgramHandle, UniformLocation,
};
use glam::{Mat4, Vec4};

/// What a recorded buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Float,
    Index,
}

/// One call made against a [`RecordingGpu`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CreateProgram {
        program: ProgramHandle,
        label: String,
    },
    CreateBuffer {
        buffer: BufferHandle,
        kind: BufferKind,
        len: usize,
    },
    UseProgram(ProgramHandle),
    UniformMat4 {
        location: UniformLocation,
        value: Mat4,
    },
    UniformVec4 {
        location: UniformLocation,
        value: Vec4,
    },
    BindVertexAttrib {
        attrib: AttribLocation,
        buffer: BufferHandle,
        components: u32,
    },
    BindIndexBuffer(Option<BufferHandle>),
    DrawElements {
        program: ProgramHandle,
        count: u32,
    },
}

#[derive(Debug, Clone)]
struct RecordedProgram {
    identifiers: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct RecordedBuffer {
    kind: BufferKind,
    len: usize,
}

/// In-memory GPU backend that records every call.
///
/// Uniform and attribute names resolve when they occur as an identifier in
/// the program source. Draws are validated against the current bindings the
/// way a strict driver would.
#[derive(Debug, Default)]
pub struct RecordingGpu {
    commands: Vec<GpuCommand>,
    programs: Vec<RecordedProgram>,
    buffers: Vec<RecordedBuffer>,
    fail_next_compile: Option<String>,
    current_program: Option<ProgramHandle>,
    current_index: Option<BufferHandle>,
}

impl RecordingGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_program` call fail with `message`.
    pub fn fail_next_compile(&mut self, message: impl Into<String>) {
        self.fail_next_compile = Some(message.into());
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Drain and return the command log.
    pub fn drain_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::DrawElements { .. }))
            .count()
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn uniform_or_attrib(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let recorded = self.programs.get(program.0 as usize)?;
        recorded
            .identifiers
            .iter()
            .position(|ident| ident == name)
            .map(|i| i as u32)
    }

    fn push_buffer(&mut self, kind: BufferKind, len: usize) -> BufferHandle {
        let buffer = BufferHandle(self.buffers.len() as u32);
        self.buffers.push(RecordedBuffer { kind, len });
        self.commands.push(GpuCommand::CreateBuffer { buffer, kind, len });
        buffer
    }
}

/// Distinct identifiers of both stages, in first-seen order.
fn identifiers(sources: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for source in sources {
        for word in source.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
            if !word.is_empty() && !out.iter().any(|w| w == word) {
                out.push(word.to_string());
            }
        }
    }
    out
}

impl GpuContext for RecordingGpu {
    fn create_program(
        &mut self,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, GpuError> {
        if let Some(message) = self.fail_next_compile.take() {
            return Err(GpuError::Compile {
                label: label.to_string(),
                message,
            });
        }
        if !vertex_source.contains("@vertex") {
            return Err(GpuError::Compile {
                label: label.to_string(),
                message: "vertex source has no @vertex entry point".into(),
            });
        }
        if !fragment_source.contains("@fragment") {
            return Err(GpuError::Compile {
                label: label.to_string(),
                message: "fragment source has no @fragment entry point".into(),
            });
        }
        let program = ProgramHandle(self.programs.len() as u32);
        self.programs.push(RecordedProgram {
            identifiers: identifiers(&[vertex_source, fragment_source]),
        });
        self.commands.push(GpuCommand::CreateProgram {
            program,
            label: label.to_string(),
        });
        Ok(program)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.uniform_or_attrib(program, name).map(UniformLocation)
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        self.uniform_or_attrib(program, name).map(AttribLocation)
    }

    fn create_float_buffer(&mut self, _label: &str, data: &[f32]) -> BufferHandle {
        self.push_buffer(BufferKind::Float, data.len())
    }

    fn create_index_buffer(&mut self, _label: &str, data: &[u16]) -> BufferHandle {
        self.push_buffer(BufferKind::Index, data.len())
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.current_program = Some(program);
        self.commands.push(GpuCommand::UseProgram(program));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.commands.push(GpuCommand::UniformMat4 {
            location,
            value: *value,
        });
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        self.commands.push(GpuCommand::UniformVec4 { location, value });
    }

    fn bind_vertex_attrib(&mut self, attrib: AttribLocation, buffer: BufferHandle, components: u32) {
        self.commands.push(GpuCommand::BindVertexAttrib {
            attrib,
            buffer,
            components,
        });
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) {
        self.current_index = buffer;
        self.commands.push(GpuCommand::BindIndexBuffer(buffer));
    }

    fn draw_elements(&mut self, count: u32) -> Result<(), GpuError> {
        let program = self.current_program.ok_or(GpuError::NoProgram)?;
        let index = self.current_index.ok_or(GpuError::NoIndexBuffer)?;
        let recorded = self
            .buffers
            .get(index.0 as usize)
            .copied()
            .ok_or(GpuError::UnknownBuffer(index))?;
        if recorded.kind != BufferKind::Index {
            return Err(GpuError::UnknownBuffer(index));
        }
        if count as usize > recorded.len {
            return Err(GpuError::IndexRange {
                count,
                available: recorded.len as u32,
            });
        }
        self.commands.push(GpuCommand::DrawElements { program, count });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "@vertex fn vs_main(@location(0) P: vec3<f32>) {}";
    const FS: &str = "var<uniform> m: vec4<f32>; @fragment fn fs_main() {}";

    #[test]
    fn resolves_identifiers_from_source() {
        let mut gpu = RecordingGpu::new();
        let program = gpu.create_program("test", VS, FS).unwrap();
        assert!(gpu.attrib_location(program, "P").is_some());
        assert!(gpu.uniform_location(program, "m").is_some());
        assert!(gpu.uniform_location(program, "missing").is_none());
    }

    #[test]
    fn forced_compile_failure_is_one_shot() {
        let mut gpu = RecordingGpu::new();
        gpu.fail_next_compile("syntax error");
        let err = gpu.create_program("broken", VS, FS).unwrap_err();
        assert!(matches!(err, GpuError::Compile { .. }));
        assert!(gpu.create_program("ok", VS, FS).is_ok());
        assert_eq!(gpu.program_count(), 1);
    }

    #[test]
    fn missing_entry_point_fails_compile() {
        let mut gpu = RecordingGpu::new();
        assert!(gpu.create_program("no-vs", FS, FS).is_err());
        assert!(gpu.create_program("no-fs", VS, VS).is_err());
    }

    #[test]
    fn draw_requires_program_and_index_buffer() {
        let mut gpu = RecordingGpu::new();
        assert_eq!(gpu.draw_elements(3), Err(GpuError::NoProgram));

        let program = gpu.create_program("test", VS, FS).unwrap();
        gpu.use_program(program);
        assert_eq!(gpu.draw_elements(3), Err(GpuError::NoIndexBuffer));

        let indices = gpu.create_index_buffer("indices", &[0, 1, 2]);
        gpu.bind_index_buffer(Some(indices));
        assert!(gpu.draw_elements(3).is_ok());
        assert_eq!(
            gpu.draw_elements(6),
            Err(GpuError::IndexRange {
                count: 6,
                available: 3
            })
        );
        assert_eq!(gpu.draw_count(), 1);
    }

    #[test]
    fn float_buffer_cannot_back_a_draw() {
        let mut gpu = RecordingGpu::new();
        let program = gpu.create_program("test", VS, FS).unwrap();
        let floats = gpu.create_float_buffer("vertices", &[0.0; 9]);
        gpu.use_program(program);
        gpu.bind_index_buffer(Some(floats));
        assert_eq!(gpu.draw_elements(3), Err(GpuError::UnknownBuffer(floats)));
    }

    #[test]
    fn drain_commands_clears_log() {
        let mut gpu = RecordingGpu::new();
        gpu.create_float_buffer("a", &[1.0]);
        assert_eq!(gpu.drain_commands().len(), 1);
        assert!(gpu.commands().is_empty());
        assert_eq!(gpu.buffer_count(), 1);
    }
}
