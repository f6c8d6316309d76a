use crate::camera::RenderContext;
use crate::gpu::{AttribLocation, GpuContext, ProgramHandle, UniformLocation};
use crate::material::{DrawItem, Material, MaterialError, MaterialOptions};
use crate::shaders::{BASIC_FRAGMENT_SHADER, BASIC_VERTEX_SHADER};

#[derive(Debug, Clone, Copy)]
struct BasicBindings {
    program: ProgramHandle,
    projection: UniformLocation,
    view: UniformLocation,
    world: UniformLocation,
    color: UniformLocation,
    position: AttribLocation,
    normal: Option<AttribLocation>,
}

/// Flat-coloured, lit material.
///
/// Binds projection `p`, view `v`, world `w` and colour `m`, sources
/// positions from attribute `P` (and normals from `N` when the program has
/// it) and draws the entity's full index range.
#[derive(Debug, Default)]
pub struct BasicMaterial {
    options: MaterialOptions,
    bindings: Option<BasicBindings>,
}

impl BasicMaterial {
    pub const NAME: &'static str = "basic";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MaterialOptions) -> Self {
        if options.texture.is_some() || options.normal_map.is_some() {
            tracing::debug!(?options, "basic material ignores texture maps");
        }
        Self {
            options,
            bindings: None,
        }
    }

    pub fn options(&self) -> &MaterialOptions {
        &self.options
    }

    pub fn program(&self) -> Option<ProgramHandle> {
        self.bindings.map(|b| b.program)
    }

    fn uniform(
        gpu: &dyn GpuContext,
        program: ProgramHandle,
        name: &str,
    ) -> Result<UniformLocation, MaterialError> {
        gpu.uniform_location(program, name)
            .ok_or_else(|| MaterialError::MissingUniform {
                material: Self::NAME.to_string(),
                name: name.to_string(),
            })
    }
}

impl Material for BasicMaterial {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn prepare(&mut self, gpu: &mut dyn GpuContext) -> Result<ProgramHandle, MaterialError> {
        if let Some(bindings) = self.bindings {
            return Ok(bindings.program);
        }
        let program = gpu.create_program(Self::NAME, BASIC_VERTEX_SHADER, BASIC_FRAGMENT_SHADER)?;
        let position =
            gpu.attrib_location(program, "P")
                .ok_or_else(|| MaterialError::MissingAttribute {
                    material: Self::NAME.to_string(),
                    name: "P".to_string(),
                })?;
        let bindings = BasicBindings {
            program,
            projection: Self::uniform(gpu, program, "p")?,
            view: Self::uniform(gpu, program, "v")?,
            world: Self::uniform(gpu, program, "w")?,
            color: Self::uniform(gpu, program, "m")?,
            position,
            normal: gpu.attrib_location(program, "N"),
        };
        tracing::debug!(?program, "basic material prepared");
        self.bindings = Some(bindings);
        Ok(program)
    }

    fn is_prepared(&self) -> bool {
        self.bindings.is_some()
    }

    fn render(&self, item: &DrawItem<'_>, ctx: &mut RenderContext<'_>) -> Result<(), MaterialError> {
        let b = self
            .bindings
            .ok_or_else(|| MaterialError::NotPrepared(Self::NAME.to_string()))?;
        let gpu = &mut *ctx.gpu;

        gpu.use_program(b.program);
        gpu.set_uniform_mat4(b.projection, &ctx.camera.projection);
        gpu.set_uniform_mat4(b.view, &ctx.camera.view);
        gpu.set_uniform_mat4(b.world, &item.world);
        gpu.set_uniform_vec4(b.color, item.color);

        gpu.bind_vertex_attrib(b.position, item.geometry.vertices, 3);
        if let Some(normal) = b.normal {
            gpu.bind_vertex_attrib(normal, item.geometry.normals, 3);
        }

        gpu.bind_index_buffer(Some(item.geometry.indices));
        let drawn = gpu.draw_elements(item.geometry.index_count);
        gpu.bind_index_buffer(None);
        drawn?;

        tracing::trace!(id = %item.id, count = item.geometry.index_count, "basic draw");
        Ok(())
    }
}
