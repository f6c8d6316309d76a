use crate::camera::RenderContext;
use crate::gpu::{BufferHandle, GpuContext, GpuError, ProgramHandle};
use antler_common::EntityId;
use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Handles of the uploaded geometry of one renderable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryBuffers {
    pub vertices: BufferHandle,
    pub indices: BufferHandle,
    pub normals: BufferHandle,
    /// Number of indices drawn per call.
    pub index_count: u32,
}

/// Read-only view of an entity handed to its material.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub id: EntityId,
    pub name: Option<&'a str>,
    pub world: Mat4,
    pub color: Vec4,
    pub geometry: &'a GeometryBuffers,
}

/// Construction parameters for concrete materials.
///
/// The transform engine never interprets these; each material decides what
/// it supports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialOptions {
    pub texture: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
    pub requires: Vec<String>,
}

/// Errors from preparing or rendering a material.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MaterialError {
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error("material {0:?} has no prepared program")]
    NotPrepared(String),
    #[error("material {material:?} program has no uniform {name:?}")]
    MissingUniform { material: String, name: String },
    #[error("material {material:?} program has no attribute {name:?}")]
    MissingAttribute { material: String, name: String },
}

/// A material binding: owns a program and knows how to draw an entity with it.
pub trait Material {
    fn name(&self) -> &str;

    /// Compile the program and resolve uniform and attribute locations once.
    fn prepare(&mut self, gpu: &mut dyn GpuContext) -> Result<ProgramHandle, MaterialError>;

    fn is_prepared(&self) -> bool;

    /// Bind the item's transform, colour and geometry against the camera and draw it.
    fn render(&self, item: &DrawItem<'_>, ctx: &mut RenderContext<'_>) -> Result<(), MaterialError>;
}

impl std::fmt::Debug for dyn Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name())
            .field("prepared", &self.is_prepared())
            .finish()
    }
}
