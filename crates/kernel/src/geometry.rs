//! Decoded mesh arrays and their one-time validation and upload.

use antler_render::{GeometryBuffers, GpuContext};
use glam::{Vec2, Vec3};

/// Errors from validating mesh arrays.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("mesh has no vertices")]
    Empty,
    #[error("{what} array of length {len} is not a whole number of components")]
    Ragged { what: &'static str, len: usize },
    #[error("mesh has {vertices} vertices but {normals} normals")]
    NormalCount { vertices: usize, normals: usize },
    #[error("mesh has {vertices} vertices but {uvs} uvs")]
    UvCount { vertices: usize, uvs: usize },
    #[error("index count {0} is not a non-zero multiple of 3")]
    IndexCount(usize),
    #[error("index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u16, vertices: usize },
    #[error("{0} vertices cannot be addressed by 16-bit indices")]
    TooManyVertices(usize),
}

/// Already-decoded triangle mesh: positions, 16-bit indices, normals and
/// optional texture coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u16>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u16>, normals: Vec<Vec3>) -> Self {
        Self {
            vertices,
            indices,
            normals,
            uvs: Vec::new(),
        }
    }

    /// Build from flat component arrays as produced by model loaders.
    pub fn from_flat(
        positions: &[f32],
        indices: &[u16],
        normals: &[f32],
        uvs: &[f32],
    ) -> Result<Self, GeometryError> {
        Ok(Self {
            vertices: chunk3("vertex", positions)?,
            indices: indices.to_vec(),
            normals: chunk3("normal", normals)?,
            uvs: chunk2(uvs)?,
        })
    }

    /// Axis-aligned cube of edge `size` centred on the origin, one normal per face.
    pub fn cube(size: f32) -> Self {
        let p = size * 0.5;
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];
        let mut mesh = Self::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u16;
            let center = normal * p;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                mesh.vertices.push(center + u * (su * p) + v * (sv * p));
                mesh.normals.push(normal);
                mesh.uvs.push(Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Check that the arrays describe a drawable indexed triangle list.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let vertices = self.vertices.len();
        if vertices == 0 {
            return Err(GeometryError::Empty);
        }
        if vertices > usize::from(u16::MAX) + 1 {
            return Err(GeometryError::TooManyVertices(vertices));
        }
        if self.normals.len() != vertices {
            return Err(GeometryError::NormalCount {
                vertices,
                normals: self.normals.len(),
            });
        }
        if !self.uvs.is_empty() && self.uvs.len() != vertices {
            return Err(GeometryError::UvCount {
                vertices,
                uvs: self.uvs.len(),
            });
        }
        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(GeometryError::IndexCount(self.indices.len()));
        }
        if let Some(&index) = self.indices.iter().find(|&&i| usize::from(i) >= vertices) {
            return Err(GeometryError::IndexOutOfRange { index, vertices });
        }
        Ok(())
    }

    /// Validate, then create the vertex, index and normal buffers.
    pub fn upload(&self, gpu: &mut dyn GpuContext) -> Result<GeometryBuffers, GeometryError> {
        self.validate()?;
        let positions: Vec<f32> = self.vertices.iter().flat_map(|v| v.to_array()).collect();
        let normals: Vec<f32> = self.normals.iter().flat_map(|n| n.to_array()).collect();
        let buffers = GeometryBuffers {
            vertices: gpu.create_float_buffer("vertices", &positions),
            indices: gpu.create_index_buffer("indices", &self.indices),
            normals: gpu.create_float_buffer("normals", &normals),
            index_count: self.indices.len() as u32,
        };
        tracing::debug!(
            vertices = self.vertices.len(),
            indices = self.indices.len(),
            "mesh uploaded"
        );
        Ok(buffers)
    }
}

fn chunk3(what: &'static str, data: &[f32]) -> Result<Vec<Vec3>, GeometryError> {
    if data.len() % 3 != 0 {
        return Err(GeometryError::Ragged {
            what,
            len: data.len(),
        });
    }
    Ok(data
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

fn chunk2(data: &[f32]) -> Result<Vec<Vec2>, GeometryError> {
    if data.len() % 2 != 0 {
        return Err(GeometryError::Ragged {
            what: "uv",
            len: data.len(),
        });
    }
    Ok(data.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect())
}
