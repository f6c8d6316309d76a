//! Rendering adapter: the contract between scene traversal and the GPU.
//!
//! # Invariants
//! - Rendering never mutates transform state; materials only read the draw item.
//! - Shared GPU binding state is the explicit [`GpuContext`] handed to every
//!   material call. Bindings do not persist across entities.
//! - The camera context is an explicit parameter of every render call.

mod basic;
mod camera;
mod gpu;
mod material;
mod recording;
pub mod shaders;

pub use basic::BasicMaterial;
pub use camera::{CameraContext, RenderContext};
pub use gpu::{AttribLocation, BufferHandle, GpuContext, GpuError, ProgramHandle, UniformLocation};
pub use material::{DrawItem, GeometryBuffers, Material, MaterialError, MaterialOptions};
pub use recording::{BufferKind, GpuCommand, RecordingGpu};

pub fn crate_info() -> &'static str {
    "antler-render v0.1.0"
}
