//! wgpu render backend.
//!
//! [`WgpuContext`] implements the bind-then-draw [`antler_render::GpuContext`]
//! on top of wgpu: materials bind programs, uniforms and buffers as usual,
//! and each draw is queued with a snapshot of the uniform block. The queue is
//! flushed into a single render pass by [`WgpuContext::finish_frame`].
//!
//! # Invariants
//! - Uniforms live in one fixed block (`p`, `v`, `w`, `m`) addressed by byte
//!   offset; every draw owns its own 256-byte slot of it.
//! - Shader compile and pipeline errors are reported as
//!   [`antler_render::GpuError::Compile`], never as a panic.

mod camera;
mod gpu;

pub use camera::Projection;
pub use gpu::{UNIFORM_SLOT_SIZE, UniformBlock, WgpuContext, uniform_offset};
