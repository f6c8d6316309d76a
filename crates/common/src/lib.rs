//! Shared types for the antler scene engine: the vector/matrix kernel,
//! hex colour parsing, and entity identifiers.
//!
//! # Invariants
//! - Math functions are total: degenerate input yields zero vectors or
//!   zero angles, never NaN.

pub mod color;
pub mod math;
mod types;

pub use color::{Color, ColorError};
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use types::EntityId;
