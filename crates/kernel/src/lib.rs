//! Scene kernel: entities with orthonormal bases, hierarchical world
//! transforms, fixed-step input integration, and the update/render traversal.
//!
//! # Invariants
//! - Every entity basis is orthonormal after any orientation change; only
//!   `forward` is trusted and `right`/`up` are rebuilt from it.
//! - The scene is a strict tree; attaching an entity twice or creating a
//!   cycle is rejected.
//! - `update` derives world transforms top-down; `render` only reads them.

pub mod config;
pub mod entity;
pub mod geometry;
pub mod scene;

pub use config::{ConfigError, EngineConfig, FrameConfig, MovementConfig};
pub use entity::{
    DEFAULT_LOOK_AT, DEFAULT_MOVE_SPEED, DEFAULT_ROTATE_SPEED, Entity, EntityBuilder, EntityError,
    Payload, Renderable, WORLD_UP,
};
pub use geometry::{GeometryError, Mesh};
pub use scene::{RenderStats, Scene, SceneError};
