//! Developer tooling: read-only scene inspection for the CLI and viewer.
//!
//! # Invariants
//! - Inspection never mutates the scene.

mod inspector;

pub use inspector::{EntityInfo, SceneInspector, SceneSummary, basis_error};
