//! Input: key-code snapshots mapped to movement and rotation directions.
//!
//! # Invariants
//! - The engine never polls devices; it consumes a snapshot of pressed keys
//!   once per tick.
//! - Opposing directions held together cancel on that axis.

mod bindings;
mod direction;
mod key;

pub use bindings::KeyBindings;
pub use direction::{Direction, DirectionFlags};
pub use key::{KeyCode, KeySnapshot};
