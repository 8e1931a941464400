//! Small helpers shared across modules.

pub mod color;
pub mod id;

pub use color::{PALETTE, color_for_name};
pub use id::{ID_LENGTH, generate_id, generate_unique_id};
