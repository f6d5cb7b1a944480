//! Mutable per-entity state.
//!
//! The entity, its action flags and the display state derived from them. Only
//! the physics step, the entity action API and animation-finish callbacks
//! change these values.
mod common;
mod entity;
mod flags;
mod render;

pub use common::{Facing, ObjectId, Tick};
pub use entity::{Ability, Cooldowns, Entity};
pub use flags::ActionFlags;
pub use render::RenderState;
