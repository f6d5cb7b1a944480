//! Read-only level geometry.
//!
//! The tile grid is fixed for a level and answers every point and rectangle
//! query the physics step needs. Nothing in this module holds mutable state.
mod error;
mod geometry;
mod grid;

pub use error::GridError;
pub use geometry::{HasHitBox, Rect, Side, Vec2};
pub use grid::{CONTACT_EPSILON, TileCode, TileGrid, WALL_TOUCH_TOLERANCE};
