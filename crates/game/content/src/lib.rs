//! Data-driven content definitions and loaders.
//!
//! This crate turns level layouts (RON) and physics tuning (TOML) into the
//! types `platformer-core` simulates:
//! - Level layouts: tile grid, spawn point, stackable objects and props
//! - Physics tuning: [`platformer_core::PhysicsConfig`] overrides
//!
//! Content is read once per level and never changes while it runs.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, Level, LevelLoader, LoadResult};
