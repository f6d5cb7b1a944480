//! Deterministic movement, collision and interaction core of a 2D platformer.
//!
//! `platformer-core` answers tile-grid queries, moves one entity through a
//! level with gravity, walls, dashes and jumps, keeps stackable objects
//! settled and dispatches overlaps with interactable props. All per-tick
//! mutation flows through [`engine::Simulation::update`]; side effects leave
//! through the [`engine::Hooks`] trait.
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod interaction;
pub mod objects;
pub mod state;

pub use config::{ConfigError, PhysicsConfig};
pub use engine::{
    HookEvent, Hooks, InputIntent, InputParseError, Integrator, LogSeverity, NoopHooks,
    ParticleKind, RecordingHooks, Simulation, SoundId, StepReport, TickOutcome,
};
pub use env::{
    CONTACT_EPSILON, GridError, HasHitBox, Rect, Side, TileCode, TileGrid, Vec2,
    WALL_TOUCH_TOLERANCE,
};
pub use error::{ErrorSeverity, GameError};
pub use interaction::{
    DispatchReport, Interactable, InteractionClass, InteractionContext, IntersectionCall,
    IntersectionDispatcher, Prop, PropKind,
};
pub use objects::{ObjectKind, ObjectSet, WorldObject};
pub use state::{
    Ability, ActionFlags, Cooldowns, Entity, Facing, ObjectId, RenderState, Tick,
};
