//! Interactable props and the single-active-intersection dispatcher.
//!
//! Props never collide; they only react to the entity overlapping them. The
//! dispatcher picks at most one of them per tick, hazards first, and sequences
//! the enter/stay/exit callbacks.
mod dispatcher;
mod props;

pub use dispatcher::{DispatchReport, Interactable, IntersectionCall, IntersectionDispatcher};
pub use props::{Prop, PropKind};

use crate::engine::Hooks;
use crate::state::Entity;

/// Dispatch priority. Lower classes win when several props overlap the
/// entity, so instant death always beats a shop prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InteractionClass {
    /// Spikes and lava.
    Hazard,
    /// Jump pads.
    Launcher,
    /// Shop, blacksmith, save totem.
    Service,
    /// Loot, herbs, potions.
    Pickup,
    /// Tables, boards, dogs, NPCs.
    Social,
}

/// What an interactable may touch while handling a callback.
pub struct InteractionContext<'a> {
    pub entity: &'a mut Entity,
    pub hooks: &'a mut dyn Hooks,
}
