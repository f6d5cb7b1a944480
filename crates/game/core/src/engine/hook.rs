//! Side-effect hooks invoked by the simulation.
//!
//! Particles, audio, the message log and loot spawning live outside the core.
//! The simulation reports what should happen through [`Hooks`] and never reads
//! anything back, so a no-op implementation is always valid.

use strum::{AsRefStr, Display, EnumString};

use crate::env::{Side, Vec2};
use crate::objects::{ObjectKind, WorldObject};
use crate::state::ObjectId;

/// Particle effects the core asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ParticleKind {
    /// Dust kicked up by landing or jumping from the ground.
    Dust,
    /// Dust pushed off a wall on a wall jump.
    WallJumpDust,
    /// Burst from a jump pad launch.
    JumpPadDust,
    /// Splinters of a broken container or brick.
    Debris,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SoundId {
    Jump,
    Dash,
    Attack,
    Block,
    Spell,
    Transform,
    Hit,
    CrateBreak,
    JumpPad,
    GameOver,
}

/// Severity attached to log messages shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum LogSeverity {
    Information,
    Notification,
    Warning,
}

/// Collaborator interface for everything the core does not own.
///
/// All methods default to doing nothing.
pub trait Hooks {
    fn spawn_particles(&mut self, _kind: ParticleKind, _position: Vec2, _direction: Side) {}

    fn play_sound(&mut self, _sound: SoundId) {}

    fn notify_log(&mut self, _message: &str, _severity: LogSeverity) {}

    fn on_object_broken(&mut self, _object: &WorldObject) {}

    fn on_loot_generated(&mut self, _location: Vec2, _source: ObjectKind) {}
}

/// Hooks that ignore every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl Hooks for NoopHooks {}

/// One recorded hook call.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HookEvent {
    Particles {
        kind: ParticleKind,
        position: Vec2,
        direction: Side,
    },
    Sound(SoundId),
    Log {
        message: String,
        severity: LogSeverity,
    },
    ObjectBroken(ObjectId),
    LootGenerated {
        location: Vec2,
        source: ObjectKind,
    },
}

/// Hooks that keep every call in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingHooks {
    pub events: Vec<HookEvent>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&mut self) -> Vec<HookEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn sounds(&self) -> impl Iterator<Item = SoundId> + '_ {
        self.events.iter().filter_map(|e| match e {
            HookEvent::Sound(sound) => Some(*sound),
            _ => None,
        })
    }

    pub fn particles(&self) -> impl Iterator<Item = ParticleKind> + '_ {
        self.events.iter().filter_map(|e| match e {
            HookEvent::Particles { kind, .. } => Some(*kind),
            _ => None,
        })
    }
}

impl Hooks for RecordingHooks {
    fn spawn_particles(&mut self, kind: ParticleKind, position: Vec2, direction: Side) {
        self.events.push(HookEvent::Particles {
            kind,
            position,
            direction,
        });
    }

    fn play_sound(&mut self, sound: SoundId) {
        self.events.push(HookEvent::Sound(sound));
    }

    fn notify_log(&mut self, message: &str, severity: LogSeverity) {
        self.events.push(HookEvent::Log {
            message: message.to_owned(),
            severity,
        });
    }

    fn on_object_broken(&mut self, object: &WorldObject) {
        self.events.push(HookEvent::ObjectBroken(object.id));
    }

    fn on_loot_generated(&mut self, location: Vec2, source: ObjectKind) {
        self.events.push(HookEvent::LootGenerated { location, source });
    }
}
