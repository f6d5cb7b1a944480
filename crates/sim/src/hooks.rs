//! Hook sink that forwards every side effect to `tracing`.

use platformer_core::{
    Hooks, LogSeverity, ObjectKind, ParticleKind, Side, SoundId, Vec2, WorldObject,
};
use tracing::{debug, info, trace, warn};

/// Counts and logs hook calls. The counters feed the end-of-run summary.
#[derive(Clone, Debug, Default)]
pub struct TracingHooks {
    pub sounds: u32,
    pub particles: u32,
    pub broken: u32,
    pub loot: u32,
}

impl Hooks for TracingHooks {
    fn spawn_particles(&mut self, kind: ParticleKind, position: Vec2, direction: Side) {
        self.particles += 1;
        trace!(%kind, x = position.x, y = position.y, %direction, "particles");
    }

    fn play_sound(&mut self, sound: SoundId) {
        self.sounds += 1;
        debug!(%sound, "sound");
    }

    fn notify_log(&mut self, message: &str, severity: LogSeverity) {
        match severity {
            LogSeverity::Warning => warn!("{}", message),
            LogSeverity::Notification | LogSeverity::Information => info!("{}", message),
        }
    }

    fn on_object_broken(&mut self, object: &WorldObject) {
        self.broken += 1;
        debug!(id = %object.id, kind = %object.kind, "object broken");
    }

    fn on_loot_generated(&mut self, location: Vec2, source: ObjectKind) {
        self.loot += 1;
        info!(%source, x = location.x, y = location.y, "loot dropped");
    }
}
