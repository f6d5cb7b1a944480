//! Breaking objects and releasing whatever rested on them.

use tracing::debug;

use super::ObjectSet;
use crate::engine::{Hooks, LogSeverity, ParticleKind, SoundId};
use crate::env::{CONTACT_EPSILON, Rect, Side, Vec2};
use crate::state::ObjectId;

impl ObjectSet {
    /// Starts the break animation of a solid object.
    ///
    /// The object stops colliding at once, announces itself through `hooks`
    /// (containers also drop loot just above their centre) and every object
    /// resting on it, directly or through a stack, is released so the next
    /// settle pass lets it fall. Returns false when the object is unknown or
    /// already breaking.
    pub fn break_object(&mut self, id: ObjectId, hooks: &mut dyn Hooks) -> bool {
        let Some(object) = self.objects.iter_mut().find(|o| o.id == id && o.is_solid()) else {
            return false;
        };
        object.animating = true;

        let object = object.clone();
        let hb = object.hit_box;
        hooks.play_sound(SoundId::CrateBreak);
        hooks.spawn_particles(ParticleKind::Debris, hb.center(), Side::Right);
        hooks.notify_log(&format!("{} destroyed", object.kind), LogSeverity::Information);
        hooks.on_object_broken(&object);
        if object.kind.drops_loot() {
            let location = Vec2::new(hb.x + hb.width / 2.0, hb.y - hb.height / 4.0);
            hooks.on_loot_generated(location, object.kind);
        }

        let released = self.release_supported(hb);
        debug!(id = %id, kind = %object.kind, released, "object broken");
        true
    }

    /// Animation-finish callback for a broken object.
    pub fn finish_break(&mut self, id: ObjectId) {
        if let Some(object) = self.get_mut(id) {
            object.alive = false;
            object.animating = false;
        }
    }

    /// Breaks every solid object overlapping `area`, typically an attack box.
    pub fn break_in(&mut self, area: &Rect, hooks: &mut dyn Hooks) -> Vec<ObjectId> {
        let hits: Vec<ObjectId> = self
            .solid()
            .filter(|o| o.hit_box.intersects(area))
            .map(|o| o.id)
            .collect();
        let mut broken = Vec::with_capacity(hits.len());
        for id in hits {
            if self.break_object(id, hooks) {
                broken.push(id);
            }
        }
        broken
    }

    /// Clears `on_ground` of every object resting on `support`, then of every
    /// object resting on those, and so on.
    fn release_supported(&mut self, support: Rect) -> usize {
        let mut pending = vec![support];
        let mut released = 0;
        while let Some(below) = pending.pop() {
            for object in self.objects.iter_mut().filter(|o| o.is_solid() && o.on_ground) {
                let hb = object.hit_box;
                let resting = hb.overlaps_horizontally(&below)
                    && (below.y - hb.bottom()).abs() <= 2.0 * CONTACT_EPSILON;
                if resting {
                    object.on_ground = false;
                    pending.push(hb);
                    released += 1;
                }
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::engine::{HookEvent, RecordingHooks};
    use crate::env::TileGrid;
    use crate::objects::{ObjectKind, WorldObject};

    fn stacked() -> ObjectSet {
        let mut grid = TileGrid::empty(10, 8, 32.0).unwrap();
        for col in 0..10 {
            grid = grid.with_tile(col, 7, 0);
        }
        let mut objects = ObjectSet::new(vec![
            WorldObject::new(ObjectId(1), ObjectKind::Container, Rect::new(40.0, 0.0, 30.0, 30.0)),
            WorldObject::new(ObjectId(2), ObjectKind::Brick, Rect::new(40.0, 40.0, 30.0, 30.0)),
            WorldObject::new(ObjectId(3), ObjectKind::Container, Rect::new(40.0, 80.0, 30.0, 30.0)),
        ]);
        objects.settle(&grid, &PhysicsConfig::default());
        objects
    }

    #[test]
    fn breaking_reports_through_hooks() {
        let mut objects = stacked();
        let mut hooks = RecordingHooks::new();
        assert!(objects.break_object(ObjectId(3), &mut hooks));

        let broken = objects.get(ObjectId(3)).unwrap();
        assert!(broken.animating && broken.alive && !broken.is_solid());
        assert!(hooks.events.contains(&HookEvent::ObjectBroken(ObjectId(3))));
        assert!(hooks.sounds().any(|s| s == SoundId::CrateBreak));
        assert!(
            hooks
                .events
                .iter()
                .any(|e| matches!(e, HookEvent::LootGenerated { source: ObjectKind::Container, .. }))
        );

        // A second break of the same object is ignored.
        assert!(!objects.break_object(ObjectId(3), &mut hooks));
    }

    #[test]
    fn bricks_drop_no_loot() {
        let mut objects = stacked();
        let mut hooks = RecordingHooks::new();
        objects.break_object(ObjectId(2), &mut hooks);
        assert!(
            !hooks
                .events
                .iter()
                .any(|e| matches!(e, HookEvent::LootGenerated { .. }))
        );
    }

    #[test]
    fn breaking_the_base_releases_the_whole_stack() {
        let mut objects = stacked();
        assert!(objects.iter().all(|o| o.on_ground));

        objects.break_object(ObjectId(3), &mut RecordingHooks::new());
        assert!(!objects.get(ObjectId(2)).unwrap().on_ground);
        assert!(!objects.get(ObjectId(1)).unwrap().on_ground);
    }

    #[test]
    fn finish_break_kills_object() {
        let mut objects = stacked();
        objects.break_object(ObjectId(1), &mut RecordingHooks::new());
        objects.finish_break(ObjectId(1));
        let object = objects.get(ObjectId(1)).unwrap();
        assert!(!object.alive && !object.animating);
        assert!(objects.get(ObjectId(2)).unwrap().on_ground);
    }

    #[test]
    fn break_in_hits_overlapping_objects_only() {
        let mut objects = stacked();
        let top = objects.get(ObjectId(1)).unwrap().hit_box;
        let area = Rect::new(top.x + 5.0, top.y + 5.0, 10.0, 10.0);
        let broken = objects.break_in(&area, &mut RecordingHooks::new());
        assert_eq!(broken, vec![ObjectId(1)]);
    }
}
