//! Horizontal movement against stackable objects.

use tracing::trace;

use super::{ObjectSet, WorldObject};
use crate::config::PhysicsConfig;
use crate::env::{CONTACT_EPSILON, Rect, Side, TileGrid};

impl ObjectSet {
    /// Corner points used for side-touch detection. The lower pair is raised
    /// by `inset` so an object the mover stands on never counts as a side hit.
    fn side_points(rect: &Rect, inset: f64) -> [(f64, f64); 4] {
        let low = rect.bottom() - inset;
        [
            (rect.x, rect.y),
            (rect.right(), rect.y),
            (rect.x, low),
            (rect.right(), low),
        ]
    }

    /// True when any side point of `rect` lies inside `object`.
    fn side_touches(object: &WorldObject, rect: &Rect, inset: f64) -> bool {
        Self::side_points(rect, inset)
            .iter()
            .any(|&(px, py)| object.hit_box.contains(px, py))
    }

    /// Nearest solid object the mover would run into when moving by `dx`.
    pub fn side_blocker(&self, mover: &Rect, dx: f64, config: &PhysicsConfig) -> Option<&WorldObject> {
        let side = Side::of_delta(dx)?;
        let probe = mover.translated(dx + side.sign() * CONTACT_EPSILON, 0.0);

        self.solid()
            .filter(|o| match side {
                Side::Right => o.hit_box.x > mover.x,
                Side::Left => o.hit_box.x < mover.x,
            })
            .filter(|o| Self::side_touches(o, &probe, config.side_touch_inset))
            .min_by(|a, b| {
                Self::flush_gap(mover, a, side).total_cmp(&Self::flush_gap(mover, b, side))
            })
    }

    /// Distance the mover can travel toward `object` before resting flush
    /// against it.
    fn flush_gap(mover: &Rect, object: &WorldObject, side: Side) -> f64 {
        let gap = match side {
            Side::Right => object.hit_box.x - mover.right() - CONTACT_EPSILON,
            Side::Left => mover.x - object.hit_box.right(),
        };
        gap.max(0.0)
    }

    /// The object the mover is standing on, if any.
    ///
    /// Two probes just below the mover's feet, pulled in from the corners,
    /// must fall inside the object's top edge.
    pub fn standing_on(&self, mover: &Rect, config: &PhysicsConfig) -> Option<&WorldObject> {
        let py = mover.bottom() + config.top_touch_probe;
        let left = mover.x + config.top_touch_inset;
        let right = mover.right() - config.top_touch_inset;
        self.solid()
            .find(|o| o.hit_box.contains(left, py) || o.hit_box.contains(right, py))
    }

    pub fn is_top_touching(&self, mover: &Rect, config: &PhysicsConfig) -> bool {
        self.standing_on(mover, config).is_some()
    }

    /// True when a solid object overlaps one of the mover's side points without
    /// any movement, i.e. the mover is stuck inside it.
    pub fn is_embedded(&self, mover: &Rect, config: &PhysicsConfig) -> bool {
        self.solid()
            .any(|o| Self::side_touches(o, mover, config.side_touch_inset))
    }

    /// Adjusts an intended horizontal displacement so the mover respects
    /// stackable objects.
    ///
    /// - Running into an object while standing on another one clamps the mover
    ///   flush against the object's near edge.
    /// - Running into an object otherwise advances by at most
    ///   `config.object_step` per tick, stopping flush.
    /// - Walking on top of objects with nothing ahead also advances by at most
    ///   `config.object_step`.
    ///
    /// Every adjusted step is checked against the tile grid; a step the grid
    /// rejects becomes zero. With no object involved `dx` is returned as is.
    pub fn resolve_horizontal(
        &self,
        mover: &Rect,
        dx: f64,
        grid: &TileGrid,
        config: &PhysicsConfig,
    ) -> f64 {
        let Some(side) = Side::of_delta(dx) else {
            return 0.0;
        };
        let standing = self.is_top_touching(mover, config);
        let blocker = self.side_blocker(mover, dx, config);

        let step = match (blocker, standing) {
            (Some(object), true) => {
                let target = match side {
                    Side::Right => object.hit_box.x - mover.width - CONTACT_EPSILON,
                    Side::Left => object.hit_box.right(),
                };
                target - mover.x
            }
            (Some(object), false) => {
                side.sign() * dx.abs().min(config.object_step).min(Self::flush_gap(mover, object, side))
            }
            (None, true) => side.sign() * dx.abs().min(config.object_step),
            (None, false) => return dx,
        };

        trace!(dx, step, standing, blocked = blocker.is_some(), "object resolution");
        if step != 0.0 && grid.can_move_to(mover.x + step, mover.y, mover.width, mover.height) {
            step
        } else {
            0.0
        }
    }

    /// Top of the highest solid object the mover lands on when falling by `dy`.
    pub fn landing_surface(&self, mover: &Rect, dy: f64) -> Option<f64> {
        if dy <= 0.0 {
            return None;
        }
        let reach = mover.bottom() + dy + CONTACT_EPSILON;
        self.solid()
            .filter(|o| o.hit_box.overlaps_horizontally(mover))
            .map(|o| o.hit_box.y)
            .filter(|&top| top >= mover.bottom() && top <= reach)
            .min_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectKind;
    use crate::state::ObjectId;

    const FLOOR: f64 = 160.0;

    fn grid() -> TileGrid {
        let mut grid = TileGrid::empty(10, 6, 32.0).unwrap();
        for col in 0..10 {
            grid = grid.with_tile(col, 5, 0);
        }
        grid
    }

    fn crate_at(id: u32, x: f64, y: f64) -> WorldObject {
        WorldObject::new(ObjectId(id), ObjectKind::Container, Rect::new(x, y, 30.0, 30.0))
    }

    fn standing_mover(x: f64) -> Rect {
        Rect::new(x, FLOOR - 44.0 - CONTACT_EPSILON, 15.0, 44.0)
    }

    #[test]
    fn free_movement_is_untouched() {
        let objects = ObjectSet::new(vec![crate_at(1, 200.0, FLOOR - 31.0)]);
        let config = PhysicsConfig::default();
        let dx = objects.resolve_horizontal(&standing_mover(40.0), 0.55, &grid(), &config);
        assert_eq!(dx, 0.55);
    }

    #[test]
    fn approach_soft_stops_flush() {
        let config = PhysicsConfig::default();
        let grid = grid();
        let objects = ObjectSet::new(vec![crate_at(1, 100.0, FLOOR - 31.0)]);

        // Far from the crate a dash passes untouched.
        let mover = standing_mover(100.0 - 15.0 - 20.0);
        let step = objects.resolve_horizontal(&mover, 3.3, &grid, &config);
        assert_eq!(step, 3.3);

        let close = standing_mover(100.0 - 15.0 - CONTACT_EPSILON - 0.5);
        let step = objects.resolve_horizontal(&close, 3.3, &grid, &config);
        assert_eq!(step, 0.5);

        let flush = close.translated(step, 0.0);
        assert_eq!(objects.resolve_horizontal(&flush, 0.55, &grid, &config), 0.0);
        assert!(!flush.intersects(&objects.iter().next().unwrap().hit_box));
    }

    #[test]
    fn object_step_caps_blocked_speed() {
        let config = PhysicsConfig::default();
        let objects = ObjectSet::new(vec![crate_at(1, 100.0, FLOOR - 31.0)]);
        let mover = standing_mover(100.0 - 15.0 - CONTACT_EPSILON - 2.5);
        let step = objects.resolve_horizontal(&mover, 3.3, &grid(), &config);
        assert_eq!(step, config.object_step);
    }

    #[test]
    fn moving_away_is_not_blocked() {
        let config = PhysicsConfig::default();
        let objects = ObjectSet::new(vec![crate_at(1, 100.0, FLOOR - 31.0)]);
        let flush = standing_mover(100.0 - 15.0 - CONTACT_EPSILON);
        assert_eq!(objects.resolve_horizontal(&flush, -0.55, &grid(), &config), -0.55);
    }

    #[test]
    fn standing_on_object_clamps_to_neighbour() {
        let config = PhysicsConfig::default();
        let low = crate_at(1, 40.0, FLOOR - 31.0);
        let top = low.hit_box.y;
        // Taller neighbour on the right.
        let wall = WorldObject::new(
            ObjectId(2),
            ObjectKind::Brick,
            Rect::new(80.0, FLOOR - 91.0, 30.0, 90.0),
        );
        let objects = ObjectSet::new(vec![low, wall]);
        let mover = Rect::new(62.0, top - 44.0 - CONTACT_EPSILON, 15.0, 44.0);
        assert!(objects.is_top_touching(&mover, &config));

        let step = objects.resolve_horizontal(&mover, 3.3, &grid(), &config);
        assert_eq!(mover.x + step, 80.0 - 15.0 - CONTACT_EPSILON);
    }

    #[test]
    fn walking_on_objects_uses_unit_steps() {
        let config = PhysicsConfig::default();
        let low = crate_at(1, 40.0, FLOOR - 31.0);
        let top = low.hit_box.y;
        let objects = ObjectSet::new(vec![low]);
        let mover = Rect::new(50.0, top - 44.0 - CONTACT_EPSILON, 15.0, 44.0);
        assert_eq!(objects.resolve_horizontal(&mover, 0.55, &grid(), &config), 0.55);
        assert_eq!(objects.resolve_horizontal(&mover, -3.3, &grid(), &config), -1.0);
    }

    #[test]
    fn broken_objects_do_not_block() {
        let config = PhysicsConfig::default();
        let mut object = crate_at(1, 100.0, FLOOR - 31.0);
        object.animating = true;
        let objects = ObjectSet::new(vec![object]);
        let mover = standing_mover(100.0 - 15.0 - CONTACT_EPSILON);
        assert_eq!(objects.resolve_horizontal(&mover, 0.55, &grid(), &config), 0.55);
    }

    #[test]
    fn landing_surface_picks_highest_top() {
        let objects = ObjectSet::new(vec![
            crate_at(1, 40.0, 100.0),
            crate_at(2, 40.0, 130.0),
        ]);
        let mover = Rect::new(45.0, 50.0, 15.0, 44.0);
        assert_eq!(objects.landing_surface(&mover, 10.0), Some(100.0));
        assert_eq!(objects.landing_surface(&mover, 2.0), None);
        assert_eq!(objects.landing_surface(&mover, -3.0), None);
    }

    #[test]
    fn embedded_only_when_overlapping() {
        let config = PhysicsConfig::default();
        let objects = ObjectSet::new(vec![crate_at(1, 100.0, FLOOR - 31.0)]);
        assert!(!objects.is_embedded(&standing_mover(100.0 - 15.0 - CONTACT_EPSILON), &config));
        assert!(objects.is_embedded(&standing_mover(95.0), &config));
    }
}
