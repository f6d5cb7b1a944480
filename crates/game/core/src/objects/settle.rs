//! Falling and stacking of unsupported objects.

use tracing::debug;

use super::ObjectSet;
use crate::config::PhysicsConfig;
use crate::env::{CONTACT_EPSILON, Rect, TileGrid};

impl ObjectSet {
    /// Brings every unsupported object to rest within the current tick.
    ///
    /// Objects are processed from the lowest up so that a stack lands in one
    /// pass. Each falls in `settle_step` increments while the next increment
    /// stays clear of the grid and of every other solid object, then snaps
    /// flush onto whatever stopped it and is marked on ground. Objects already
    /// on ground are skipped until something clears the flag again.
    ///
    /// Returns the number of objects that came to rest.
    pub fn settle(&mut self, grid: &TileGrid, config: &PhysicsConfig) -> usize {
        let mut order: Vec<usize> = (0..self.objects.len())
            .filter(|&i| self.objects[i].is_solid() && !self.objects[i].on_ground)
            .collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.objects[a].hit_box, &self.objects[b].hit_box);
            b.bottom().total_cmp(&a.bottom())
        });

        for &i in &order {
            let start = self.objects[i].hit_box;
            let mut rect = start;
            loop {
                let next = rect.translated(0.0, config.settle_step);
                if !grid.can_move_rect(&next) || self.overlaps_other(i, &next) {
                    break;
                }
                rect = next;
            }
            rect.y = self.resting_y(i, &rect, grid, config);

            let object = &mut self.objects[i];
            object.hit_box = rect;
            object.on_ground = true;
            debug!(id = %object.id, from = start.y, to = rect.y, "object settled");
        }
        order.len()
    }

    /// True when `rect` overlaps a solid object other than `index`.
    fn overlaps_other(&self, index: usize, rect: &Rect) -> bool {
        self.objects
            .iter()
            .enumerate()
            .any(|(j, o)| j != index && o.is_solid() && o.hit_box.intersects(rect))
    }

    /// Flush resting `y` for an object that can no longer step down: one
    /// contact epsilon above the highest surface within a step of its bottom.
    fn resting_y(&self, index: usize, rect: &Rect, grid: &TileGrid, config: &PhysicsConfig) -> f64 {
        let on_grid = grid.floor_contact_y(rect, config.settle_step);
        self.objects
            .iter()
            .enumerate()
            .filter(|&(j, o)| j != index && o.is_solid())
            .map(|(_, o)| &o.hit_box)
            .filter(|o| o.overlaps_horizontally(rect))
            .filter(|o| {
                o.y >= rect.bottom() - CONTACT_EPSILON
                    && o.y <= rect.bottom() + config.settle_step + CONTACT_EPSILON
            })
            .map(|o| o.y - rect.height - CONTACT_EPSILON)
            .fold(on_grid, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{ObjectKind, WorldObject};
    use crate::state::ObjectId;

    const T: f64 = 32.0;

    fn floor_grid() -> TileGrid {
        let mut grid = TileGrid::empty(10, 8, T).unwrap();
        for col in 0..10 {
            grid = grid.with_tile(col, 7, 0);
        }
        grid
    }

    fn crate_at(id: u32, x: f64, y: f64) -> WorldObject {
        WorldObject::new(ObjectId(id), ObjectKind::Container, Rect::new(x, y, 30.0, 30.0))
    }

    #[test]
    fn single_object_lands_flush_on_floor() {
        let mut objects = ObjectSet::new(vec![crate_at(1, 40.0, 10.5)]);
        let settled = objects.settle(&floor_grid(), &PhysicsConfig::default());
        assert_eq!(settled, 1);

        let object = objects.get(ObjectId(1)).unwrap();
        assert!(object.on_ground);
        assert_eq!(object.hit_box.bottom(), 7.0 * T - CONTACT_EPSILON);
    }

    #[test]
    fn touching_stack_settles_in_one_pass() {
        // Listed top first so ordering by height matters.
        let mut objects = ObjectSet::new(vec![
            crate_at(1, 40.0, 0.0),
            crate_at(2, 40.0, 30.0),
            crate_at(3, 40.0, 60.0),
        ]);
        let grid = floor_grid();
        objects.settle(&grid, &PhysicsConfig::default());

        let boxes: Vec<Rect> = objects.iter().map(|o| o.hit_box).collect();
        assert!(objects.iter().all(|o| o.on_ground));
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
        assert_eq!(boxes[2].bottom(), 7.0 * T - CONTACT_EPSILON);
        assert_eq!(boxes[1].bottom(), boxes[2].y - CONTACT_EPSILON);
        assert_eq!(boxes[0].bottom(), boxes[1].y - CONTACT_EPSILON);
    }

    #[test]
    fn resting_objects_are_skipped() {
        let mut object = crate_at(1, 40.0, 10.0);
        object.on_ground = true;
        let mut objects = ObjectSet::new(vec![object]);
        assert_eq!(objects.settle(&floor_grid(), &PhysicsConfig::default()), 0);
        assert_eq!(objects.get(ObjectId(1)).unwrap().hit_box.y, 10.0);
    }

    #[test]
    fn falls_into_pit() {
        // Ground at row 5 everywhere except column 3, which drops two tiles
        // to a pit floor at row 7.
        let mut grid = TileGrid::empty(10, 8, T).unwrap();
        for col in 0..10 {
            let rows = if col == 3 { 7..8 } else { 5..8 };
            for row in rows {
                grid = grid.with_tile(col, row, 0);
            }
        }

        let mut objects = ObjectSet::new(vec![crate_at(1, 3.0 * T + 1.0, 5.0 * T - 31.0)]);
        objects.settle(&grid, &PhysicsConfig::default());
        let object = objects.get(ObjectId(1)).unwrap();
        assert!(object.on_ground);
        assert_eq!(object.hit_box.bottom(), 7.0 * T - CONTACT_EPSILON);
    }
}
