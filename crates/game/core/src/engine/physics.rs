//! Per-tick movement of the entity against the tile grid and solid objects.
//!
//! The integrator runs after input has been folded into the action flags and
//! before objects settle. Every snap it performs leaves the hit-box flush with
//! the obstacle, so floor and wall queries later in the same tick see the
//! corrected position.

use tracing::{debug, trace};

use super::{Hooks, ParticleKind, SoundId};
use crate::config::PhysicsConfig;
use crate::env::{CONTACT_EPSILON, HasHitBox, Side, TileGrid, Vec2};
use crate::objects::ObjectSet;
use crate::state::{ActionFlags, Entity, Facing};

/// How far above the hit-box a jump off an object looks for a low ceiling.
const HEADROOM_PROBE: f64 = 5.0;

/// What happened during one [`Integrator::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepReport {
    pub moved: bool,
    pub landed: bool,
    pub jumped: bool,
    pub dash_ended: bool,
    /// A double jump restarts the jump animation.
    pub restart_animation: bool,
}

/// Borrowed view of the world the entity moves through.
pub struct Integrator<'a> {
    grid: &'a TileGrid,
    objects: &'a ObjectSet,
    config: &'a PhysicsConfig,
}

impl<'a> Integrator<'a> {
    pub fn new(grid: &'a TileGrid, objects: &'a ObjectSet, config: &'a PhysicsConfig) -> Self {
        Self {
            grid,
            objects,
            config,
        }
    }

    /// Advances the entity by one tick.
    ///
    /// `jump_pressed` is the press edge of the jump key; holding the key only
    /// affects gravity through the `JUMP` flag.
    pub fn step(&self, entity: &mut Entity, jump_pressed: bool, hooks: &mut dyn Hooks) -> StepReport {
        let mut report = StepReport::default();
        entity.flags.remove(ActionFlags::MOVE);
        self.refresh_ground(entity);

        if entity.flags.contains(ActionFlags::HIT) {
            entity.flags.remove(ActionFlags::SPELL);
            entity.cancel_dash();
            let dx = entity.push_direction.sign() * self.config.walk_speed * self.config.knockback_force;
            self.push(entity, dx);
            self.fall(entity, hooks, &mut report);
            return report;
        }
        if entity.flags.contains(ActionFlags::CAN_BLOCK) {
            let dx = -entity.facing.sign() * self.config.walk_speed * self.config.block_push_force;
            self.push(entity, dx);
            self.fall(entity, hooks, &mut report);
            return report;
        }
        if entity.flags.intersects(ActionFlags::SPELL | ActionFlags::CAN_TRANSFORM) {
            self.fall(entity, hooks, &mut report);
            return report;
        }

        if !entity.flags.contains(ActionFlags::IN_AIR) || entity.flags.contains(ActionFlags::ON_WALL) {
            entity.dash_count = 0;
        }

        let flags = entity.flags;
        if flags.single_direction() || flags.intersects(ActionFlags::IN_AIR | ActionFlags::DASH) {
            if !flags.contains(ActionFlags::DASH) {
                self.fall(entity, hooks, &mut report);
            }
            self.update_wall(entity);
            let dx = self.intent(entity);
            self.move_horizontal(entity, dx, &mut report);
            entity.flags.insert(ActionFlags::MOVE);
            report.moved = true;
        }

        if jump_pressed && self.jump(entity, hooks, &mut report) {
            report.jumped = true;
        }

        if entity.flags.contains(ActionFlags::MOVE | ActionFlags::DASH) {
            entity.dash_tick += 1;
            if entity.dash_tick >= self.config.dash_duration_ticks {
                entity.cancel_dash();
                report.dash_ended = true;
                debug!("dash finished");
            }
        }
        report
    }

    /// Keeps `ON_OBJECT` in sync with what is under the entity and starts a
    /// fall when nothing is.
    fn refresh_ground(&self, entity: &mut Entity) {
        let touching = self.objects.is_top_touching(&entity.hit_box(), self.config);
        let on_object = entity.flags.contains(ActionFlags::ON_OBJECT);
        if touching && !on_object {
            entity.flags.remove(ActionFlags::IN_AIR | ActionFlags::WALL_PUSH);
            entity.flags.insert(ActionFlags::ON_OBJECT);
            entity.air_speed = 0.0;
            entity.current_jumps = 0;
            debug!("stepped onto object");
        } else if !touching && on_object {
            entity.flags.remove(ActionFlags::ON_OBJECT);
        }

        if !entity.flags.intersects(ActionFlags::IN_AIR | ActionFlags::ON_OBJECT)
            && !self.grid.is_on_floor(entity)
        {
            entity.flags.insert(ActionFlags::IN_AIR);
            trace!("left the ground");
        }
    }

    /// Gravity and vertical resolution while airborne.
    fn fall(&self, entity: &mut Entity, hooks: &mut dyn Hooks, report: &mut StepReport) {
        if !entity.flags.contains(ActionFlags::IN_AIR) {
            return;
        }
        let c = self.config;
        let gravity = if entity.air_speed < 0.0 {
            if entity.flags.contains(ActionFlags::JUMP) {
                c.gravity_up
            } else {
                c.gravity_up * c.jump_cut_multiplier
            }
        } else if entity.flags.contains(ActionFlags::ON_WALL) && entity.air_speed > 0.0 {
            c.wall_gravity
        } else {
            c.gravity_down
        };
        entity.air_speed += gravity;

        let dy = entity.air_speed;
        let hb = entity.hit_box();
        if dy > 0.0 {
            let on_grid = self.grid.floor_within(&hb, dy);
            let on_object = self.objects.landing_surface(&hb, dy);
            let surface = match (on_grid, on_object) {
                (Some(g), Some(o)) => Some(g.min(o)),
                (g, o) => g.or(o),
            };
            match surface {
                Some(top) => {
                    let object = on_object.is_some_and(|o| Some(o) == surface);
                    self.land(entity, top, object, hooks);
                    report.landed = true;
                }
                None => {
                    if self.grid.can_move_rect(&hb.translated(0.0, dy)) {
                        entity.translate(0.0, dy);
                    }
                }
            }
        } else if dy < 0.0 {
            if self.grid.can_move_rect(&hb.translated(0.0, dy)) {
                entity.translate(0.0, dy);
            } else {
                let y = self.grid.ceiling_contact_y(&hb, dy);
                entity.set_hit_box_origin(hb.x, y);
                entity.air_speed = if entity.flags.contains(ActionFlags::ON_WALL) {
                    c.wall_gravity
                } else {
                    c.collision_fall_speed
                };
                entity.flags.remove(ActionFlags::DOUBLE_JUMP);
                debug!(y, "hit ceiling");
            }
        }
    }

    fn land(&self, entity: &mut Entity, top: f64, object: bool, hooks: &mut dyn Hooks) {
        let hb = entity.hit_box();
        let y = top - hb.height - CONTACT_EPSILON;
        entity.set_hit_box_origin(hb.x, y);
        entity.air_speed = 0.0;
        entity.current_jumps = 0;
        entity.wall_side = None;
        entity.flags.remove(ActionFlags::IN_AIR | ActionFlags::WALL_PUSH);
        if object {
            entity.flags.insert(ActionFlags::ON_OBJECT);
        }
        if !entity.flags.contains(ActionFlags::HIT) {
            let hb = entity.hit_box();
            hooks.spawn_particles(
                ParticleKind::Dust,
                Vec2::new(hb.center_x(), hb.bottom()),
                entity.facing.side(),
            );
        }
        debug!(y, object, "landed");
    }

    fn update_wall(&self, entity: &mut Entity) {
        if entity.flags.contains(ActionFlags::ON_WALL) {
            entity.flags.remove(ActionFlags::ATTACK);
        }
        let left = self.grid.is_on_wall(entity, Side::Left);
        let right = self.grid.is_on_wall(entity, Side::Right);
        let flags = entity.flags;

        let pressed = if flags.contains(ActionFlags::LEFT) && left {
            Some(Side::Left)
        } else if flags.contains(ActionFlags::RIGHT) && right {
            Some(Side::Right)
        } else {
            None
        };
        if let Some(side) = pressed {
            let facing_away = (entity.facing == Facing::Left && right)
                || (entity.facing == Facing::Right && left);
            if !flags.intersects(ActionFlags::ON_WALL | ActionFlags::ON_OBJECT) && !facing_away {
                entity.flags.insert(ActionFlags::ON_WALL | ActionFlags::WALL_PUSH);
                entity.flags.remove(ActionFlags::ATTACK);
                entity.current_jumps = 1;
                entity.air_speed = self.config.wall_grab_air_speed;
                entity.wall_side = Some(side);
                debug!(side = %side, "wall grabbed");
            }
        }

        if entity.flags.contains(ActionFlags::ON_WALL) && !left && !right {
            entity.flags.remove(ActionFlags::ON_WALL);
            entity.current_jumps = 0;
            debug!("wall released");
        }
    }

    /// Intended horizontal displacement for this tick.
    fn intent(&self, entity: &Entity) -> f64 {
        let c = self.config;
        let flags = entity.flags;
        let speed = if flags.contains(ActionFlags::LAVA) {
            c.lava_speed
        } else {
            c.walk_speed
        };

        let mut dx = 0.0;
        if flags.contains(ActionFlags::LEFT) {
            dx -= speed;
        }
        if flags.contains(ActionFlags::RIGHT) {
            dx += speed;
        }

        if flags.contains(ActionFlags::IN_AIR | ActionFlags::WALL_PUSH) && !flags.contains(ActionFlags::DASH) {
            if let Some(side) = Side::of_delta(dx) {
                if entity.wall_side != Some(side) {
                    dx += side.sign() * c.wall_boost;
                }
            }
        }

        if flags.contains(ActionFlags::DASH) {
            if !flags.single_direction() {
                dx = entity.facing.sign() * speed;
            }
            dx *= c.dash_multiplier;
        }
        dx
    }

    fn move_horizontal(&self, entity: &mut Entity, dx: f64, report: &mut StepReport) {
        if dx == 0.0 {
            return;
        }
        let hb = entity.hit_box();
        let dashing = entity.flags.contains(ActionFlags::DASH);

        // A dash over the top of objects is not slowed by the soft step.
        let resolved = if dashing && self.objects.side_blocker(&hb, dx, self.config).is_none() {
            dx
        } else {
            self.objects.resolve_horizontal(&hb, dx, self.grid, self.config)
        };

        let blocked = if resolved != dx {
            entity.translate(resolved, 0.0);
            true
        } else if self.grid.can_move_to(hb.x + dx, hb.y, hb.width, hb.height) {
            entity.translate(dx, 0.0);
            false
        } else {
            if !entity.flags.contains(ActionFlags::ON_WALL) {
                let x = self.grid.wall_contact_x(&hb, dx);
                entity.set_hit_box_origin(x, hb.y);
            }
            true
        };
        trace!(dx, resolved, blocked, "horizontal move");

        if blocked && dashing {
            entity.cancel_dash();
            report.dash_ended = true;
            debug!(dx, resolved, "dash obstructed");
        }
    }

    /// Knockback or guard slide; stops at anything solid.
    fn push(&self, entity: &mut Entity, dx: f64) {
        let hb = entity.hit_box();
        if self.objects.side_blocker(&hb, dx, self.config).is_none()
            && self.grid.can_move_to(hb.x + dx, hb.y, hb.width, hb.height)
        {
            entity.translate(dx, 0.0);
        }
    }

    fn jump(&self, entity: &mut Entity, hooks: &mut dyn Hooks, report: &mut StepReport) -> bool {
        let flags = entity.flags;
        let hb = entity.hit_box();
        let left_wall = self.grid.is_on_wall(entity, Side::Left);
        let right_wall = self.grid.is_on_wall(entity, Side::Right);
        let in_air = flags.contains(ActionFlags::IN_AIR);

        let rejected = (left_wall && flags.contains(ActionFlags::LEFT) && !flags.contains(ActionFlags::RIGHT))
            || (right_wall && flags.contains(ActionFlags::RIGHT) && !flags.contains(ActionFlags::LEFT))
            || (in_air && flags.contains(ActionFlags::DOUBLE_JUMP | ActionFlags::ON_WALL))
            || (in_air && entity.current_jumps != 1)
            || (flags.contains(ActionFlags::ON_OBJECT)
                && hb.y - HEADROOM_PROBE >= 0.0
                && self.grid.is_solid_at(hb.x, hb.y - HEADROOM_PROBE));
        if rejected {
            trace!(jumps = entity.current_jumps, in_air, "jump rejected");
            return false;
        }

        if entity.current_jumps == 1 {
            entity.flags.insert(ActionFlags::DOUBLE_JUMP);
            entity.current_jumps = 2;
            report.restart_animation = true;
        }
        entity.flags.insert(ActionFlags::IN_AIR);
        entity.air_speed = self.config.jump_speed;
        hooks.play_sound(SoundId::Jump);

        let feet = Vec2::new(hb.center_x(), hb.bottom());
        if left_wall || right_wall {
            let away = if left_wall { Side::Right } else { Side::Left };
            hooks.spawn_particles(ParticleKind::WallJumpDust, feet, away);
        } else {
            hooks.spawn_particles(ParticleKind::Dust, feet, entity.facing.side());
        }
        debug!(jumps = entity.current_jumps, double = report.restart_animation, "jumped");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{HookEvent, NoopHooks, RecordingHooks};
    use crate::env::Rect;
    use crate::objects::{ObjectKind, WorldObject};
    use crate::state::ObjectId;

    const T: f64 = 32.0;

    /// 20 x 10 room: floor on row 9, wall column 0, a pillar at column 10
    /// from row 4 down.
    fn room() -> TileGrid {
        let mut grid = TileGrid::empty(20, 10, T).unwrap();
        for col in 0..20 {
            grid = grid.with_tile(col, 9, 0);
        }
        for row in 0..10 {
            grid = grid.with_tile(0, row, 0);
        }
        for row in 4..10 {
            grid = grid.with_tile(10, row, 0);
        }
        grid
    }

    fn standing(config: &PhysicsConfig, x: f64) -> Entity {
        Entity::new(Vec2::new(x, 9.0 * T - config.hit_box_height - CONTACT_EPSILON), config)
    }

    #[test]
    fn ground_jump_sets_exact_jump_speed() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        let mut e = standing(&config, 100.0);
        e.flags.insert(ActionFlags::JUMP);

        let mut hooks = RecordingHooks::new();
        let report = Integrator::new(&grid, &objects, &config).step(&mut e, true, &mut hooks);
        assert!(report.jumped);
        assert!(e.flags.contains(ActionFlags::IN_AIR));
        assert_eq!(e.air_speed, config.jump_speed);
        assert_eq!(e.current_jumps, 0);
        assert!(hooks.sounds().any(|s| s == SoundId::Jump));
    }

    #[test]
    fn second_jump_only_after_release() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        let integrator = Integrator::new(&grid, &objects, &config);
        let mut e = standing(&config, 100.0);
        e.flags.insert(ActionFlags::IN_AIR);
        e.translate(0.0, -40.0);

        assert!(!integrator.step(&mut e, true, &mut NoopHooks).jumped);

        e.current_jumps = 1;
        let report = integrator.step(&mut e, true, &mut NoopHooks);
        assert!(report.jumped && report.restart_animation);
        assert!(e.flags.contains(ActionFlags::DOUBLE_JUMP));
        assert_eq!(e.current_jumps, 2);
        assert!(!integrator.step(&mut e, true, &mut NoopHooks).jumped);
    }

    #[test]
    fn landing_zeroes_air_speed_flush() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        let mut e = standing(&config, 100.0);
        e.translate(0.0, -0.5);
        e.flags.insert(ActionFlags::IN_AIR);
        e.air_speed = 2.0;

        let mut hooks = RecordingHooks::new();
        let report = Integrator::new(&grid, &objects, &config).step(&mut e, false, &mut hooks);
        assert!(report.landed);
        assert_eq!(e.air_speed, 0.0);
        assert!(!e.flags.contains(ActionFlags::IN_AIR));
        assert_eq!(e.hit_box().bottom(), 9.0 * T - CONTACT_EPSILON);
        assert!(grid.is_on_floor(&e));
        assert!(hooks.particles().any(|p| p == ParticleKind::Dust));
    }

    #[test]
    fn hit_landing_raises_no_dust() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        let mut e = standing(&config, 100.0);
        e.translate(0.0, -0.5);
        e.flags.insert(ActionFlags::IN_AIR | ActionFlags::HIT);
        e.air_speed = 2.0;

        let mut hooks = RecordingHooks::new();
        Integrator::new(&grid, &objects, &config).step(&mut e, false, &mut hooks);
        assert!(!e.flags.contains(ActionFlags::IN_AIR));
        assert!(!hooks.events.iter().any(|ev| matches!(ev, HookEvent::Particles { .. })));
    }

    #[test]
    fn ceiling_bounce_clears_double_jump() {
        let config = PhysicsConfig::default();
        let mut grid = room();
        grid = grid.with_tile(3, 5, 0);
        let objects = ObjectSet::default();
        // Hit-box top 0.5 below the ceiling tile's bottom edge.
        let mut e = Entity::new(Vec2::new(100.0, 6.0 * T + 0.5), &config);
        e.flags.insert(ActionFlags::IN_AIR | ActionFlags::DOUBLE_JUMP | ActionFlags::JUMP);
        e.air_speed = config.jump_speed;

        Integrator::new(&grid, &objects, &config).step(&mut e, false, &mut NoopHooks);
        assert_eq!(e.hit_box().y, 6.0 * T);
        assert_eq!(e.air_speed, config.collision_fall_speed);
        assert!(!e.flags.contains(ActionFlags::DOUBLE_JUMP));
    }

    #[test]
    fn pressing_into_wall_grabs_it() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        // Flush against the wall column, well above the floor.
        let mut e = Entity::new(Vec2::new(T, 3.0 * T), &config);
        e.flags.insert(ActionFlags::IN_AIR | ActionFlags::LEFT);
        e.facing = Facing::Left;

        Integrator::new(&grid, &objects, &config).step(&mut e, false, &mut NoopHooks);
        assert!(e.flags.contains(ActionFlags::ON_WALL | ActionFlags::WALL_PUSH));
        assert_eq!(e.current_jumps, 1);
        assert_eq!(e.air_speed, config.wall_grab_air_speed);
        assert_eq!(e.wall_side, Some(Side::Left));
        assert_eq!(e.hit_box().x, T);
    }

    #[test]
    fn facing_away_blocks_wall_grab() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        let mut e = Entity::new(Vec2::new(T, 3.0 * T), &config);
        e.flags.insert(ActionFlags::IN_AIR | ActionFlags::LEFT);
        e.facing = Facing::Right;

        Integrator::new(&grid, &objects, &config).step(&mut e, false, &mut NoopHooks);
        assert!(!e.flags.contains(ActionFlags::ON_WALL));
    }

    #[test]
    fn jump_into_wall_is_rejected() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        let mut e = Entity::new(Vec2::new(T, 3.0 * T), &config);
        e.flags.insert(ActionFlags::IN_AIR | ActionFlags::ON_WALL | ActionFlags::LEFT);
        e.facing = Facing::Left;
        e.current_jumps = 1;

        let report = Integrator::new(&grid, &objects, &config).step(&mut e, true, &mut NoopHooks);
        assert!(!report.jumped);
    }

    #[test]
    fn wall_jump_pushes_dust_away_from_wall() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        let mut e = Entity::new(Vec2::new(T, 3.0 * T), &config);
        e.flags.insert(ActionFlags::IN_AIR | ActionFlags::WALL_PUSH);
        e.current_jumps = 1;

        let mut hooks = RecordingHooks::new();
        let report = Integrator::new(&grid, &objects, &config).step(&mut e, true, &mut hooks);
        assert!(report.jumped);
        assert!(hooks.events.iter().any(|ev| matches!(
            ev,
            HookEvent::Particles { kind: ParticleKind::WallJumpDust, direction: Side::Right, .. }
        )));
    }

    #[test]
    fn obstructed_dash_ends_same_tick() {
        let config = PhysicsConfig::default();
        let grid = room();
        let objects = ObjectSet::default();
        // Right edge 2 units short of the pillar at column 10.
        let mut e = standing(&config, 10.0 * T - config.hit_box_width - 2.0);
        e.flags.insert(ActionFlags::DASH | ActionFlags::DASH_HIT);

        let report = Integrator::new(&grid, &objects, &config).step(&mut e, false, &mut NoopHooks);
        assert!(report.dash_ended);
        assert!(!e.flags.intersects(ActionFlags::DASH | ActionFlags::DASH_HIT));
        assert_eq!(e.dash_tick, 0);
        assert_eq!(e.hit_box().right(), 10.0 * T - CONTACT_EPSILON);
    }

    #[test]
    fn dash_runs_out_after_its_duration() {
        let config = PhysicsConfig {
            dash_duration_ticks: 3,
            ..PhysicsConfig::default()
        };
        let grid = room();
        let objects = ObjectSet::default();
        let integrator = Integrator::new(&grid, &objects, &config);
        let mut e = standing(&config, 100.0);
        e.flags.insert(ActionFlags::DASH);

        for _ in 0..2 {
            integrator.step(&mut e, false, &mut NoopHooks);
            assert!(e.flags.contains(ActionFlags::DASH));
        }
        let start = e.hit_box().x;
        let report = integrator.step(&mut e, false, &mut NoopHooks);
        assert!(report.dash_ended);
        let travelled = e.hit_box().x - start;
        assert!((travelled - config.walk_speed * config.dash_multiplier).abs() < 1e-9);
    }

    #[test]
    fn walking_off_a_ledge_starts_a_fall() {
        let config = PhysicsConfig::default();
        let grid = room().with_tile(5, 9, -1).with_tile(6, 9, -1);
        let objects = ObjectSet::default();
        let mut e = standing(&config, 5.0 * T + 4.0);

        Integrator::new(&grid, &objects, &config).step(&mut e, false, &mut NoopHooks);
        assert!(e.flags.contains(ActionFlags::IN_AIR));
        assert_eq!(e.air_speed, config.gravity_down);
    }

    #[test]
    fn lands_on_top_of_an_object() {
        let config = PhysicsConfig::default();
        let grid = room();
        let top = 9.0 * T - CONTACT_EPSILON - 30.0;
        let objects = ObjectSet::new(vec![WorldObject {
            on_ground: true,
            ..WorldObject::new(ObjectId(1), ObjectKind::Container, Rect::new(95.0, top, 30.0, 30.0))
        }]);
        // Just out of reach of the standing probe.
        let mut e = Entity::new(Vec2::new(100.0, top - config.hit_box_height - 3.5), &config);
        e.flags.insert(ActionFlags::IN_AIR);
        e.air_speed = 3.0;

        let report = Integrator::new(&grid, &objects, &config).step(&mut e, false, &mut NoopHooks);
        assert!(report.landed);
        assert!(e.flags.contains(ActionFlags::ON_OBJECT));
        assert_eq!(e.hit_box().bottom(), top - CONTACT_EPSILON);
    }
}
