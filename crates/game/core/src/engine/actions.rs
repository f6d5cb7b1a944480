//! Ability and status operations on [`Entity`].
//!
//! Each ability checks its own cooldown slot and preconditions and returns
//! `false` without touching any state when it cannot start. Elapsed cooldown
//! is never refunded.

use tracing::debug;

use super::{Hooks, LogSeverity, SoundId};
use crate::config::PhysicsConfig;
use crate::env::{HasHitBox, Side, TileGrid};
use crate::state::{Ability, ActionFlags, Cooldowns, Entity, Facing};

impl Entity {
    pub fn attack(&mut self, config: &PhysicsConfig, hooks: &mut dyn Hooks) -> bool {
        if self.flags.is_dead()
            || !self.cooldowns.is_ready(Ability::Attack)
            || self.flags.contains(ActionFlags::ON_WALL)
        {
            return false;
        }
        self.flags.insert(ActionFlags::ATTACK);
        self.flags.remove(ActionFlags::SPELL);
        self.cooldowns.start(Ability::Attack, config.attack_cooldown);
        hooks.play_sound(SoundId::Attack);
        debug!(facing = %self.facing, "attack started");
        true
    }

    /// Raises the guard. The block cooldown only starts once a hit is
    /// actually blocked. A running dash cannot be blocked out of.
    pub fn block(&mut self) -> bool {
        if self.flags.is_dead()
            || !self.cooldowns.is_ready(Ability::Block)
            || self.flags.intersects(ActionFlags::BLOCK | ActionFlags::CAN_BLOCK)
            || self.flags.intersects(ActionFlags::DASHING)
        {
            return false;
        }
        self.flags.insert(ActionFlags::BLOCK);
        debug!("block raised");
        true
    }

    /// Starts a dash. One dash per airtime; the dash key has to be released
    /// before the next one. Never starts while guarding.
    pub fn dash(&mut self, grid: &TileGrid, config: &PhysicsConfig, hooks: &mut dyn Hooks) -> bool {
        if self.flags.is_dead()
            || self.flags.intersects(ActionFlags::BLOCK | ActionFlags::CAN_BLOCK)
            || !self.cooldowns.is_ready(Ability::Dash)
            || grid.is_touching_wall(self, Side::Left)
            || grid.is_touching_wall(self, Side::Right)
            || self.dash_count > 0
            || self.flags.contains(ActionFlags::DASH)
            || !self.flags.contains(ActionFlags::CAN_DASH)
            || self.stamina < config.dash_cost
        {
            return false;
        }
        self.flags.insert(ActionFlags::DASH);
        self.flags.remove(ActionFlags::CAN_DASH);
        self.dash_count += 1;
        self.dash_tick = 0;
        self.change_stamina(-config.dash_cost);
        self.cooldowns.start(Ability::Dash, config.dash_cooldown);
        hooks.play_sound(SoundId::Dash);
        debug!(stamina = self.stamina, "dash started");
        true
    }

    pub fn cast_spell(&mut self, config: &PhysicsConfig, hooks: &mut dyn Hooks) -> bool {
        if self.flags.is_dead()
            || self.flags.intersects(ActionFlags::IN_AIR | ActionFlags::SPELL)
            || !self.cooldowns.is_ready(Ability::Spell)
            || self.stamina < config.spell_min_stamina
        {
            return false;
        }
        self.flags.insert(ActionFlags::SPELL);
        self.cooldowns.start(Ability::Spell, config.spell_cooldown);
        hooks.play_sound(SoundId::Spell);
        hooks.notify_log("Flame spell cast", LogSeverity::Information);
        debug!(stamina = self.stamina, "spell started");
        true
    }

    /// Ends an active transformation, or starts charging one when there is
    /// stamina left. The charge turns into `TRANSFORM` when its animation
    /// finishes.
    pub fn toggle_transform(&mut self, hooks: &mut dyn Hooks) -> bool {
        if self.flags.is_dead() {
            return false;
        }
        if self.flags.contains(ActionFlags::TRANSFORM) {
            self.flags.remove(ActionFlags::TRANSFORM);
            debug!("transformation ended");
            return true;
        }
        if self.stamina <= 0.0 || self.flags.contains(ActionFlags::CAN_TRANSFORM) {
            return false;
        }
        self.flags.insert(ActionFlags::CAN_TRANSFORM);
        self.cancel_dash();
        hooks.play_sound(SoundId::Transform);
        debug!("transformation charging");
        true
    }

    /// Applies a hit coming from `source_x`.
    ///
    /// A raised guard absorbs the hit entirely. Otherwise health drops, the
    /// entity is knocked up and away from the source and ignores further hits
    /// until the hit animation finishes. Returns true when health was lost.
    pub fn take_damage(
        &mut self,
        amount: f64,
        source_x: f64,
        config: &PhysicsConfig,
        hooks: &mut dyn Hooks,
    ) -> bool {
        if self.flags.is_dead() || self.flags.contains(ActionFlags::HIT) {
            return false;
        }
        if self.flags.contains(ActionFlags::BLOCK) {
            self.flags.remove(ActionFlags::BLOCK);
            self.flags.insert(ActionFlags::CAN_BLOCK);
            self.cooldowns.start(Ability::Block, config.block_cooldown);
            hooks.play_sound(SoundId::Block);
            hooks.notify_log("Damage blocked successfully!", LogSeverity::Information);
            debug!(amount, "hit blocked");
            return false;
        }

        self.health = (self.health - amount).max(0.0);
        self.flags.insert(ActionFlags::HIT | ActionFlags::IN_AIR);
        self.flags.remove(ActionFlags::SPELL | ActionFlags::ATTACK);
        self.cancel_dash();
        self.push_direction = if source_x < self.hit_box().x {
            Side::Right
        } else {
            Side::Left
        };
        self.air_speed = config.knockback_air_speed;
        hooks.play_sound(SoundId::Hit);
        hooks.notify_log(&format!("Damage received: {amount}"), LogSeverity::Information);
        debug!(amount, health = self.health, push = %self.push_direction, "hit taken");
        true
    }

    pub fn heal(&mut self, amount: f64) {
        if self.flags.is_dead() {
            return;
        }
        self.health = (self.health + amount).clamp(0.0, self.max_health);
    }

    /// Drops health to zero. Death itself is picked up by the next tick.
    pub fn kill(&mut self) {
        self.health = 0.0;
    }

    /// Sends the entity upward with `speed` (negative is up).
    pub fn launch(&mut self, speed: f64) {
        self.air_speed = speed;
        self.flags.insert(ActionFlags::IN_AIR);
    }

    /// End of a one-shot animation: clears the action it was playing.
    pub fn finish_animation(&mut self) {
        self.flags.remove(
            ActionFlags::ATTACK
                | ActionFlags::DASH_HIT
                | ActionFlags::BLOCK
                | ActionFlags::CAN_BLOCK
                | ActionFlags::SPELL,
        );
        if self.flags.contains(ActionFlags::CAN_TRANSFORM) {
            self.flags.remove(ActionFlags::CAN_TRANSFORM);
            self.flags.insert(ActionFlags::TRANSFORM);
        }
        if self.flags.contains(ActionFlags::HIT) {
            self.flags.remove(ActionFlags::HIT);
            self.air_speed = 0.0;
        }
    }

    /// Puts the entity back at its spawn point with full health and empty
    /// stamina.
    pub fn respawn(&mut self, config: &PhysicsConfig) {
        self.set_hit_box_origin(self.spawn.x, self.spawn.y);
        self.facing = Facing::Right;
        self.air_speed = 0.0;
        self.flags = ActionFlags::CAN_DASH;
        self.cooldowns = Cooldowns::default();
        self.current_jumps = 0;
        self.dash_tick = 0;
        self.dash_count = 0;
        self.wall_side = None;
        self.health = config.max_health;
        self.max_health = config.max_health;
        self.stamina = 0.0;
        self.death_ticks = 0;
        debug!(x = self.spawn.x, y = self.spawn.y, "entity respawned");
    }
}
