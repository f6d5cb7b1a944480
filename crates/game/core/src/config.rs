//! Tunable physics constants.
//!
//! All values are expressed in world units per tick at scale 1. A level
//! rendered at a different scale multiplies the distances and speeds through
//! [`PhysicsConfig::scaled`] instead of editing each field.

use crate::error::{ErrorSeverity, GameError};

/// Physics and ability tuning for a simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicsConfig {
    // ===== gravity =====
    /// Gravity while falling.
    pub gravity_down: f64,
    /// Gravity while rising with the jump key held.
    pub gravity_up: f64,
    /// Multiplier on `gravity_up` once the jump key is released mid-rise.
    pub jump_cut_multiplier: f64,
    /// Gravity while sliding down a wall.
    pub wall_gravity: f64,

    // ===== vertical speeds =====
    pub jump_speed: f64,
    /// Air speed after bumping into a ceiling.
    pub collision_fall_speed: f64,
    /// Air speed set on grabbing a wall, keeps the body off the floor query.
    pub wall_grab_air_speed: f64,

    // ===== horizontal speeds =====
    pub walk_speed: f64,
    /// Walk speed while standing in lava.
    pub lava_speed: f64,
    /// Extra speed when pushing off a wall in the air.
    pub wall_boost: f64,
    pub dash_multiplier: f64,
    pub dash_duration_ticks: u32,

    // ===== knockback =====
    /// Upward air speed applied when taking a hit.
    pub knockback_air_speed: f64,
    /// Horizontal knockback, as a multiple of `walk_speed`.
    pub knockback_force: f64,
    /// Backward slide while blocking, as a multiple of `walk_speed`.
    pub block_push_force: f64,

    // ===== cooldowns =====
    pub cooldown_tick: f64,
    pub attack_cooldown: f64,
    pub block_cooldown: f64,
    pub dash_cooldown: f64,
    pub spell_cooldown: f64,

    // ===== resources =====
    pub max_health: f64,
    pub max_stamina: f64,
    pub initial_stamina: f64,
    pub dash_cost: f64,
    /// Stamina needed to start a spell.
    pub spell_min_stamina: f64,
    /// Stamina drained per tick while a spell is active.
    pub spell_drain: f64,
    /// Stamina drained per tick while transformed.
    pub transform_drain: f64,
    /// Health drained per tick while standing in lava.
    pub lava_damage: f64,
    pub death_duration_ticks: u32,
    /// Length of one-shot actions (attack, block, hit, spell, transform
    /// charge) and of an object's break animation.
    pub action_duration_ticks: u32,

    // ===== dynamic objects =====
    /// Largest step a mover may take toward an object it is touching.
    pub object_step: f64,
    /// Sub-step used while settling falling objects.
    pub settle_step: f64,
    /// Vertical inset of the lower side-touch probes.
    pub side_touch_inset: f64,
    /// Distance below the mover's feet probed for standing on an object.
    pub top_touch_probe: f64,
    /// Horizontal inset of the standing probes.
    pub top_touch_inset: f64,

    // ===== entity geometry =====
    pub hit_box_width: f64,
    pub hit_box_height: f64,
    /// Offset of the hit-box from the entity position.
    pub hit_box_offset_x: f64,
    pub hit_box_offset_y: f64,
    /// Gap between the hit-box and the attack box.
    pub attack_reach: f64,
    pub attack_box_width: f64,
    pub attack_box_height: f64,
}

impl PhysicsConfig {
    pub fn new() -> Self {
        Self {
            gravity_down: 0.03,
            gravity_up: 0.022,
            jump_cut_multiplier: 3.0,
            wall_gravity: 0.0005,

            jump_speed: -2.25,
            collision_fall_speed: 0.5,
            wall_grab_air_speed: 0.1,

            walk_speed: 0.55,
            lava_speed: 0.3,
            wall_boost: 0.65,
            dash_multiplier: 6.0,
            dash_duration_ticks: 40,

            knockback_air_speed: -1.2,
            knockback_force: 1.2,
            block_push_force: 0.1,

            cooldown_tick: 0.005,
            attack_cooldown: 0.75,
            block_cooldown: 1.2,
            dash_cooldown: 1.75,
            spell_cooldown: 2.5,

            max_health: 100.0,
            max_stamina: 100.0,
            initial_stamina: 15.0,
            dash_cost: 3.0,
            spell_min_stamina: 5.0,
            spell_drain: 0.2,
            transform_drain: 0.025,
            lava_damage: 0.5,
            death_duration_ticks: 120,
            action_duration_ticks: 60,

            object_step: 1.0,
            settle_step: 1.0,
            side_touch_inset: 5.0,
            top_touch_probe: 2.0,
            top_touch_inset: 2.0,

            hit_box_width: 15.0,
            hit_box_height: 44.0,
            hit_box_offset_x: 42.0,
            hit_box_offset_y: 16.0,
            attack_reach: 10.0,
            attack_box_width: 20.0,
            attack_box_height: 35.0,
        }
    }

    /// Multiplies every distance, speed and acceleration by `scale`.
    ///
    /// Tick counts, cooldowns and resources are unit-free and stay as they are.
    #[must_use]
    pub fn scaled(mut self, scale: f64) -> Self {
        for v in [
            &mut self.gravity_down,
            &mut self.gravity_up,
            &mut self.wall_gravity,
            &mut self.jump_speed,
            &mut self.collision_fall_speed,
            &mut self.walk_speed,
            &mut self.lava_speed,
            &mut self.wall_boost,
            &mut self.knockback_air_speed,
            &mut self.hit_box_width,
            &mut self.hit_box_height,
            &mut self.hit_box_offset_x,
            &mut self.hit_box_offset_y,
            &mut self.attack_reach,
            &mut self.attack_box_width,
            &mut self.attack_box_height,
        ] {
            *v *= scale;
        }
        self
    }

    /// Rejects values that would make the simulation diverge or stall.
    ///
    /// # Errors
    ///
    /// Returns the first offending field as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("gravity_down", self.gravity_down),
            ("gravity_up", self.gravity_up),
            ("jump_cut_multiplier", self.jump_cut_multiplier),
            ("walk_speed", self.walk_speed),
            ("dash_multiplier", self.dash_multiplier),
            ("cooldown_tick", self.cooldown_tick),
            ("max_health", self.max_health),
            ("max_stamina", self.max_stamina),
            ("object_step", self.object_step),
            ("settle_step", self.settle_step),
            ("hit_box_width", self.hit_box_width),
            ("hit_box_height", self.hit_box_height),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let finite = [
            ("wall_gravity", self.wall_gravity),
            ("collision_fall_speed", self.collision_fall_speed),
            ("wall_grab_air_speed", self.wall_grab_air_speed),
            ("lava_speed", self.lava_speed),
            ("wall_boost", self.wall_boost),
            ("knockback_air_speed", self.knockback_air_speed),
            ("knockback_force", self.knockback_force),
            ("block_push_force", self.block_push_force),
            ("lava_damage", self.lava_damage),
            ("hit_box_offset_x", self.hit_box_offset_x),
            ("hit_box_offset_y", self.hit_box_offset_y),
            ("attack_reach", self.attack_reach),
            ("attack_box_width", self.attack_box_width),
            ("attack_box_height", self.attack_box_height),
        ];
        if let Some(&(field, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NotFinite { field });
        }

        if !(self.jump_speed.is_finite() && self.jump_speed < 0.0) {
            return Err(ConfigError::JumpSpeedNotUpward(self.jump_speed));
        }
        let durations = [
            ("dash_duration_ticks", self.dash_duration_ticks),
            ("death_duration_ticks", self.death_duration_ticks),
            ("action_duration_ticks", self.action_duration_ticks),
        ];
        if let Some(&(field, _)) = durations.iter().find(|(_, ticks)| *ticks == 0) {
            return Err(ConfigError::ZeroDuration { field });
        }
        if self.initial_stamina > self.max_stamina {
            return Err(ConfigError::StaminaAboveMax {
                initial: self.initial_stamina,
                max: self.max_stamina,
            });
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Invalid physics tuning.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    /// `y` grows downward, so a jump needs a negative speed.
    #[error("jump speed {0} must be negative")]
    JumpSpeedNotUpward(f64),

    #[error("{field} must be at least one tick")]
    ZeroDuration { field: &'static str },

    #[error("initial stamina {initial} exceeds maximum {max}")]
    StaminaAboveMax { initial: f64, max: f64 },
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use ConfigError::*;
        match self {
            NotFinite { .. } => "CONFIG_NOT_FINITE",
            NotPositive { .. } => "CONFIG_NOT_POSITIVE",
            JumpSpeedNotUpward(_) => "CONFIG_JUMP_SPEED_NOT_UPWARD",
            ZeroDuration { .. } => "CONFIG_ZERO_DURATION",
            StaminaAboveMax { .. } => "CONFIG_STAMINA_ABOVE_MAX",
        }
    }
}
