use strum::{AsRefStr, Display, EnumCount};

use super::{ActionFlags, Facing};
use crate::config::PhysicsConfig;
use crate::env::{HasHitBox, Rect, Side, Vec2};

/// Ability slots that carry a cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Ability {
    Attack,
    Block,
    Dash,
    Spell,
}

/// Remaining cooldown per ability, in cooldown units.
///
/// An ability may only start when its slot reads exactly zero. Elapsed time is
/// never refunded when an ability is cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cooldowns([f64; Ability::COUNT]);

impl Cooldowns {
    pub fn get(&self, ability: Ability) -> f64 {
        self.0[ability as usize]
    }

    pub fn is_ready(&self, ability: Ability) -> bool {
        self.get(ability) == 0.0
    }

    pub fn start(&mut self, ability: Ability, duration: f64) {
        self.0[ability as usize] = duration.max(0.0);
    }

    /// Decrements every slot by `amount`, clamping at zero.
    pub fn tick(&mut self, amount: f64) {
        for slot in &mut self.0 {
            *slot = (*slot - amount).max(0.0);
        }
    }
}

/// The controllable actor.
///
/// The hit-box is not stored: it is always computed from `position` plus the
/// fixed offset, so moving the entity and moving its hit-box are the same
/// operation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    /// Sprite origin in world units.
    pub position: Vec2,
    hit_box_offset: Vec2,
    hit_box_size: Vec2,
    attack_box_size: Vec2,
    attack_reach: f64,

    pub facing: Facing,
    /// Vertical velocity. Negative values move up.
    pub air_speed: f64,
    pub flags: ActionFlags,
    pub cooldowns: Cooldowns,

    pub current_jumps: u8,
    pub dash_tick: u32,
    pub dash_count: u32,
    /// Side of the wall currently grabbed, if any.
    pub wall_side: Option<Side>,
    /// Direction the entity is pushed while `HIT`.
    pub push_direction: Side,

    pub health: f64,
    pub max_health: f64,
    pub stamina: f64,
    pub max_stamina: f64,
    pub death_ticks: u32,

    /// Hit-box origin used by [`Entity::respawn`].
    pub spawn: Vec2,
}

impl Entity {
    /// Creates an entity whose hit-box origin sits at `spawn`.
    pub fn new(spawn: Vec2, config: &PhysicsConfig) -> Self {
        let mut entity = Self {
            position: Vec2::ZERO,
            hit_box_offset: Vec2::new(config.hit_box_offset_x, config.hit_box_offset_y),
            hit_box_size: Vec2::new(config.hit_box_width, config.hit_box_height),
            attack_box_size: Vec2::new(config.attack_box_width, config.attack_box_height),
            attack_reach: config.attack_reach,
            facing: Facing::Right,
            air_speed: 0.0,
            flags: ActionFlags::CAN_DASH,
            cooldowns: Cooldowns::default(),
            current_jumps: 0,
            dash_tick: 0,
            dash_count: 0,
            wall_side: None,
            push_direction: Side::Left,
            health: config.max_health,
            max_health: config.max_health,
            stamina: config.initial_stamina,
            max_stamina: config.max_stamina,
            death_ticks: 0,
            spawn,
        };
        entity.set_hit_box_origin(spawn.x, spawn.y);
        entity
    }

    /// Moves the entity so that its hit-box starts at `(x, y)`.
    pub fn set_hit_box_origin(&mut self, x: f64, y: f64) {
        self.position = Vec2::new(x - self.hit_box_offset.x, y - self.hit_box_offset.y);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.position.x += dx;
        self.position.y += dy;
    }

    /// Damage area in front of the entity, placed on the facing side.
    pub fn attack_box(&self) -> Rect {
        let hb = self.hit_box();
        let x = match self.facing {
            Facing::Right => hb.right() + self.attack_reach,
            Facing::Left => hb.x - self.attack_box_size.x - self.attack_reach,
        };
        Rect::new(
            x,
            hb.y + self.attack_reach,
            self.attack_box_size.x,
            self.attack_box_size.y,
        )
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Adds `delta` to stamina, clamped to `0..=max_stamina`. Running out ends
    /// the transformation and any active spell.
    pub fn change_stamina(&mut self, delta: f64) {
        self.stamina = (self.stamina + delta).clamp(0.0, self.max_stamina);
        if self.stamina == 0.0 {
            self.flags.remove(ActionFlags::TRANSFORM | ActionFlags::SPELL);
        }
    }

    /// Clears the dash and its hit window.
    pub fn cancel_dash(&mut self) {
        self.flags.remove(ActionFlags::DASHING);
        self.dash_tick = 0;
    }
}

impl HasHitBox for Entity {
    fn hit_box(&self) -> Rect {
        Rect::new(
            self.position.x + self.hit_box_offset.x,
            self.position.y + self.hit_box_offset.y,
            self.hit_box_size.x,
            self.hit_box_size.y,
        )
    }
}
