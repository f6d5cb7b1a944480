use strum::{AsRefStr, Display, EnumString};

use super::ActionFlags;

/// Single-valued display state derived from the action flags.
///
/// Animation and audio collaborators key their clips on this value. It is
/// recomputed from the flags every tick and never stored on the entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RenderState {
    Idle,
    Run,
    Jump,
    Fall,
    WallSlide,
    Dash,
    Attack,
    Transform,
    Spell,
    Block,
    Hit,
    Death,
}

impl RenderState {
    /// States that play once and end the action that started them.
    pub const fn is_one_shot(self) -> bool {
        matches!(
            self,
            Self::Attack | Self::Block | Self::Hit | Self::Spell | Self::Transform
        )
    }

    /// Picks the display state by fixed priority:
    /// death > hit > block > spell > attack > transform > dash > wall slide >
    /// jump/fall > run > idle.
    ///
    /// Rising and falling are told apart by the sign of `air_speed`; an
    /// airborne body at the apex (speed exactly zero) keeps the ground state.
    pub fn derive(flags: ActionFlags, air_speed: f64) -> Self {
        use ActionFlags as F;

        if flags.is_dead() {
            return Self::Death;
        }
        if flags.contains(F::HIT) {
            return Self::Hit;
        }
        if flags.intersects(F::BLOCK | F::CAN_BLOCK) {
            return Self::Block;
        }
        if flags.contains(F::SPELL) {
            return Self::Spell;
        }
        if flags.contains(F::ATTACK) && !flags.contains(F::ON_WALL) {
            return Self::Attack;
        }
        if flags.contains(F::CAN_TRANSFORM) {
            return Self::Transform;
        }
        if flags.contains(F::DASH) {
            return Self::Dash;
        }
        if flags.contains(F::ON_WALL) && !flags.contains(F::ON_OBJECT) {
            return Self::WallSlide;
        }
        if flags.contains(F::IN_AIR) {
            if air_speed < 0.0 {
                return Self::Jump;
            }
            if air_speed > 0.0 {
                return Self::Fall;
            }
        }
        if flags.contains(F::MOVE) {
            return Self::Run;
        }
        Self::Idle
    }
}
