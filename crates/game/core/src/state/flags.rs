use bitflags::bitflags;

bitflags! {
    /// What an entity is doing right now.
    ///
    /// Every flag is an independent boolean. Rules such as "no attacking while
    /// on a wall" are upheld by the physics step and the entity action API,
    /// never by this set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionFlags: u32 {
        // input intent
        const LEFT          = 1 << 0;
        const RIGHT         = 1 << 1;
        const JUMP          = 1 << 2;

        // movement
        const MOVE          = 1 << 3;
        const IN_AIR        = 1 << 4;
        const DOUBLE_JUMP   = 1 << 5;
        const ON_WALL       = 1 << 6;
        const ON_OBJECT     = 1 << 7;
        const WALL_PUSH     = 1 << 8;

        // abilities
        const ATTACK        = 1 << 9;
        const DASH          = 1 << 10;
        const DASH_HIT      = 1 << 11;
        const CAN_DASH      = 1 << 12;
        const BLOCK         = 1 << 13;
        const CAN_BLOCK     = 1 << 14;
        const SPELL         = 1 << 15;
        const TRANSFORM     = 1 << 16;
        const CAN_TRANSFORM = 1 << 17;

        // status
        const HIT           = 1 << 18;
        const LAVA          = 1 << 19;
        const DYING         = 1 << 20;
        const GAME_OVER     = 1 << 21;
    }
}

impl ActionFlags {
    /// Flags describing held input rather than state.
    pub const INPUT: Self = Self::LEFT.union(Self::RIGHT).union(Self::JUMP);

    /// Flags cleared whenever a dash ends, voluntarily or not.
    pub const DASHING: Self = Self::DASH.union(Self::DASH_HIT);

    /// Exactly one of `LEFT`/`RIGHT` is held.
    pub fn single_direction(self) -> bool {
        self.contains(Self::LEFT) != self.contains(Self::RIGHT)
    }

    /// Death has started, whether or not the game-over screen is up yet.
    pub fn is_dead(self) -> bool {
        self.intersects(Self::DYING | Self::GAME_OVER)
    }
}
