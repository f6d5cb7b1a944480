use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use super::{Interactable, InteractionClass, InteractionContext};
use crate::engine::{LogSeverity, ParticleKind, SoundId};
use crate::env::{HasHitBox, Rect, Side, Vec2};
use crate::state::{ActionFlags, Facing, ObjectId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PropKind {
    Spike,
    Lava,
    JumpPad,
    Shop,
    Blacksmith,
    SaveTotem,
    Loot,
    Herb,
    Potion,
    Table,
    Board,
    Dog,
    Npc,
}

impl PropKind {
    pub const fn class(self) -> InteractionClass {
        use PropKind::*;
        match self {
            Spike | Lava => InteractionClass::Hazard,
            JumpPad => InteractionClass::Launcher,
            Shop | Blacksmith | SaveTotem => InteractionClass::Service,
            Loot | Herb | Potion => InteractionClass::Pickup,
            Table | Board | Dog | Npc => InteractionClass::Social,
        }
    }

    pub const fn prompt(self) -> Option<&'static str> {
        use PropKind::*;
        match self {
            Shop => Some("Press F to open the shop"),
            Blacksmith => Some("Press F to upgrade equipment"),
            SaveTotem => Some("Press F to save the game"),
            Loot => Some("Press F to loot"),
            Herb => Some("Press F to pick the herb"),
            Table => Some("Press F to craft"),
            Board => Some("Press F to read the quest board"),
            Dog => Some("Press F to pet the dog"),
            Npc => Some("Press F to talk"),
            Spike | Lava | JumpPad | Potion => None,
        }
    }
}

/// An interactable placed in the level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prop {
    pub id: ObjectId,
    pub kind: PropKind,
    pub hit_box: Rect,
    pub alive: bool,
    /// True while the entity is inside and the prompt should be shown.
    pub active: bool,
    /// Kind-specific strength: launch speed of a jump pad (negative is up),
    /// health restored by a potion. Ignored by other kinds.
    pub power: f64,
    /// Direction an NPC looks at.
    pub facing: Facing,
}

impl Prop {
    pub fn new(id: ObjectId, kind: PropKind, hit_box: Rect) -> Self {
        Self {
            id,
            kind,
            hit_box,
            alive: true,
            active: false,
            power: 0.0,
            facing: Facing::Left,
        }
    }

    #[must_use]
    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    fn launch(&self, ctx: &mut InteractionContext<'_>) {
        ctx.entity.launch(self.power);
        let hb = ctx.entity.hit_box();
        ctx.hooks.spawn_particles(
            ParticleKind::JumpPadDust,
            Vec2::new(hb.center_x(), hb.bottom()),
            Side::Right,
        );
    }
}

impl HasHitBox for Prop {
    fn hit_box(&self) -> Rect {
        self.hit_box
    }
}

impl Interactable for Prop {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn class(&self) -> InteractionClass {
        self.kind.class()
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn enter(&mut self, ctx: &mut InteractionContext<'_>) {
        debug!(id = %self.id, kind = %self.kind, "prop entered");
        match self.kind {
            PropKind::Spike => ctx.entity.kill(),
            PropKind::Lava => ctx.entity.flags.insert(ActionFlags::LAVA),
            PropKind::JumpPad => {
                ctx.hooks.play_sound(SoundId::JumpPad);
                self.launch(ctx);
            }
            PropKind::Potion => {
                ctx.entity.heal(self.power);
                ctx.hooks
                    .notify_log("Potion consumed", LogSeverity::Information);
                self.alive = false;
            }
            _ => self.active = true,
        }
    }

    fn stay(&mut self, ctx: &mut InteractionContext<'_>) {
        match self.kind {
            PropKind::Spike => ctx.entity.kill(),
            PropKind::Lava => ctx.entity.flags.insert(ActionFlags::LAVA),
            PropKind::JumpPad => self.launch(ctx),
            PropKind::Npc => {
                self.facing = if ctx.entity.hit_box().center_x() < self.hit_box.center_x() {
                    Facing::Left
                } else {
                    Facing::Right
                };
            }
            _ => {}
        }
    }

    fn exit(&mut self, ctx: &mut InteractionContext<'_>) {
        debug!(id = %self.id, kind = %self.kind, "prop exited");
        match self.kind {
            PropKind::Lava => ctx.entity.flags.remove(ActionFlags::LAVA),
            _ => self.active = false,
        }
    }

    fn prompt(&self) -> Option<&'static str> {
        self.kind.prompt()
    }
}
