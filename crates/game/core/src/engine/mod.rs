//! Fixed-tick simulation of one entity in a level.
//!
//! [`Simulation`] owns the entity, the dynamic objects and the props of a
//! level and advances them in a fixed order every tick: input, physics,
//! attack breaks, settling, intersection dispatch, status, cooldowns and the
//! derived render state. Side effects leave through [`Hooks`].

mod actions;
mod hook;
mod input;
mod physics;

pub use hook::{HookEvent, Hooks, LogSeverity, NoopHooks, ParticleKind, RecordingHooks, SoundId};
pub use input::{InputIntent, InputParseError};
pub use physics::{Integrator, StepReport};

use tracing::{debug, info};

use crate::config::{ConfigError, PhysicsConfig};
use crate::env::{HasHitBox, Rect, TileGrid, Vec2};
use crate::interaction::{DispatchReport, InteractionContext, IntersectionDispatcher, Prop};
use crate::objects::ObjectSet;
use crate::state::{ActionFlags, Entity, Facing, ObjectId, RenderState, Tick};

/// Everything observable about the entity after one tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickOutcome {
    pub tick: Tick,
    pub position: Vec2,
    pub hit_box: Rect,
    pub flags: ActionFlags,
    pub render: RenderState,
    pub step: StepReport,
    pub dispatch: DispatchReport,
    /// Active intersection after dispatch.
    pub intersection: Option<ObjectId>,
    /// Objects whose break started this tick.
    pub broken: Vec<ObjectId>,
    /// The render state changed or a double jump asked for a fresh clip.
    pub restart_animation: bool,
}

/// One entity moving through a level.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: PhysicsConfig,
    entity: Entity,
    objects: ObjectSet,
    props: Vec<Prop>,
    dispatcher: IntersectionDispatcher,
    tick: Tick,
    previous: InputIntent,
    render: RenderState,
    render_ticks: u32,
    /// Objects mid-way through their break animation and the tick it began.
    breaking: Vec<(ObjectId, Tick)>,
}

impl Simulation {
    /// Builds a simulation with the entity's hit-box at `spawn`.
    ///
    /// # Errors
    ///
    /// Returns the first invalid tuning value.
    pub fn new(
        config: PhysicsConfig,
        spawn: Vec2,
        objects: ObjectSet,
        props: Vec<Prop>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let entity = Entity::new(spawn, &config);
        Ok(Self {
            config,
            entity,
            objects,
            props,
            dispatcher: IntersectionDispatcher::new(),
            tick: Tick::ZERO,
            previous: InputIntent::IDLE,
            render: RenderState::Idle,
            render_ticks: 0,
            breaking: Vec::new(),
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    pub fn objects(&self) -> &ObjectSet {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectSet {
        &mut self.objects
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn active_intersection(&self) -> Option<ObjectId> {
        self.dispatcher.active()
    }

    /// Sends the entity back to its spawn point after a game over.
    pub fn respawn(&mut self) {
        self.entity.respawn(&self.config);
        self.dispatcher.reset();
        self.previous = InputIntent::IDLE;
        self.render = RenderState::Idle;
        self.render_ticks = 0;
    }

    /// Advances the simulation by one tick.
    pub fn update(&mut self, grid: &TileGrid, input: &InputIntent, hooks: &mut dyn Hooks) -> TickOutcome {
        self.tick = self.tick + 1;
        let mut broken = Vec::new();

        let jump_pressed = self.fold_input(grid, input, hooks, &mut broken);

        let step = Integrator::new(grid, &self.objects, &self.config).step(&mut self.entity, jump_pressed, hooks);

        let flags = self.entity.flags;
        if flags.contains(ActionFlags::DASH) && !flags.contains(ActionFlags::DASH_HIT) {
            let hits = self.break_objects(self.entity.attack_box(), hooks, &mut broken);
            if hits > 0 {
                self.entity.flags.insert(ActionFlags::DASH_HIT);
            }
        }
        if flags.contains(ActionFlags::SPELL) {
            self.break_objects(self.entity.attack_box(), hooks, &mut broken);
        }

        self.finish_breaks();
        self.objects.settle(grid, &self.config);

        let mut ctx = InteractionContext {
            entity: &mut self.entity,
            hooks: &mut *hooks,
        };
        let dispatch = self.dispatcher.dispatch(&mut self.props, &mut ctx);
        self.props.retain(|p| p.alive || Some(p.id) == self.dispatcher.active());

        self.update_status(hooks);
        self.entity.cooldowns.tick(self.config.cooldown_tick);
        let restart_animation = self.update_render(step.restart_animation);

        self.previous = *input;
        TickOutcome {
            tick: self.tick,
            position: self.entity.position,
            hit_box: self.entity.hit_box(),
            flags: self.entity.flags,
            render: self.render,
            step,
            intersection: dispatch.active,
            dispatch,
            broken,
            restart_animation,
        }
    }

    /// Folds held keys and presses into the entity. Returns the jump press
    /// edge. Abilities are ignored once dying.
    fn fold_input(
        &mut self,
        grid: &TileGrid,
        input: &InputIntent,
        hooks: &mut dyn Hooks,
        broken: &mut Vec<ObjectId>,
    ) -> bool {
        let previous = self.previous;
        let entity = &mut self.entity;

        if entity.flags.is_dead() {
            entity.flags.remove(ActionFlags::INPUT);
            return false;
        }

        entity.flags.set(ActionFlags::LEFT, input.left);
        entity.flags.set(ActionFlags::RIGHT, input.right);
        entity.flags.set(ActionFlags::JUMP, input.jump);

        if (previous.left && !input.left) || (previous.right && !input.right) {
            entity.flags.remove(ActionFlags::ON_WALL);
        }
        if previous.jump && !input.jump && entity.flags.contains(ActionFlags::IN_AIR) {
            entity.current_jumps = entity.current_jumps.saturating_add(1);
        }
        if !input.dash {
            entity.flags.insert(ActionFlags::CAN_DASH);
        }
        if entity.flags.single_direction() && !entity.flags.contains(ActionFlags::ON_WALL) {
            entity.facing = if input.left { Facing::Left } else { Facing::Right };
        }

        if input.attack && entity.attack(&self.config, hooks) {
            let area = entity.attack_box();
            self.break_objects(area, hooks, broken);
        }
        let entity = &mut self.entity;
        if input.block {
            entity.block();
        }
        if input.dash {
            entity.dash(grid, &self.config, hooks);
        }
        if input.spell {
            entity.cast_spell(&self.config, hooks);
        }
        if input.transform && !previous.transform {
            entity.toggle_transform(hooks);
        }

        input.jump && !previous.jump
    }

    fn break_objects(&mut self, area: Rect, hooks: &mut dyn Hooks, broken: &mut Vec<ObjectId>) -> usize {
        let hits = self.objects.break_in(&area, hooks);
        let count = hits.len();
        for id in hits {
            self.breaking.push((id, self.tick));
            broken.push(id);
        }
        count
    }

    fn finish_breaks(&mut self) {
        let duration = u64::from(self.config.action_duration_ticks);
        let now = self.tick;
        let objects = &mut self.objects;
        self.breaking.retain(|&(id, started)| {
            if now.0 - started.0 < duration {
                return true;
            }
            objects.finish_break(id);
            false
        });
        self.objects.retain_alive();
    }

    /// Lava, stamina drain and the death sequence.
    fn update_status(&mut self, hooks: &mut dyn Hooks) {
        let config = &self.config;
        let entity = &mut self.entity;

        if entity.flags.contains(ActionFlags::LAVA) && !entity.flags.is_dead() {
            entity.health = (entity.health - config.lava_damage).max(0.0);
        }
        if entity.flags.contains(ActionFlags::SPELL) {
            entity.change_stamina(-config.spell_drain);
        }
        if entity.flags.contains(ActionFlags::TRANSFORM) {
            entity.change_stamina(-config.transform_drain);
        }

        if !entity.is_alive() && !entity.flags.is_dead() {
            entity.flags.insert(ActionFlags::DYING);
            entity.flags.remove(
                ActionFlags::ATTACK
                    | ActionFlags::BLOCK
                    | ActionFlags::CAN_BLOCK
                    | ActionFlags::SPELL
                    | ActionFlags::CAN_TRANSFORM
                    | ActionFlags::HIT,
            );
            entity.cancel_dash();
            entity.death_ticks = 0;
            hooks.notify_log("Player is dead.", LogSeverity::Notification);
            debug!(tick = %self.tick, "entity dying");
        } else if entity.flags.contains(ActionFlags::DYING) && !entity.flags.contains(ActionFlags::GAME_OVER) {
            entity.death_ticks += 1;
            if entity.death_ticks >= config.death_duration_ticks {
                entity.flags.insert(ActionFlags::GAME_OVER);
                hooks.play_sound(SoundId::GameOver);
                info!(tick = %self.tick, "game over");
            }
        }
    }

    /// Derives the render state and runs the animation clock. One-shot
    /// states end their action after `action_duration_ticks`.
    fn update_render(&mut self, restart: bool) -> bool {
        let mut render = RenderState::derive(self.entity.flags, self.entity.air_speed);
        if render.is_one_shot() && self.render == render && self.render_ticks + 1 >= self.config.action_duration_ticks {
            self.entity.finish_animation();
            render = RenderState::derive(self.entity.flags, self.entity.air_speed);
        }

        let changed = render != self.render || restart;
        if changed {
            self.render_ticks = 0;
        } else {
            self.render_ticks += 1;
        }
        self.render = render;
        changed
    }
}
