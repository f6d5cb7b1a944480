//! Headless driver for `platformer-core`.
//!
//! Loads a level and physics tuning through `platformer-content`, feeds a
//! scripted input track to [`platformer_core::Simulation`] one tick at a time
//! and reports what happened through `tracing`.

pub mod config;
pub mod hooks;
pub mod script;

pub use config::SimConfig;
pub use hooks::TracingHooks;
pub use script::{InputScript, ScriptError};

use anyhow::Result;
use platformer_content::{ContentFactory, Level};
use platformer_core::{ActionFlags, InputIntent, PhysicsConfig, RenderState, Simulation, Vec2};
use tracing::{debug, info};

/// End-of-run numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_position: Vec2,
    pub final_render: RenderState,
    pub health: f64,
    pub objects_left: usize,
    pub props_left: usize,
    pub game_overs: u32,
}

/// Loads content named by `config` and runs the script against it.
pub fn run(config: &SimConfig) -> Result<RunSummary> {
    let factory = ContentFactory::new(&config.data_dir);
    let physics = factory.load_config()?;
    let level = factory.load_level(&config.level)?;
    let script = match &config.script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::parse(InputScript::DEMO)?,
    };
    info!(
        level = %level.name,
        script_ticks = script.len(),
        data_dir = %config.data_dir.display(),
        "content loaded"
    );

    let mut hooks = TracingHooks::default();
    let summary = run_level(physics, level, &script, config, &mut hooks)?;
    info!(
        ticks = summary.ticks,
        x = summary.final_position.x,
        y = summary.final_position.y,
        render = %summary.final_render,
        health = summary.health,
        sounds = hooks.sounds,
        broken = hooks.broken,
        loot = hooks.loot,
        "run finished"
    );
    Ok(summary)
}

/// Runs one level to completion with already loaded content.
pub fn run_level(
    physics: PhysicsConfig,
    level: Level,
    script: &InputScript,
    config: &SimConfig,
    hooks: &mut TracingHooks,
) -> Result<RunSummary> {
    let Level {
        grid,
        spawn,
        objects,
        props,
        ..
    } = level;
    let mut sim = Simulation::new(physics, spawn, objects, props)
        .map_err(|e| anyhow::anyhow!("invalid physics config: {}", e))?;

    let total = config.ticks.unwrap_or_else(|| script.len());
    let mut inputs = script.ticks();
    let mut game_overs = 0;
    let mut render = RenderState::Idle;

    for _ in 0..total {
        let input = inputs.next().unwrap_or(InputIntent::IDLE);
        let outcome = sim.update(&grid, &input, hooks);

        if config.trace_ticks {
            debug!(tick = %outcome.tick, ?outcome, "tick");
        }
        if outcome.render != render {
            debug!(
                tick = %outcome.tick,
                from = %render,
                to = %outcome.render,
                x = outcome.position.x,
                y = outcome.position.y,
                "render state"
            );
            render = outcome.render;
        }
        if let Some(id) = outcome.dispatch.entered() {
            debug!(tick = %outcome.tick, %id, "entered prop");
        }

        if outcome.flags.contains(ActionFlags::GAME_OVER) {
            game_overs += 1;
            if !config.respawn {
                info!(tick = %outcome.tick, "stopping at game over");
                break;
            }
            sim.respawn();
            render = RenderState::Idle;
        }
    }

    let entity = sim.entity();
    Ok(RunSummary {
        ticks: sim.tick().0,
        final_position: entity.position,
        final_render: render,
        health: entity.health,
        objects_left: sim.objects().len(),
        props_left: sim.props().len(),
        game_overs,
    })
}
