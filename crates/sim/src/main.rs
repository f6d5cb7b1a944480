//! Headless platformer driver.
//!
//! ```bash
//! SIM_LEVEL=demo SIM_TICKS=300 RUST_LOG=debug cargo run -p platformer-sim
//! ```

use anyhow::Result;
use platformer_sim::SimConfig;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env();
    tracing::info!(level = %config.level, "Starting platformer simulation");

    let summary = platformer_sim::run(&config)?;
    println!(
        "ticks={} position=({:.1}, {:.1}) render={} health={:.1} objects={} props={} game_overs={}",
        summary.ticks,
        summary.final_position.x,
        summary.final_position.y,
        summary.final_render,
        summary.health,
        summary.objects_left,
        summary.props_left,
        summary.game_overs,
    );
    Ok(())
}
