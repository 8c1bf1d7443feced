//! Headless demo: walk the player off a ledge, record a ghost, and replay.
//!
//! Run with: `RUST_LOG=debug cargo run --example headless_run`

use anyhow::Context;
use boxwalk_engine::prelude::*;
use tracing::info;

/// A block floating in the void with the finish above its right edge and a
/// platform shuttling overhead.
fn build_level() -> anyhow::Result<Simulation> {
    let shuttle = PointPath::new(vec![160, 260], vec![40, 40], PointPath::DEFAULT_SPEED)
        .context("shuttle path rejected")?;
    let mut sim = Simulation::new(SimConfig::default()).context("default config rejected")?;
    let world = sim.world_mut();
    world.insert(Body::block(Rect::new(0, 128, 128, 128)));
    world.insert(Body::moving_block(64, 8, Box::new(shuttle)));
    world.insert(Body::finish_block(56, -64));
    world.insert(Body::player(32, 96));
    Ok(sim)
}

fn main() -> anyhow::Result<()> {
    install_tracing("info")?;

    let mut sim = build_level()?;
    let mut recorder = ReplayRecorder::new(&sim, 30);
    let mut ghost = GhostRecorder::new();

    sim.set_input(InputFrame {
        right: true,
        ..Default::default()
    });
    while sim.outcome() == Outcome::Playing && sim.tick_count() < 600 {
        recorder.record(&sim);
        let report = sim.tick();
        ghost.record(&sim);
        for event in &report.events {
            info!(tick = report.tick, ?event, "event");
        }
    }
    info!(
        ticks = sim.tick_count(),
        outcome = ?sim.outcome(),
        hash = %sim.state_hash(),
        "run finished"
    );

    let log = recorder.finish();
    let result = replay(&mut build_level()?, &log).context("replay failed")?;
    info!(
        completed = result.completed,
        ticks = result.ticks_replayed,
        "replay verified"
    );

    let track = ghost.track();
    info!(points = track.len(), json_bytes = track.to_json_string().len(), "ghost recorded");

    let mut rerun = build_level()?;
    rerun.world_mut().insert(track.to_ghost()?);
    rerun.run_ticks(track.len() as u64 + 1);
    info!(bodies = rerun.world().len(), "ghost played back");

    Ok(())
}
