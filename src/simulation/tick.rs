//! Tick system - orchestrates simulation updates
//!
//! Fixed order, strictly sequential:
//! control -> chunk streaming -> AI -> physics -> collision
//!
//! Additions and removals are visible to every later system in the same
//! tick. Delta time is clamped once here before any system sees it.

use crate::core::types::ChunkIndex;
use crate::simulation::context::Simulation;
use crate::simulation::control::{self, PlayerInput};
use crate::simulation::events::{SimulationEvent, TickReport};
use crate::simulation::{ai, collision, physics};

/// Run one tick and return everything it produced
pub fn run_simulation_tick(sim: &mut Simulation, dt: f32, input: Option<&PlayerInput>) -> TickReport {
    let dt = dt.clamp(0.0, sim.config.physics.max_dt);
    let mut report = TickReport::new(sim.current_tick);

    let player = sim.player_id();

    if player.is_none() && input.is_some() {
        tracing::warn!(tick = sim.current_tick, "input ignored: no player entity");
    }
    if let (Some(id), Some(input)) = (player, input) {
        control::apply(
            &mut sim.store,
            id,
            input,
            &sim.field,
            &sim.config.player,
            &mut report,
        );
    }

    if let Some(z) = sim.player_position().map(|p| p.z) {
        stream_chunks(sim, z, &mut report);
        check_boss_zone(sim, z, &mut report);
    }

    ai::update(&mut sim.store, &mut sim.rng.gameplay, &sim.config, dt);

    let fell_out = physics::update(&mut sim.store, &sim.field, &sim.config.physics, dt);
    if !fell_out.is_empty() {
        tracing::trace!(count = fell_out.len(), "projectiles left the world");
    }

    collision::update(&mut sim.store, &mut sim.rng.gameplay, &sim.config, &mut report);

    tracing::trace!(
        tick = sim.current_tick,
        entities = sim.store.len(),
        events = report.events.len(),
        "tick complete"
    );

    sim.current_tick += 1;
    report
}

fn stream_chunks(sim: &mut Simulation, z: f32, report: &mut TickReport) {
    let update = sim
        .streamer
        .update(z, &mut sim.store, &sim.field, &sim.config);
    if update.is_empty() {
        return;
    }
    tracing::debug!(
        created = update.created.len(),
        disposed = update.disposed.len(),
        frontier = ?sim.streamer.frontier(),
        "window advanced"
    );

    for (index, biome) in update.created {
        report.emit(SimulationEvent::ChunkGenerated { index, biome });
    }
    for index in update.disposed {
        report.emit(SimulationEvent::ChunkDisposed { index });
    }
}

fn check_boss_zone(sim: &mut Simulation, z: f32, report: &mut TickReport) {
    if sim.boss_zone_reached || z < sim.config.boss_spawn_z {
        return;
    }
    sim.boss_zone_reached = true;
    let chunk: ChunkIndex = sim.streamer.index_at(z);
    tracing::info!(z, chunk, tick = sim.current_tick, "boss zone reached");
    report.emit(SimulationEvent::BossZoneReached { z });
}
