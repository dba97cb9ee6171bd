//! Enemy AI - per-enemy finite state steering
//!
//! Each enemy runs a three-state controller:
//!
//! - Idle: bleeds off x/z velocity; engages inside `engage_radius`, and
//!   patrol-capable kinds occasionally wander off on patrol
//! - Chase: seeks the player plus separation from same-kind neighbors;
//!   gives up only beyond `disengage_radius`
//! - Patrol: drifting wander heading plus separation; engages inside
//!   `engage_radius`, returns to Idle on timeout or by chance
//!
//! The engage/disengage gap is the hysteresis band that stops enemies from
//! flickering between Idle and Chase at the boundary. Only x/z velocity is
//! written here; y belongs to physics. Every random draw comes from the
//! gameplay stream, in enemy id order.

use std::f32::consts::TAU;

use ahash::AHashMap;
use glam::{Vec2, Vec3};

use crate::core::config::{AiConfig, EnemyStats, SimulationConfig};
use crate::core::rng::SeededRng;
use crate::core::types::{from_ground_plane, ground_plane, EntityId};
use crate::ecs::entity::{AiAgent, AiState, Components, EnemyKind, EntityKind};
use crate::ecs::store::{EntityStore, Query};
use crate::simulation::steering::{clamp_speed, seek, separate, wander};
use crate::spatial::SparseHashGrid;

/// Idle speeds below this snap to rest
const REST_SPEED: f32 = 1e-3;

/// Apply the state transition for this tick
pub fn transition(
    agent: AiAgent,
    distance: f32,
    can_patrol: bool,
    config: &AiConfig,
    rng: &mut SeededRng,
) -> AiAgent {
    let mut next = agent;

    match agent.state {
        AiState::Idle => {
            if distance < config.engage_radius {
                next.state = AiState::Chase;
            } else if can_patrol && rng.chance(config.patrol_chance) {
                next.state = AiState::Patrol;
                next.heading = rng.range(0.0, TAU as f64) as f32;
                next.patrol_ticks = 0;
            }
        }
        AiState::Chase => {
            if distance > config.disengage_radius {
                next.state = AiState::Idle;
            }
        }
        AiState::Patrol => {
            next.patrol_ticks += 1;
            if distance < config.engage_radius {
                next.state = AiState::Chase;
            } else if next.patrol_ticks > config.patrol_timeout_ticks
                || rng.chance(config.patrol_exit_chance)
            {
                next.state = AiState::Idle;
            }
        }
    }

    next
}

/// Everything steering needs to know about one enemy
pub struct SteeringInput<'a> {
    pub position: Vec2,
    pub velocity: Vec2,
    pub player: Option<Vec2>,
    pub stats: &'a EnemyStats,
    /// Same-kind neighbors within the neighbor radius
    pub neighbors: &'a [Vec2],
}

/// Planar velocity for an agent in its (already transitioned) state
pub fn steer(
    agent: &mut AiAgent,
    input: &SteeringInput<'_>,
    config: &AiConfig,
    rng: &mut SeededRng,
    dt: f32,
) -> Vec2 {
    let max_speed = input.stats.max_speed;
    let separation = || {
        separate(input.position, input.neighbors.iter().copied()) * config.separation_weight * max_speed
    };

    let desired = match agent.state {
        AiState::Idle => {
            let decayed = input.velocity * (1.0 - config.idle_damping * dt).max(0.0);
            if decayed.length() < REST_SPEED {
                Vec2::ZERO
            } else {
                decayed
            }
        }
        AiState::Chase => {
            let toward = input
                .player
                .map(|target| seek(input.position, target, max_speed))
                .unwrap_or(Vec2::ZERO);
            toward + separation()
        }
        AiState::Patrol => {
            let jitter = config.wander_jitter as f64;
            agent.heading = (agent.heading + rng.range(-jitter, jitter) as f32).rem_euclid(TAU);
            wander(agent.heading, max_speed * config.wander_speed_factor) + separation()
        }
    };

    clamp_speed(desired, max_speed)
}

/// Run one AI pass over every enemy
pub fn update(store: &mut EntityStore, rng: &mut SeededRng, config: &SimulationConfig, dt: f32) {
    let ai = &config.ai;

    let player = store
        .first(Query::kind(EntityKind::Player))
        .and_then(|id| store.get(id))
        .map(|p| p.position);

    let enemies = store.query(Query::kind(EntityKind::Enemy).with(Components::VELOCITY | Components::AI));

    // Positions and kinds as of the start of the pass
    let mut kinds: AHashMap<EntityId, EnemyKind> = AHashMap::with_capacity(enemies.len());
    let mut positions = Vec::with_capacity(enemies.len());
    for id in &enemies {
        if let Some(entity) = store.get(*id) {
            if let Some(data) = entity.enemy() {
                kinds.insert(*id, data.kind);
                positions.push((*id, ground_plane(entity.position)));
            }
        }
    }
    let mut grid = SparseHashGrid::new(ai.neighbor_radius.max(f32::EPSILON));
    grid.rebuild(positions.into_iter());

    let mut neighbors = Vec::new();
    for id in enemies {
        let Some(entity) = store.get_mut(id) else {
            continue;
        };
        let position: Vec3 = entity.position;
        let velocity = entity.velocity().unwrap_or(Vec3::ZERO);
        let Some(data) = entity.enemy_mut() else {
            continue;
        };
        let stats = config.enemy_stats(data.kind);

        let distance = player.map_or(f32::INFINITY, |p| p.distance(position));
        let mut agent = transition(data.ai, distance, stats.patrols, ai, rng);
        if agent.state != data.ai.state {
            tracing::trace!(entity = %id, from = ?data.ai.state, to = ?agent.state, "ai transition");
        }

        let planar = ground_plane(position);
        neighbors.clear();
        if agent.state != AiState::Idle {
            neighbors.extend(
                grid.query_radius(planar, ai.neighbor_radius)
                    .filter(|(other, _)| *other != id && kinds.get(other) == Some(&data.kind))
                    .map(|(_, pos)| pos),
            );
        }

        let input = SteeringInput {
            position: planar,
            velocity: ground_plane(velocity),
            player: player.map(ground_plane),
            stats,
            neighbors: &neighbors,
        };
        let steered = steer(&mut agent, &input, ai, rng, dt);
        data.ai = agent;

        if let Some(v) = entity.velocity_mut() {
            *v = from_ground_plane(steered, v.y);
        }
    }
}
