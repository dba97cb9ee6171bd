//! Events emitted to the game-state and audio collaborators
//!
//! The simulation never touches score, warmth or game-over state itself; it
//! reports what happened and the collaborators decide what it means.

use serde::Serialize;

use crate::core::types::{ChunkIndex, Tick};
use crate::ecs::entity::{CollectibleKind, EnemyKind, PlayerForm};
use crate::world::biome::BiomeKind;

/// How an enemy was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DefeatCause {
    /// Run over by the empowered player
    Crushed,
    /// Died hitting an ordinary player
    Contact,
    Projectile,
}

/// Events generated during a simulation tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimulationEvent {
    ScoreDelta { amount: u32 },
    /// Warmth lost by the player
    DamageDelta { amount: f32 },
    /// Warmth restored for cocoa, film rolls for film
    PickupApplied { kind: CollectibleKind, amount: f32 },
    PlayerFormChanged { form: PlayerForm },
    EnemyDefeated { kind: EnemyKind, cause: DefeatCause },
    ChunkGenerated { index: ChunkIndex, biome: BiomeKind },
    ChunkDisposed { index: ChunkIndex },
    /// Player reached the boss arena depth; fires once per run
    BossZoneReached { z: f32 },
}

/// Fire-and-forget audio/haptic cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cue {
    Jump,
    Hit,
    Pickup,
    Throw,
}

/// Everything one tick produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub events: Vec<SimulationEvent>,
    pub cues: Vec<Cue>,
}

impl TickReport {
    pub fn new(tick: Tick) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub fn emit(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// Sum of all score deltas in this tick
    pub fn score(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                SimulationEvent::ScoreDelta { amount } => *amount as u64,
                _ => 0,
            })
            .sum()
    }
}
