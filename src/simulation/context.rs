//! Simulation context - everything a tick reads and writes
//!
//! Systems receive the pieces they need from here explicitly; there is no
//! ambient global state.

use glam::Vec3;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::rng::RngStreams;
use crate::core::types::{EntityId, Tick};
use crate::ecs::entity::{Components, EntityBlueprint, EntityKind, PlayerForm};
use crate::ecs::store::{EntityStore, Query};
use crate::world::height_field::HeightField;
use crate::world::streamer::ChunkStreamer;

pub struct Simulation {
    pub current_tick: Tick,
    pub config: SimulationConfig,
    pub store: EntityStore,
    pub rng: RngStreams,
    pub field: HeightField,
    pub streamer: ChunkStreamer,
    pub(crate) boss_zone_reached: bool,
}

impl Simulation {
    /// Validate the config, seed every stream and build the terrain
    ///
    /// The terrain noise seed is the first draw of the terrain stream, so
    /// the height field is fixed once per run.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = RngStreams::new(&config.seeds);
        let field = HeightField::new(config.terrain.clone(), &mut rng.terrain)
            .with_biome_cell(config.streaming.chunk_size);
        let streamer = ChunkStreamer::new(&config.streaming);

        tracing::debug!(seeds = ?config.seeds, "simulation created");

        Ok(Self {
            current_tick: 0,
            config,
            store: EntityStore::new(),
            rng,
            field,
            streamer,
            boss_zone_reached: false,
        })
    }

    /// Build a simulation and place the player at the configured spawn
    pub fn with_player(config: SimulationConfig) -> Result<Self> {
        let mut sim = Self::new(config)?;
        sim.spawn_player();
        Ok(sim)
    }

    /// Add the player, resting on the terrain below the spawn point
    pub fn spawn_player(&mut self) -> EntityId {
        let [x, y, z] = self.config.player.spawn;
        let ground = self.field.ground_at(x, z);
        let position = Vec3::new(x, y.max(ground), z);
        self.store
            .add(EntityBlueprint::player(position, self.config.player.radius))
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.store
            .first(Query::kind(EntityKind::Player).with(Components::VELOCITY))
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.player_id()
            .and_then(|id| self.store.get(id))
            .map(|p| p.position)
    }

    pub fn player_form(&self) -> Option<PlayerForm> {
        self.player_id()
            .and_then(|id| self.store.get(id))
            .and_then(|p| p.player_form())
    }

    /// Write a form decided by the game-state collaborator back to the player
    pub fn set_player_form(&mut self, form: PlayerForm) -> Result<()> {
        let Some(id) = self.player_id() else {
            tracing::warn!(?form, "form change for a run without a player");
            return Err(SimError::PlayerMissing);
        };
        match self.store.get_mut(id) {
            Some(player) => {
                if player.set_player_form(form) {
                    Ok(())
                } else {
                    Err(SimError::EntityNotFound(id))
                }
            }
            None => Err(SimError::EntityNotFound(id)),
        }
    }

    /// Add a projectile owned by an external controller
    pub fn spawn_projectile(&mut self, position: Vec3, velocity: Vec3) -> EntityId {
        self.store.add(EntityBlueprint::projectile(
            position,
            velocity,
            self.config.player.projectile_radius,
        ))
    }

    pub fn boss_zone_reached(&self) -> bool {
        self.boss_zone_reached
    }

    pub fn entity_count(&self) -> usize {
        self.store.len()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("current_tick", &self.current_tick)
            .field("entities", &self.store.len())
            .field("frontier", &self.streamer.frontier())
            .finish()
    }
}
