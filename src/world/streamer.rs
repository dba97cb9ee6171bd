//! Chunk streaming - the sliding window of live world segments
//!
//! The window covers `[current, current + visible_chunks)` where `current` is
//! the player's chunk. Chunks that fall behind are kept for
//! `retention_margin` more chunks and then disposed together with every
//! entity they spawned. The streamer is the only owner of chunk records; it
//! never touches entities it did not spawn.

use std::collections::BTreeMap;

use crate::core::config::{SimulationConfig, StreamingConfig};
use crate::core::types::ChunkIndex;
use crate::ecs::entity::EntityBlueprint;
use crate::ecs::store::EntityStore;
use crate::world::biome::BiomeKind;
use crate::world::chunk::{chunk_bounds, plan_chunk, Chunk, SpawnKind};
use crate::world::height_field::HeightField;

/// What one `update` changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamUpdate {
    pub created: Vec<(ChunkIndex, BiomeKind)>,
    pub disposed: Vec<ChunkIndex>,
}

impl StreamUpdate {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.disposed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ChunkStreamer {
    chunk_size: f32,
    visible_chunks: u32,
    retention_margin: u32,
    chunks: BTreeMap<ChunkIndex, Chunk>,
    /// Furthest chunk index the player has reached
    frontier: Option<ChunkIndex>,
}

impl ChunkStreamer {
    pub fn new(config: &StreamingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            visible_chunks: config.visible_chunks,
            retention_margin: config.retention_margin,
            chunks: BTreeMap::new(),
            frontier: None,
        }
    }

    /// Chunk index containing depth `z`
    pub fn index_at(&self, z: f32) -> ChunkIndex {
        (z / self.chunk_size).floor() as ChunkIndex
    }

    /// Advance the window to the player's depth
    ///
    /// Moving backwards, or staying inside the same chunk, changes nothing.
    pub fn update(
        &mut self,
        player_z: f32,
        store: &mut EntityStore,
        field: &HeightField,
        config: &SimulationConfig,
    ) -> StreamUpdate {
        self.reconcile(store);

        let current = self.index_at(player_z);
        if self.frontier.is_some_and(|frontier| current <= frontier) {
            return StreamUpdate::default();
        }
        self.frontier = Some(current);

        let mut update = StreamUpdate::default();

        let window_end = current + self.visible_chunks as ChunkIndex;
        for index in current..window_end {
            if let Some(biome) = self.create_chunk(index, store, field, config) {
                update.created.push((index, biome));
            }
        }

        let keep_from = current - self.retention_margin as ChunkIndex;
        let stale: Vec<ChunkIndex> = self.chunks.range(..keep_from).map(|(i, _)| *i).collect();
        for index in stale {
            if self.dispose_chunk(index, store) {
                update.disposed.push(index);
            }
        }

        update
    }

    /// Generate chunk `index` and register its entities
    ///
    /// Returns the biome, or `None` when the chunk already exists.
    pub fn create_chunk(
        &mut self,
        index: ChunkIndex,
        store: &mut EntityStore,
        field: &HeightField,
        config: &SimulationConfig,
    ) -> Option<BiomeKind> {
        if self.chunks.contains_key(&index) {
            return None;
        }

        let plan = plan_chunk(index, config, field);
        let (z_start, z_end) = chunk_bounds(index, self.chunk_size);
        let mut chunk = Chunk {
            index,
            biome: plan.biome,
            z_start,
            z_end,
            owned: Default::default(),
        };

        for spawn in &plan.spawns {
            let blueprint = match spawn.kind {
                SpawnKind::Enemy(kind) => {
                    EntityBlueprint::enemy(kind, spawn.position, config.enemy_stats(kind).radius)
                }
                SpawnKind::Collectible(kind) => {
                    EntityBlueprint::collectible(kind, spawn.position, config.spawn.collectible_radius)
                }
            };
            chunk.owned.insert(store.add(blueprint));
        }

        tracing::debug!(
            index,
            biome = %plan.biome,
            spawned = chunk.owned.len(),
            "chunk created"
        );

        let biome = chunk.biome;
        self.chunks.insert(index, chunk);
        Some(biome)
    }

    /// Remove every entity chunk `index` still owns, then drop the record
    ///
    /// Returns false for an unknown index.
    pub fn dispose_chunk(&mut self, index: ChunkIndex, store: &mut EntityStore) -> bool {
        let Some(chunk) = self.chunks.remove(&index) else {
            tracing::trace!(index, "dispose of unknown chunk ignored");
            return false;
        };

        let mut removed = 0;
        for id in &chunk.owned {
            if store.remove(*id).is_some() {
                removed += 1;
            }
        }

        tracing::debug!(index, removed, "chunk disposed");
        true
    }

    /// Forget owned ids that were removed by combat or physics
    pub fn reconcile(&mut self, store: &EntityStore) {
        for chunk in self.chunks.values_mut() {
            chunk.owned.retain(|id| store.contains(*id));
        }
    }

    /// Indices in the active window, ascending
    pub fn active_indices(&self) -> Vec<ChunkIndex> {
        let Some(current) = self.frontier else {
            return Vec::new();
        };
        let end = current + self.visible_chunks as ChunkIndex;
        self.chunks.range(current..end).map(|(i, _)| *i).collect()
    }

    /// Chunks behind the window that are still alive
    pub fn retained_indices(&self) -> Vec<ChunkIndex> {
        let Some(current) = self.frontier else {
            return Vec::new();
        };
        self.chunks.range(..current).map(|(i, _)| *i).collect()
    }

    pub fn chunk(&self, index: ChunkIndex) -> Option<&Chunk> {
        self.chunks.get(&index)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn frontier(&self) -> Option<ChunkIndex> {
        self.frontier
    }
}
