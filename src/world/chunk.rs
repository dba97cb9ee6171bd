//! Chunk records and deterministic chunk content
//!
//! What a chunk contains is decided by `plan_chunk`, a pure function of the
//! chunk index, the config and the height field. Each chunk gets its own
//! Mulberry32 stream seeded from the index, so regenerating chunk N always
//! yields the same biome and the same spawn list no matter what else the
//! game has drawn in between.

use std::collections::BTreeSet;

use glam::Vec3;

use crate::core::config::SimulationConfig;
use crate::core::rng::SeededRng;
use crate::core::types::{ChunkIndex, EntityId};
use crate::ecs::entity::{CollectibleKind, EnemyKind};
use crate::world::biome::BiomeKind;
use crate::world::height_field::HeightField;

/// Stride between per-chunk seeds
pub const CHUNK_SEED_STRIDE: i64 = 7919;

/// Seed of the content stream for chunk `index`
pub fn chunk_seed(base: u32, index: ChunkIndex) -> u32 {
    (base as i64).wrapping_add(index.wrapping_mul(CHUNK_SEED_STRIDE)) as u32
}

/// What a spawn descriptor produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Enemy(EnemyKind),
    Collectible(CollectibleKind),
}

/// One entity a chunk will spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnDescriptor {
    pub kind: SpawnKind,
    /// World-space position, already resting on the terrain
    pub position: Vec3,
}

/// Full, reproducible content plan for one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkBlueprint {
    pub index: ChunkIndex,
    pub biome: BiomeKind,
    pub z_start: f32,
    pub z_end: f32,
    pub spawns: Vec<SpawnDescriptor>,
}

impl ChunkBlueprint {
    /// Spawn positions relative to the chunk's near edge
    pub fn relative_spawns(&self) -> impl Iterator<Item = (SpawnKind, Vec3)> + '_ {
        self.spawns
            .iter()
            .map(move |s| (s.kind, s.position - Vec3::new(0.0, 0.0, self.z_start)))
    }
}

/// A live world segment and the entities it owns
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: ChunkIndex,
    pub biome: BiomeKind,
    pub z_start: f32,
    pub z_end: f32,
    pub owned: BTreeSet<EntityId>,
}

/// z range covered by chunk `index`
pub fn chunk_bounds(index: ChunkIndex, chunk_size: f32) -> (f32, f32) {
    let start = index as f32 * chunk_size;
    (start, start + chunk_size)
}

/// Decide biome and spawn list for chunk `index`
pub fn plan_chunk(index: ChunkIndex, config: &SimulationConfig, field: &HeightField) -> ChunkBlueprint {
    let (z_start, z_end) = chunk_bounds(index, config.streaming.chunk_size);
    let biome = field.biome_at((z_start + z_end) * 0.5);
    let rules = config.biome_rules(biome);
    let spawn = &config.spawn;

    let mut rng = SeededRng::new(chunk_seed(config.seeds.chunk_base, index));
    let mut spawns = Vec::new();

    let enemy_count = rng.range_int(rules.min_enemies as i64, rules.max_enemies as i64);
    for _ in 0..enemy_count {
        let x = rng.range_f32(-spawn.enemy_half_width, spawn.enemy_half_width);
        let z = z_start + rng.range_f32(spawn.edge_margin, config.streaming.chunk_size - spawn.edge_margin);
        let y = field.height_at(x, z, biome);
        let kind = *rng
            .pick_weighted(&rules.enemy_weights)
            .expect("enemy weight table validated non-empty at startup");

        spawns.push(SpawnDescriptor {
            kind: SpawnKind::Enemy(kind),
            position: Vec3::new(x, y, z),
        });
    }

    if rules.collectible_chance >= 1.0 || rng.chance(rules.collectible_chance) {
        let x = rng.range_f32(-spawn.collectible_half_width, spawn.collectible_half_width);
        let z = z_start + rng.range_f32(spawn.edge_margin, config.streaming.chunk_size - spawn.edge_margin);
        let y = field.height_at(x, z, biome);
        let kind = if rng.chance(spawn.film_chance) {
            CollectibleKind::Film
        } else {
            CollectibleKind::Cocoa
        };

        spawns.push(SpawnDescriptor {
            kind: SpawnKind::Collectible(kind),
            position: Vec3::new(x, y, z),
        });
    }

    ChunkBlueprint {
        index,
        biome,
        z_start,
        z_end,
        spawns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TerrainConfig;

    fn setup() -> (SimulationConfig, HeightField) {
        let config = SimulationConfig::default();
        let field = HeightField::with_seed(TerrainConfig::default(), 42);
        (config, field)
    }

    #[test]
    fn test_plan_is_reproducible() {
        let (config, field) = setup();
        for index in 0..30 {
            assert_eq!(plan_chunk(index, &config, &field), plan_chunk(index, &config, &field));
        }
    }

    #[test]
    fn test_spawns_stay_inside_chunk() {
        let (config, field) = setup();
        for index in 0..30 {
            let plan = plan_chunk(index, &config, &field);
            for (_, rel) in plan.relative_spawns() {
                assert!(rel.z >= config.spawn.edge_margin);
                assert!(rel.z <= config.streaming.chunk_size - config.spawn.edge_margin);
                assert!(rel.x.abs() <= config.spawn.enemy_half_width);
            }
        }
    }

    #[test]
    fn test_enemy_count_within_biome_range() {
        let (config, field) = setup();
        for index in 0..60 {
            let plan = plan_chunk(index, &config, &field);
            let rules = config.biome_rules(plan.biome);
            let enemies = plan
                .spawns
                .iter()
                .filter(|s| matches!(s.kind, SpawnKind::Enemy(_)))
                .count() as u32;
            assert!(enemies >= rules.min_enemies && enemies <= rules.max_enemies);
        }
    }

    #[test]
    fn test_summit_spawns_no_enemies() {
        let (config, field) = setup();
        let index = (config.terrain.summit_depth / config.streaming.chunk_size) as i64 + 3;
        let plan = plan_chunk(index, &config, &field);
        assert_eq!(plan.biome, BiomeKind::Summit);
        assert!(plan.spawns.is_empty());
    }

    #[test]
    fn test_valley_always_has_collectible() {
        let (mut config, _) = setup();
        config.terrain.bands = vec![crate::core::config::BiomeBand {
            biome: BiomeKind::CocoaValley,
            min: -2.0,
            max: 2.0,
        }];
        let field = HeightField::with_seed(config.terrain.clone(), 42);
        for index in 0..20 {
            let plan = plan_chunk(index, &config, &field);
            assert_eq!(plan.biome, BiomeKind::CocoaValley);
            assert!(plan
                .spawns
                .iter()
                .any(|s| matches!(s.kind, SpawnKind::Collectible(_))));
        }
    }

    #[test]
    fn test_chunk_seeds_differ_per_index() {
        assert_ne!(chunk_seed(42, 0), chunk_seed(42, 1));
        assert_eq!(chunk_seed(42, 3), 42 + 3 * 7919);
    }
}
