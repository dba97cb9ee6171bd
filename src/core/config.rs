//! Simulation configuration with documented constants
//!
//! Every tunable lives here. Defaults reproduce the shipped game feel; a TOML
//! file can override any subset of keys. Tables are validated once when the
//! simulation is built, so the per-tick code can index them without checks.

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::rng::SeedTable;
use crate::ecs::entity::EnemyKind;
use crate::world::biome::BiomeKind;

/// One octave of terrain noise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    /// Lateral frequency (cycles per world unit)
    pub frequency_x: f32,
    /// Depth frequency; kept below `frequency_x` so ridges run downhill
    pub frequency_z: f32,
    /// Height contribution in world units
    pub amplitude: f32,
}

/// Noise band `[min, max)` that selects a biome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiomeBand {
    pub biome: BiomeKind,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Downhill bias: height drops by this much per unit of depth
    ///
    /// Also moves the world floor, so projectiles thrown on a steep run
    /// survive the same vertical distance as on a gentle one.
    pub slope_coefficient: f32,
    /// Decreasing amplitude, increasing frequency
    pub octaves: Vec<Octave>,
    /// Frequency of the biome selector noise along z
    ///
    /// At 0.005 one selector feature spans a couple of chunks, so biomes
    /// come in runs rather than alternating every chunk.
    pub biome_noise_scale: f32,
    /// Ordered, non-overlapping
    ///
    /// Selector values outside every band resolve to open slope.
    pub bands: Vec<BiomeBand>,
    /// Depth beyond which every chunk is summit
    pub summit_depth: f32,
    /// Distance below the downhill plane where the world ends
    pub world_floor_depth: f32,
    /// Half-width of the walkable channel inside an ice cave
    ///
    /// Kept below `SpawnConfig::enemy_half_width` so some cave enemies
    /// start up on the walls.
    pub cave_half_width: f32,
    /// Wall rise per unit of lateral distance outside the cave channel
    pub cave_wall_steepness: f32,
    /// Quadratic bowl coefficient for valleys
    ///
    /// At 0.02 the valley rim at |x| = 18 sits about 6.5 units above the floor.
    pub valley_curvature: f32,
    /// Plateau lift at the summit
    pub summit_plateau: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            slope_coefficient: 0.1,
            octaves: vec![
                Octave { frequency_x: 0.05, frequency_z: 0.02, amplitude: 1.0 },
                Octave { frequency_x: 0.1, frequency_z: 0.04, amplitude: 0.5 },
                Octave { frequency_x: 0.2, frequency_z: 0.08, amplitude: 0.25 },
            ],
            biome_noise_scale: 0.005,
            bands: vec![
                BiomeBand { biome: BiomeKind::CocoaValley, min: -2.0, max: -0.4 },
                BiomeBand { biome: BiomeKind::OpenSlope, min: -0.4, max: 0.3 },
                BiomeBand { biome: BiomeKind::FrozenRink, min: 0.3, max: 0.5 },
                BiomeBand { biome: BiomeKind::IceCave, min: 0.5, max: 2.0 },
            ],
            summit_depth: 15_000.0,
            world_floor_depth: 50.0,
            cave_half_width: 10.0,
            cave_wall_steepness: 5.0,
            valley_curvature: 0.02,
            summit_plateau: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Length of one chunk along z
    ///
    /// Also the biome granularity: a chunk has exactly one biome.
    pub chunk_size: f32,
    /// Chunks in the active window, starting at the player's chunk
    ///
    /// With the default size and a kitten at full speed, five chunks give
    /// roughly 25 seconds of look-ahead.
    pub visible_chunks: u32,
    /// Chunks behind the player kept alive before disposal
    ///
    /// Zero disposes a chunk the moment the player leaves it; enemies
    /// chasing from behind then vanish mid-chase.
    pub retention_margin: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100.0,
            visible_chunks: 5,
            retention_margin: 1,
        }
    }
}

/// Where and how chunk content is placed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Enemies spawn within |x| < this
    pub enemy_half_width: f32,
    /// Collectibles spawn within |x| < this
    ///
    /// Narrower than the enemy band and inside `PlayerConfig::lateral_limit`,
    /// so every collectible is reachable.
    pub collectible_half_width: f32,
    /// Keeps spawns this far from chunk edges along z
    ///
    /// Must leave room inside a chunk; validation rejects
    /// `2 * edge_margin >= chunk_size`.
    pub edge_margin: f32,
    /// Probability a spawned collectible is film rather than cocoa
    pub film_chance: f64,
    /// Pickup radius of every collectible
    ///
    /// Added to the player radius for the overlap test, so the default
    /// pickup reach is 1.8 units.
    pub collectible_radius: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            enemy_half_width: 15.0,
            collectible_half_width: 10.0,
            edge_margin: 10.0,
            film_chance: 0.25,
            collectible_radius: 0.8,
        }
    }
}

/// Per-biome spawn rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeRules {
    /// Fewest enemies a chunk of this biome spawns
    pub min_enemies: u32,
    /// Most enemies; the count is drawn uniformly from the inclusive range
    pub max_enemies: u32,
    /// Relative weights; they need not sum to one
    pub enemy_weights: Vec<(EnemyKind, f32)>,
    /// Probability of one collectible; 1.0 guarantees it
    pub collectible_chance: f64,
}

impl Default for BiomeRules {
    fn default() -> Self {
        Self {
            min_enemies: 2,
            max_enemies: 4,
            enemy_weights: vec![(EnemyKind::Snowman, 1.0)],
            collectible_chance: 0.2,
        }
    }
}

/// Per-kind enemy tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    /// Cap on x/z speed after steering
    ///
    /// Kept below `PlayerConfig::snowman_speed` for the common kind so a
    /// player who keeps moving can always outrun it.
    pub max_speed: f32,
    /// Collision radius
    pub radius: f32,
    /// Awarded when a projectile kills this kind
    pub score: u32,
    /// Whether idle enemies of this kind may wander off on patrol
    pub patrols: bool,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            radius: 1.0,
            score: 100,
            patrols: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Idle or patrolling enemies start chasing inside this distance
    pub engage_radius: f32,
    /// Must exceed `engage_radius`; the gap is the hysteresis band
    ///
    /// A 10 unit band means a player weaving at the edge of engagement
    /// never makes an enemy flicker between idle and chase.
    pub disengage_radius: f32,
    /// Same-kind enemies closer than this push each other apart
    ///
    /// Also the neighbor grid cell size, so radius queries stay exact.
    pub neighbor_radius: f32,
    /// Scale of the separation force relative to max speed
    pub separation_weight: f32,
    /// Max heading change per tick while patrolling (radians)
    pub wander_jitter: f32,
    /// Patrol cruise speed as a fraction of max speed
    pub wander_speed_factor: f32,
    /// Per-tick chance an idle patrol-capable enemy starts patrolling
    ///
    /// At 0.01 and 60 ticks per second an idle imp sets off within about
    /// two seconds on average.
    pub patrol_chance: f64,
    /// Per-tick chance a patrol ends early
    pub patrol_exit_chance: f64,
    /// Patrols end after this many ticks regardless of chance
    pub patrol_timeout_ticks: u32,
    /// Fraction of idle x/z velocity shed per second
    ///
    /// At 5.0 a stopped chase comes to rest in well under a second.
    pub idle_damping: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            engage_radius: 25.0,
            disengage_radius: 35.0,
            neighbor_radius: 5.0,
            separation_weight: 1.0,
            wander_jitter: 0.3,
            wander_speed_factor: 0.5,
            patrol_chance: 0.01,
            patrol_exit_chance: 0.01,
            patrol_timeout_ticks: 200,
            idle_damping: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (units per second squared)
    ///
    /// With `PlayerConfig::jump_velocity` 12 a jump peaks at 2.4 units
    /// and lasts 0.8 seconds.
    pub gravity: f32,
    /// Upper bound on a single integration step (seconds)
    pub max_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            max_dt: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Warmth lost per enemy contact in kitten form
    ///
    /// Seven hits from full warmth end the run.
    pub contact_damage: f32,
    /// Score for an enemy crushed by the snowman form
    pub crush_score: u32,
    /// Chance a snowman hit turns the player into a snowman
    pub form_change_chance: f64,
    /// Warmth restored by one cocoa
    pub cocoa_warmth: f32,
    /// Film rolls granted by one film pickup
    pub film_rolls: f32,
    /// Score for any pickup, on top of the pickup's own effect
    pub pickup_score: u32,
    /// Bonus for reverting the snowman form with cocoa
    pub revert_bonus: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            contact_damage: 15.0,
            crush_score: 200,
            form_change_chance: 0.5,
            cocoa_warmth: 30.0,
            film_rolls: 1.0,
            pickup_score: 50,
            revert_bonus: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Spawn point; lifted onto the terrain if it lies below ground
    pub spawn: [f32; 3],
    /// Collision radius
    pub radius: f32,
    /// Forward speed in kitten form
    pub kitten_speed: f32,
    /// Forward speed in snowman form
    ///
    /// Half the kitten speed: crushing enemies is paid for with pace.
    pub snowman_speed: f32,
    /// Lateral speed at full steer
    pub lateral_speed: f32,
    /// Player x is held within +/- this
    pub lateral_limit: f32,
    /// Vertical speed a jump starts with
    pub jump_velocity: f32,
    /// Height above ground that still counts as grounded for jumping
    pub ground_tolerance: f32,
    /// Snowball speed added on top of the player's forward speed
    pub projectile_speed: f32,
    /// Initial upward speed of a snowball
    pub projectile_lift: f32,
    /// Snowball collision radius
    pub projectile_radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: [0.0, 5.0, 0.0],
            radius: 1.0,
            kitten_speed: 20.0,
            snowman_speed: 10.0,
            lateral_speed: 15.0,
            lateral_limit: 18.0,
            jump_velocity: 12.0,
            ground_tolerance: 0.5,
            projectile_speed: 40.0,
            projectile_lift: 4.0,
            projectile_radius: 0.5,
        }
    }
}

/// Configuration for the whole simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seeds: SeedTable,
    pub terrain: TerrainConfig,
    pub streaming: StreamingConfig,
    pub spawn: SpawnConfig,
    pub biomes: AHashMap<BiomeKind, BiomeRules>,
    pub enemies: AHashMap<EnemyKind, EnemyStats>,
    pub ai: AiConfig,
    pub physics: PhysicsConfig,
    pub combat: CombatConfig,
    pub player: PlayerConfig,
    /// Depth at which the boss arena milestone fires
    pub boss_spawn_z: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let common = vec![
            (EnemyKind::Snowman, 0.63),
            (EnemyKind::PolarBear, 0.27),
            (EnemyKind::GlitchImp, 0.10),
        ];

        let mut biomes = AHashMap::new();
        biomes.insert(
            BiomeKind::OpenSlope,
            BiomeRules {
                min_enemies: 2,
                max_enemies: 4,
                enemy_weights: common.clone(),
                collectible_chance: 0.2,
            },
        );
        biomes.insert(
            BiomeKind::IceCave,
            BiomeRules {
                min_enemies: 2,
                max_enemies: 6,
                enemy_weights: vec![(EnemyKind::Snowman, 0.6), (EnemyKind::GlitchImp, 0.4)],
                collectible_chance: 0.2,
            },
        );
        biomes.insert(
            BiomeKind::FrozenRink,
            BiomeRules {
                min_enemies: 2,
                max_enemies: 5,
                enemy_weights: vec![(EnemyKind::Snowman, 1.0)],
                collectible_chance: 0.2,
            },
        );
        biomes.insert(
            BiomeKind::CocoaValley,
            BiomeRules {
                min_enemies: 2,
                max_enemies: 4,
                enemy_weights: common,
                collectible_chance: 1.0,
            },
        );
        biomes.insert(
            BiomeKind::Summit,
            BiomeRules {
                min_enemies: 0,
                max_enemies: 0,
                enemy_weights: vec![(EnemyKind::Snowman, 1.0)],
                collectible_chance: 0.0,
            },
        );

        let mut enemies = AHashMap::new();
        enemies.insert(
            EnemyKind::Snowman,
            EnemyStats { max_speed: 5.0, radius: 1.0, score: 100, patrols: false },
        );
        enemies.insert(
            EnemyKind::PolarBear,
            EnemyStats { max_speed: 8.0, radius: 1.5, score: 300, patrols: false },
        );
        enemies.insert(
            EnemyKind::GlitchImp,
            EnemyStats { max_speed: 12.0, radius: 0.5, score: 500, patrols: true },
        );

        Self {
            seeds: SeedTable::default(),
            terrain: TerrainConfig::default(),
            streaming: StreamingConfig::default(),
            spawn: SpawnConfig::default(),
            biomes,
            enemies,
            ai: AiConfig::default(),
            physics: PhysicsConfig::default(),
            combat: CombatConfig::default(),
            player: PlayerConfig::default(),
            boss_spawn_z: 1000.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; absent keys keep their defaults
    ///
    /// The document is layered over the serialized defaults, so overriding
    /// one biome or one enemy field leaves every other entry intact.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let overrides: toml::Table = toml::from_str(content)?;
        let mut merged = toml::Value::try_from(Self::default())?;
        if let toml::Value::Table(base) = &mut merged {
            merge_tables(base, overrides);
        }

        let config: Self = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Spawn rules for a biome. Validation guarantees every biome is present.
    pub fn biome_rules(&self, biome: BiomeKind) -> &BiomeRules {
        self.biomes
            .get(&biome)
            .unwrap_or_else(|| panic!("no spawn rules for {biome:?}; config was not validated"))
    }

    /// Stats for an enemy kind. Validation guarantees every kind is present.
    pub fn enemy_stats(&self, kind: EnemyKind) -> &EnemyStats {
        self.enemies
            .get(&kind)
            .unwrap_or_else(|| panic!("no stats for {kind:?}; config was not validated"))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SimError::Config(msg));

        if self.streaming.chunk_size <= 0.0 {
            return fail(format!("chunk_size ({}) must be positive", self.streaming.chunk_size));
        }
        if self.streaming.visible_chunks == 0 {
            return fail("visible_chunks must be at least 1".into());
        }
        if self.spawn.edge_margin * 2.0 >= self.streaming.chunk_size {
            return fail(format!(
                "edge_margin ({}) leaves no room inside a chunk of {}",
                self.spawn.edge_margin, self.streaming.chunk_size
            ));
        }
        if self.physics.max_dt <= 0.0 {
            return fail("max_dt must be positive".into());
        }
        if self.ai.disengage_radius <= self.ai.engage_radius {
            return fail(format!(
                "disengage_radius ({}) must exceed engage_radius ({})",
                self.ai.disengage_radius, self.ai.engage_radius
            ));
        }
        if self.terrain.octaves.is_empty() {
            return fail("terrain needs at least one noise octave".into());
        }

        if self.terrain.bands.is_empty() {
            return fail("biome band table is empty".into());
        }
        for band in &self.terrain.bands {
            if band.min >= band.max {
                return fail(format!("biome band for {:?} is empty or inverted", band.biome));
            }
        }
        for pair in self.terrain.bands.windows(2) {
            if pair[0].max > pair[1].min {
                return fail(format!(
                    "biome bands {:?} and {:?} overlap or are out of order",
                    pair[0].biome, pair[1].biome
                ));
            }
        }

        for kind in EnemyKind::ALL {
            if !self.enemies.contains_key(&kind) {
                return fail(format!("missing enemy stats for {kind:?}"));
            }
        }
        for biome in BiomeKind::ALL {
            let Some(rules) = self.biomes.get(&biome) else {
                return fail(format!("missing spawn rules for {biome:?}"));
            };
            if rules.min_enemies > rules.max_enemies {
                return fail(format!("{biome:?} enemy count range is inverted"));
            }
            if rules.enemy_weights.is_empty() {
                return fail(format!("{biome:?} enemy weight table is empty"));
            }
            if rules.enemy_weights.iter().any(|(_, w)| *w <= 0.0) {
                return fail(format!("{biome:?} enemy weights must be positive"));
            }
        }

        Ok(())
    }
}

/// Recursively overlay `overrides` onto `base`; tables merge, values replace
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_hysteresis_band_required() {
        let mut config = SimulationConfig::default();
        config.ai.disengage_radius = config.ai.engage_radius;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let mut config = SimulationConfig::default();
        config.terrain.bands[1].max = 0.45;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_weight_table_rejected() {
        let mut config = SimulationConfig::default();
        config
            .biomes
            .get_mut(&BiomeKind::IceCave)
            .unwrap()
            .enemy_weights
            .clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            boss_spawn_z = 500.0

            [streaming]
            visible_chunks = 3

            [ai]
            engage_radius = 30.0
            disengage_radius = 45.0
            "#,
        )
        .unwrap();

        assert_eq!(config.streaming.visible_chunks, 3);
        assert_eq!(config.streaming.chunk_size, 100.0);
        assert_eq!(config.ai.engage_radius, 30.0);
        assert_eq!(config.boss_spawn_z, 500.0);
        assert_eq!(config.enemy_stats(EnemyKind::PolarBear).score, 300);
    }

    #[test]
    fn test_single_biome_override_keeps_other_biomes() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [biomes.IceCave]
            min_enemies = 1
            max_enemies = 2
            enemy_weights = [["GlitchImp", 1.0]]
            collectible_chance = 0.5
            "#,
        )
        .unwrap();

        let cave = config.biome_rules(BiomeKind::IceCave);
        assert_eq!(cave.max_enemies, 2);
        assert_eq!(cave.enemy_weights, vec![(EnemyKind::GlitchImp, 1.0)]);
        assert_eq!(config.biome_rules(BiomeKind::OpenSlope).max_enemies, 4);
        assert_eq!(config.biome_rules(BiomeKind::Summit).max_enemies, 0);
    }

    #[test]
    fn test_single_enemy_field_override() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [enemies.Snowman]
            max_speed = 6.0
            "#,
        )
        .unwrap();

        let snowman = config.enemy_stats(EnemyKind::Snowman);
        assert_eq!(snowman.max_speed, 6.0);
        assert_eq!(snowman.radius, 1.0);
        assert_eq!(snowman.score, 100);
        assert_eq!(config.enemy_stats(EnemyKind::GlitchImp).score, 500);
        assert!(config.enemy_stats(EnemyKind::GlitchImp).patrols);
    }

    #[test]
    fn test_defaults_survive_toml_layering() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        let defaults = SimulationConfig::default();
        assert_eq!(config.terrain.slope_coefficient, defaults.terrain.slope_coefficient);
        assert_eq!(config.terrain.bands, defaults.terrain.bands);
        assert_eq!(config.seeds, defaults.seeds);
        assert_eq!(config.player.spawn, defaults.player.spawn);
    }

    #[test]
    fn test_invalid_toml_reports_error() {
        let err = SimulationConfig::from_toml_str("[ai]\nengage_radius = 50.0").unwrap_err();
        assert!(err.to_string().contains("disengage_radius"));
    }
}
