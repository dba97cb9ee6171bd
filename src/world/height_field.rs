//! Terrain height and biome lookup
//!
//! A `HeightField` owns a Perlin detail field and a Simplex biome selector,
//! both seeded from the terrain stream when the simulation is built. Both
//! lookups are pure: they read the fields and the terrain config and nothing
//! else, so any caller in any order gets the same answer for the same
//! arguments.
//!
//! The selector is Simplex because its skewed lattice does not line up with
//! chunk centres; a Perlin selector sampled on the chunk grid only ever sees
//! a couple of lattice offsets and never leaves a narrow value range.

use noise::{NoiseFn, Perlin, Seedable, Simplex};
use rand::RngCore;

use crate::core::config::TerrainConfig;
use crate::core::rng::SeededRng;
use crate::world::biome::BiomeKind;

/// Pure (x, z, biome) -> height mapping
#[derive(Clone)]
pub struct HeightField {
    noise: Perlin,
    selector: Simplex,
    config: TerrainConfig,
    /// Biome granularity along z; zero means per-point lookup
    biome_cell: f32,
}

impl HeightField {
    /// Seed the field from the terrain stream. Consumes exactly one draw.
    pub fn new(config: TerrainConfig, terrain_rng: &mut SeededRng) -> Self {
        Self::with_seed(config, terrain_rng.next_u32())
    }

    pub fn with_seed(config: TerrainConfig, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            selector: Simplex::new(seed.wrapping_add(1)),
            config,
            biome_cell: 0.0,
        }
    }

    /// Resolve biomes once per cell of `size` along z, at the cell centre
    ///
    /// With the chunk size as the cell, the ground physics reads is the
    /// ground the chunk was spawned on.
    pub fn with_biome_cell(mut self, size: f32) -> Self {
        self.biome_cell = size.max(0.0);
        self
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    #[inline]
    fn sample(&self, x: f32, z: f32) -> f32 {
        self.noise.get([x as f64, z as f64]) as f32
    }

    /// Raw value of the low-frequency biome selector at depth `z`
    pub fn biome_noise(&self, z: f32) -> f32 {
        let z = (z * self.config.biome_noise_scale) as f64;
        self.selector.get([0.0, z]) as f32
    }

    #[inline]
    fn biome_sample_z(&self, z: f32) -> f32 {
        if self.biome_cell > 0.0 {
            ((z / self.biome_cell).floor() + 0.5) * self.biome_cell
        } else {
            z
        }
    }

    /// Biome at depth `z`. Summit overrides every band past the summit depth.
    pub fn biome_at(&self, z: f32) -> BiomeKind {
        if z >= self.config.summit_depth {
            return BiomeKind::Summit;
        }

        let n = self.biome_noise(self.biome_sample_z(z));
        self.config
            .bands
            .iter()
            .find(|band| n >= band.min && n < band.max)
            .map(|band| band.biome)
            .unwrap_or(BiomeKind::OpenSlope)
    }

    /// Multi-octave detail noise before any biome shaping
    fn detail(&self, x: f32, z: f32) -> f32 {
        self.config
            .octaves
            .iter()
            .map(|o| self.sample(x * o.frequency_x, z * o.frequency_z) * o.amplitude)
            .sum()
    }

    /// The downhill plane every biome is built on
    #[inline]
    pub fn slope_at(&self, z: f32) -> f32 {
        -z * self.config.slope_coefficient
    }

    /// Terrain height at (x, z) shaped for `biome`
    pub fn height_at(&self, x: f32, z: f32, biome: BiomeKind) -> f32 {
        let slope = self.slope_at(z);
        let cfg = &self.config;

        match biome {
            BiomeKind::OpenSlope => slope + self.detail(x, z),
            BiomeKind::IceCave => {
                let walls = (x.abs() - cfg.cave_half_width).max(0.0) * cfg.cave_wall_steepness;
                slope + self.detail(x, z) * 0.4 + walls
            }
            BiomeKind::FrozenRink => slope,
            BiomeKind::CocoaValley => {
                slope + self.detail(x, z) * 0.6 + cfg.valley_curvature * x * x
            }
            BiomeKind::Summit => slope + cfg.summit_plateau + self.detail(x, z) * 0.05,
        }
    }

    /// Ground height using the biome found at `z`
    pub fn ground_at(&self, x: f32, z: f32) -> f32 {
        self.height_at(x, z, self.biome_at(z))
    }

    /// Height below which the world ends at depth `z`
    pub fn floor_at(&self, z: f32) -> f32 {
        self.slope_at(z) - self.config.world_floor_depth
    }
}

impl std::fmt::Debug for HeightField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeightField")
            .field("seed", &self.noise.seed())
            .field("biome_cell", &self.biome_cell)
            .finish()
    }
}
