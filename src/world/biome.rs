//! Biome classification

use serde::{Deserialize, Serialize};

/// Terrain and gameplay style of a stretch of mountain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BiomeKind {
    /// Default rolling snow slope
    OpenSlope,
    /// Narrow channel between steep ice walls
    IceCave,
    /// Flat frozen lake
    FrozenRink,
    /// Bowl-shaped valley where cocoa always spawns
    CocoaValley,
    /// Plateau at extreme depth; no enemies
    Summit,
}

impl BiomeKind {
    pub const ALL: [BiomeKind; 5] = [
        BiomeKind::OpenSlope,
        BiomeKind::IceCave,
        BiomeKind::FrozenRink,
        BiomeKind::CocoaValley,
        BiomeKind::Summit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BiomeKind::OpenSlope => "open_slope",
            BiomeKind::IceCave => "ice_cave",
            BiomeKind::FrozenRink => "frozen_rink",
            BiomeKind::CocoaValley => "cocoa_valley",
            BiomeKind::Summit => "summit",
        }
    }
}

impl std::fmt::Display for BiomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
