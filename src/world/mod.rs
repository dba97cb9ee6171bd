//! Procedural world: biomes, terrain height and chunk streaming

pub mod biome;
pub mod chunk;
pub mod height_field;
pub mod streamer;

pub use biome::BiomeKind;
pub use chunk::{plan_chunk, Chunk, ChunkBlueprint, SpawnDescriptor, SpawnKind};
pub use height_field::HeightField;
pub use streamer::{ChunkStreamer, StreamUpdate};
