//! Avalanche Run - deterministic world streaming and entity simulation
//!
//! A player descends an endless procedurally generated mountain. Terrain,
//! chunk content and every gameplay decision are reproducible from a seed
//! table.

pub mod core;
pub mod ecs;
pub mod session;
pub mod simulation;
pub mod spatial;
pub mod world;
