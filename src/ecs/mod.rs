//! Entity-component storage

pub mod entity;
pub mod store;

pub use entity::{
    AiAgent, AiState, Body, CollectibleKind, Components, EnemyData, EnemyKind, Entity,
    EntityBlueprint, EntityKind, PlayerForm,
};
pub use store::{EntityStore, Query};
