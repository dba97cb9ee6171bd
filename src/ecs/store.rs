//! Entity store - owns every live entity
//!
//! Entities are kept in id order and additionally indexed by signature
//! (kind + component set). The index is updated on every add and remove, so
//! a query always reflects the store as it is at the moment it is taken.
//!
//! Queries return an owned, id-ordered snapshot. Systems that remove entities
//! while walking a snapshot re-check liveness with `get`/`contains`, which
//! makes a removed entity invisible to the rest of the pass.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::core::types::EntityId;
use crate::ecs::entity::{Components, Entity, EntityBlueprint, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Signature {
    kind: EntityKind,
    components: Components,
}

/// Filter for `EntityStore::query`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Query {
    kind: Option<EntityKind>,
    with: Components,
}

impl Query {
    /// Every entity
    pub fn all() -> Self {
        Self::default()
    }

    /// Entities of one kind
    pub fn kind(kind: EntityKind) -> Self {
        Self {
            kind: Some(kind),
            with: Components::NONE,
        }
    }

    /// Additionally require these components
    pub fn with(mut self, components: Components) -> Self {
        self.with |= components;
        self
    }

    fn matches(&self, sig: &Signature) -> bool {
        self.kind.map_or(true, |k| k == sig.kind) && sig.components.contains(self.with)
    }
}

#[derive(Debug, Default)]
pub struct EntityStore {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    index: AHashMap<Signature, BTreeSet<EntityId>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity and return its handle
    pub fn add(&mut self, blueprint: EntityBlueprint) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        let entity = Entity::from_blueprint(id, blueprint);

        let sig = Signature {
            kind: entity.kind(),
            components: entity.components(),
        };
        self.index.entry(sig).or_default().insert(id);
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity; unknown handles are ignored
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        let sig = Signature {
            kind: entity.kind(),
            components: entity.components(),
        };
        if let Some(ids) = self.index.get_mut(&sig) {
            ids.remove(&id);
            if ids.is_empty() {
                self.index.remove(&sig);
            }
        }
        Some(entity)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Id-ordered snapshot of the entities matching `query`
    pub fn query(&self, query: Query) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .index
            .iter()
            .filter(|(sig, _)| query.matches(sig))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        // Each id lives under exactly one signature, so sorting is enough.
        ids.sort_unstable();
        ids
    }

    /// Lowest-id entity matching `query`
    pub fn first(&self, query: Query) -> Option<EntityId> {
        self.index
            .iter()
            .filter(|(sig, _)| query.matches(sig))
            .filter_map(|(_, ids)| ids.first().copied())
            .min()
    }

    /// Read-only view for collaborators such as a renderer
    pub fn view(&self, query: Query) -> impl Iterator<Item = &Entity> + '_ {
        self.query(query)
            .into_iter()
            .filter_map(move |id| self.entities.get(&id))
    }

    pub fn count(&self, query: Query) -> usize {
        self.index
            .iter()
            .filter(|(sig, _)| query.matches(sig))
            .map(|(_, ids)| ids.len())
            .sum()
    }
}
