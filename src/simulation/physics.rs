//! Physics - gravity, ground contact and integration
//!
//! Only vertical free-fall against the terrain is modelled. Everything else
//! (steering, player control) arrives here as a velocity.

use crate::core::config::PhysicsConfig;
use crate::core::types::EntityId;
use crate::ecs::entity::{Components, EntityKind};
use crate::ecs::store::{EntityStore, Query};
use crate::world::height_field::HeightField;

/// Integrate every moving entity by one step
///
/// Returns the projectiles that fell out of the world and were removed.
pub fn update(store: &mut EntityStore, field: &HeightField, config: &PhysicsConfig, dt: f32) -> Vec<EntityId> {
    let dt = dt.clamp(0.0, config.max_dt);
    let mut fell_out = Vec::new();

    for id in store.query(Query::all().with(Components::VELOCITY)) {
        let Some(entity) = store.get_mut(id) else {
            continue;
        };
        let Some(mut velocity) = entity.velocity() else {
            continue;
        };
        let mut position = entity.position;
        let is_projectile = entity.kind() == EntityKind::Projectile;

        if entity.gravity_enabled() {
            if is_projectile {
                // Snowballs sink into the snow; the world floor removes them.
                velocity.y -= config.gravity * dt;
            } else {
                let ground = field.ground_at(position.x, position.z);
                if position.y > ground {
                    velocity.y -= config.gravity * dt;
                } else if velocity.y <= 0.0 {
                    velocity.y = 0.0;
                    position.y = ground;
                }
            }
        }

        position += velocity * dt;

        entity.position = position;
        if let Some(v) = entity.velocity_mut() {
            *v = velocity;
        }

        if is_projectile && position.y < field.floor_at(position.z) {
            fell_out.push(id);
        }
    }

    for id in &fell_out {
        store.remove(*id);
    }
    fell_out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TerrainConfig;
    use crate::ecs::entity::{CollectibleKind, EntityBlueprint};
    use glam::Vec3;

    fn flat_field() -> HeightField {
        HeightField::with_seed(
            TerrainConfig {
                octaves: vec![],
                slope_coefficient: 0.0,
                ..TerrainConfig::default()
            },
            1,
        )
    }

    #[test]
    fn test_dt_is_clamped() {
        let field = flat_field();
        let mut store = EntityStore::new();
        let id = store.add(EntityBlueprint::projectile(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 0.0, 10.0), 0.5));

        update(&mut store, &field, &PhysicsConfig::default(), 5.0);

        let entity = store.get(id).unwrap();
        assert!((entity.position.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_grounded_entity_stays_on_ground() {
        let field = flat_field();
        let mut store = EntityStore::new();
        let id = store.add(EntityBlueprint::player(Vec3::ZERO, 1.0));

        for _ in 0..10 {
            update(&mut store, &field, &PhysicsConfig::default(), 1.0 / 60.0);
        }

        let entity = store.get(id).unwrap();
        assert_eq!(entity.position.y, 0.0);
        assert_eq!(entity.velocity().unwrap().y, 0.0);
    }

    #[test]
    fn test_upward_velocity_survives_ground_contact() {
        let field = flat_field();
        let mut store = EntityStore::new();
        let mut bp = EntityBlueprint::player(Vec3::ZERO, 1.0);
        bp.velocity = Some(Vec3::new(0.0, 12.0, 0.0));
        let id = store.add(bp);

        update(&mut store, &field, &PhysicsConfig::default(), 0.05);

        assert!(store.get(id).unwrap().position.y > 0.0);
    }

    #[test]
    fn test_projectile_removed_below_floor() {
        let field = flat_field();
        let mut store = EntityStore::new();
        let id = store.add(EntityBlueprint::projectile(
            Vec3::new(0.0, -49.9, 0.0),
            Vec3::new(0.0, -10.0, 0.0),
            0.5,
        ));

        let removed = update(&mut store, &field, &PhysicsConfig::default(), 0.1);

        assert_eq!(removed, vec![id]);
        assert!(!store.contains(id));
    }

    #[test]
    fn test_static_entities_are_untouched() {
        let field = flat_field();
        let mut store = EntityStore::new();
        let id = store.add(EntityBlueprint::collectible(CollectibleKind::Cocoa, Vec3::new(1.0, 5.0, 1.0), 0.8));

        update(&mut store, &field, &PhysicsConfig::default(), 0.1);

        assert_eq!(store.get(id).unwrap().position, Vec3::new(1.0, 5.0, 1.0));
    }
}
