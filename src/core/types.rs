//! Core type definitions used throughout the codebase

use derive_more::Display;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Unique identifier for simulation entities
///
/// Ids are handed out monotonically by the entity store and never reused
/// within a run, so iteration in id order is spawn order.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "#{}", _0)]
pub struct EntityId(pub u64);

/// Simulation tick counter
pub type Tick = u64;

/// Integer key of a world chunk along the depth axis
pub type ChunkIndex = i64;

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn ground_plane(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Lift a ground-plane vector back to 3D with the given vertical component
#[inline]
pub fn from_ground_plane(v: Vec2, y: f32) -> Vec3 {
    Vec3::new(v.x, y, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_ordering_follows_value() {
        assert!(EntityId(1) < EntityId(2));
        assert_eq!(EntityId(7).to_string(), "#7");
    }

    #[test]
    fn test_ground_plane_round_trip_keeps_height() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let flat = ground_plane(v);
        assert_eq!(flat, Vec2::new(1.0, 3.0));
        assert_eq!(from_ground_plane(flat, 2.0), v);
    }
}
