//! Sparse hash grid for neighbor queries on the ground plane

use ahash::AHashMap;
use glam::Vec2;

use crate::core::types::EntityId;

/// Sparse hash grid; a radius query scans the 3x3 cells around the center,
/// so it is exact for radii up to the cell size.
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<(EntityId, Vec2)>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, entity: EntityId, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push((entity, pos));
    }

    /// All entries in the 3x3 neighborhood, in a fixed cell order
    pub fn query_neighbors(&self, pos: Vec2) -> impl Iterator<Item = (EntityId, Vec2)> + '_ {
        let (cx, cy) = self.cell_coord(pos);

        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Entries strictly within `radius` of `center`
    pub fn query_radius(&self, center: Vec2, radius: f32) -> impl Iterator<Item = (EntityId, Vec2)> + '_ {
        let radius_sq = radius * radius;
        self.query_neighbors(center)
            .filter(move |(_, pos)| center.distance_squared(*pos) < radius_sq)
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, entities: impl Iterator<Item = (EntityId, Vec2)>) {
        self.clear();
        for (entity, pos) in entities {
            self.insert(entity, pos);
        }
    }
}
