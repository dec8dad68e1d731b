//! Broad-phase spatial index.
//!
//! A uniform grid over axis-aligned bounding boxes. Each entity is filed
//! under every cell its box touches, so a box query only has to look at the
//! cells it covers instead of every body in the world.

use crate::collision::Collider;
use crate::components::{Geometry, Position, Shape};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Square box of half-width `half_extent` around `(x, y)`.
    pub fn around(x: f32, y: f32, half_extent: f32) -> Self {
        Self::new(x - half_extent, y - half_extent, x + half_extent, y + half_extent)
    }

    /// Overlap test, touching edges included.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite()
    }
}

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub aabb: Aabb,
}

/// Grid-based broad phase.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f32,
    /// Map from cell coordinates to the entries touching that cell.
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    /// Reverse lookup: entity to its bounding box.
    entity_bounds: HashMap<Entity, Aabb>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entity_bounds: HashMap::new(),
        }
    }

    /// Convert world coordinates to cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Drop all entries (start of every rebuild).
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entity_bounds.clear();
    }

    /// File `entity` under every cell `aabb` touches. Non-finite boxes are ignored.
    pub fn insert(&mut self, entity: Entity, aabb: Aabb) {
        if !aabb.is_finite() {
            return;
        }
        if self.entity_bounds.contains_key(&entity) {
            self.remove(entity);
        }

        let entry = SpatialEntry { entity, aabb };
        let (min_cx, min_cy) = self.world_to_cell(aabb.min_x, aabb.min_y);
        let (max_cx, max_cy) = self.world_to_cell(aabb.max_x, aabb.max_y);
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                self.cells.entry((cx, cy)).or_default().push(entry);
            }
        }
        self.entity_bounds.insert(entity, aabb);
    }

    /// Remove an entity from every cell it occupies.
    pub fn remove(&mut self, entity: Entity) {
        if let Some(aabb) = self.entity_bounds.remove(&entity) {
            let (min_cx, min_cy) = self.world_to_cell(aabb.min_x, aabb.min_y);
            let (max_cx, max_cy) = self.world_to_cell(aabb.max_x, aabb.max_y);
            for cx in min_cx..=max_cx {
                for cy in min_cy..=max_cy {
                    if let Some(entries) = self.cells.get_mut(&(cx, cy)) {
                        entries.retain(|e| e.entity != entity);
                    }
                }
            }
        }
    }

    /// All entries whose box overlaps `aabb`, each reported once.
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<SpatialEntry> {
        let (min_cx, min_cy) = self.world_to_cell(aabb.min_x, aabb.min_y);
        let (max_cx, max_cy) = self.world_to_cell(aabb.max_x, aabb.max_y);

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                if let Some(entries) = self.cells.get(&(cx, cy)) {
                    for entry in entries {
                        if entry.aabb.overlaps(aabb) && seen.insert(entry.entity) {
                            results.push(*entry);
                        }
                    }
                }
            }
        }
        results
    }

    /// Broad-phase candidates for `entity`: every other entity whose box
    /// overlaps its box. Order is unspecified. Empty if `entity` isn't indexed.
    pub fn potentials(&self, entity: Entity) -> Vec<Entity> {
        match self.entity_bounds.get(&entity) {
            Some(aabb) => self
                .query_aabb(aabb)
                .into_iter()
                .map(|e| e.entity)
                .filter(|&e| e != entity)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Bounding box recorded for `entity` at the last rebuild.
    pub fn bounds_of(&self, entity: Entity) -> Option<Aabb> {
        self.entity_bounds.get(&entity).copied()
    }

    /// Get count of entries in a cell.
    pub fn cell_count(&self, cell: (i32, i32)) -> usize {
        self.cells.get(&cell).map(|v| v.len()).unwrap_or(0)
    }

    /// Get total entity count.
    pub fn total_count(&self) -> usize {
        self.entity_bounds.len()
    }

    /// Get all cells (for debugging/visualization).
    pub fn all_cells(&self) -> impl Iterator<Item = (&(i32, i32), &Vec<SpatialEntry>)> {
        self.cells.iter()
    }
}

/// System that rebuilds the broad phase from every body and shape.
/// Runs once per tick, after motion and before collision resolution.
pub fn spatial_index_update_system(
    mut grid: ResMut<SpatialGrid>,
    bodies: Query<(Entity, &Position, &Geometry)>,
    shapes: Query<(Entity, &Position, &Shape)>,
) {
    grid.clear();

    for (entity, pos, geometry) in bodies.iter() {
        grid.insert(entity, Collider::for_body(pos, geometry).aabb());
    }
    for (entity, origin, shape) in shapes.iter() {
        grid.insert(entity, Collider::for_shape(origin, shape).aabb());
    }
}
