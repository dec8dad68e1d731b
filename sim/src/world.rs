//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the simulation state
//! that a renderer can draw without touching the ECS world.

use crate::bounds::Bounds;
use crate::components::*;
use crate::config::SimConfig;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Geometry as the renderer needs it: sizes and world-space vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GeometrySnapshot {
    Point,
    Circle { diameter: f32 },
    Polygon { vertices: Vec<(f32, f32)> },
}

impl GeometrySnapshot {
    pub fn of(pos: &Position, geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point => GeometrySnapshot::Point,
            Geometry::Circle { radius } => GeometrySnapshot::Circle {
                diameter: radius * 2.0,
            },
            Geometry::Polygon { .. } => GeometrySnapshot::Polygon {
                vertices: geometry
                    .world_vertices(pos)
                    .into_iter()
                    .map(|v| (v.x, v.y))
                    .collect(),
            },
        }
    }
}

/// Snapshot of a single body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub geometry: GeometrySnapshot,
    pub stuck: bool,
    pub age: u32,
}

/// Snapshot of a static shape, points in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSnapshot {
    pub id: u32,
    pub points: Vec<(f32, f32)>,
    pub closed: bool,
}

/// Display toggles. They have no effect on the simulation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub show_walkers: bool,
    pub show_clusters: bool,
    pub show_shapes: bool,
}

impl Visibility {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            show_walkers: config.show_walkers,
            show_clusters: config.show_clusters,
            show_shapes: config.show_shapes,
        }
    }
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Completed ticks.
    pub tick: u64,
    pub paused: bool,
    /// Value of the active-walker counter.
    pub active_walkers: usize,
    pub bounds: Bounds,
    pub visibility: Visibility,
    /// All bodies, ordered by id.
    pub bodies: Vec<BodySnapshot>,
    /// All shapes, ordered by id.
    pub shapes: Vec<ShapeSnapshot>,
    /// Cluster lines in the order they formed.
    pub lines: Vec<ClusterLine>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, paused: bool) -> Self {
        let mut body_query = world.query::<(&BodyId, &Position, &Geometry, &Stuck, &Age)>();
        let mut bodies: Vec<BodySnapshot> = body_query
            .iter(world)
            .map(|(id, pos, geometry, stuck, age)| BodySnapshot {
                id: id.0,
                x: pos.x,
                y: pos.y,
                geometry: GeometrySnapshot::of(pos, geometry),
                stuck: stuck.is_stuck(),
                age: age.0,
            })
            .collect();
        bodies.sort_by_key(|b| b.id);

        let mut shape_query = world.query::<(&ShapeId, &Position, &Shape)>();
        let mut shapes: Vec<ShapeSnapshot> = shape_query
            .iter(world)
            .map(|(id, origin, shape)| ShapeSnapshot {
                id: id.0,
                points: shape
                    .world_points(origin)
                    .into_iter()
                    .map(|p| (p.x, p.y))
                    .collect(),
                closed: shape.is_closed(),
            })
            .collect();
        shapes.sort_by_key(|s| s.id);

        Self {
            tick,
            paused,
            active_walkers: world.resource::<ActiveWalkers>().0,
            bounds: *world.resource::<Bounds>(),
            visibility: Visibility::from_config(world.resource::<SimConfig>()),
            bodies,
            shapes,
            lines: world.resource::<ClusterLines>().0.clone(),
        }
    }

    /// Bodies still walking.
    pub fn walkers(&self) -> impl Iterator<Item = &BodySnapshot> {
        self.bodies.iter().filter(|b| !b.stuck)
    }

    /// Bodies that belong to the cluster.
    pub fn cluster(&self) -> impl Iterator<Item = &BodySnapshot> {
        self.bodies.iter().filter(|b| b.stuck)
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_snapshot_reports_size_and_vertices() {
        let pos = Position::new(10.0, 0.0);
        assert_eq!(
            GeometrySnapshot::of(&pos, &Geometry::circle(6.0)),
            GeometrySnapshot::Circle { diameter: 6.0 }
        );
        let square = Geometry::Polygon {
            vertices: vec![(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)],
            rotation: 0.0,
        };
        let GeometrySnapshot::Polygon { vertices } = GeometrySnapshot::of(&pos, &square) else {
            panic!("expected polygon");
        };
        assert_eq!(vertices[0], (11.0, 0.0));
    }

    #[test]
    fn test_geometry_kind_is_tagged_in_json() {
        let json = serde_json::to_string(&GeometrySnapshot::Circle { diameter: 4.0 }).unwrap();
        assert_eq!(json, r#"{"kind":"Circle","diameter":4.0}"#);
        let json = serde_json::to_string(&GeometrySnapshot::Point).unwrap();
        assert_eq!(json, r#"{"kind":"Point"}"#);
    }
}
