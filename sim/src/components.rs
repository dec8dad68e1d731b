//! ECS components and resources for the DLA simulation.
//!
//! Components are pure data containers attached to body and shape entities.
//! All simulation logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in domain coordinates (x grows right, y grows down).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Position a body had when it was created. Distance pruning measures from here.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint(pub Position);

// ============================================================================
// BODY COMPONENTS
// ============================================================================

/// Stable identifier for a body, assigned in creation order.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Coarse geometry tag, used by queries that don't need the full shape data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Circle,
    Polygon,
}

/// Collision geometry of a body. Fixed at creation; never mutated afterwards.
///
/// Polygon vertices are relative to the body's [`Position`] and are rotated by
/// `rotation` degrees when placed in the world.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Lattice particle. Moves in whole-unit jitter steps and collides by adjacency.
    Point,
    Circle { radius: f32 },
    Polygon { vertices: Vec<(f32, f32)>, rotation: f32 },
}

impl Geometry {
    pub fn circle(diameter: f32) -> Self {
        Geometry::Circle {
            radius: diameter / 2.0,
        }
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    pub fn regular_polygon(sides: usize, radius: f32, rotation: f32) -> Self {
        let sides = sides.max(3);
        let step = std::f32::consts::TAU / sides as f32;
        let vertices = (0..sides)
            .map(|i| {
                let angle = step * i as f32;
                (radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        Geometry::Polygon { vertices, rotation }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point => GeometryKind::Point,
            Geometry::Circle { .. } => GeometryKind::Circle,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
        }
    }

    /// Polygon vertices in world space for a body at `pos`.
    /// Empty for non-polygon geometry.
    pub fn world_vertices(&self, pos: &Position) -> Vec<Vec2> {
        match self {
            Geometry::Polygon { vertices, rotation } => {
                let rot = Vec2::from_angle(rotation.to_radians());
                let origin = pos.as_vec2();
                vertices
                    .iter()
                    .map(|&(x, y)| origin + rot.rotate(Vec2::new(x, y)))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Aggregation state. `true` means the body is part of the cluster.
///
/// The flag only ever goes from `false` to `true`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stuck(pub bool);

impl Stuck {
    pub fn is_stuck(&self) -> bool {
        self.0
    }

    /// Join the cluster. Returns `true` only for the transition itself.
    pub fn stick(&mut self) -> bool {
        if self.0 {
            false
        } else {
            self.0 = true;
            true
        }
    }
}

/// Number of ticks a walker has been moving.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Age(pub u32);

impl Age {
    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }
}

/// Per-body bias that overrides the global bias mode.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BiasTarget {
    /// Drift toward an absolute point.
    Point { x: f32, y: f32 },
    /// Drift along a fixed direction.
    Vector { dx: f32, dy: f32 },
}

// ============================================================================
// SHAPE COMPONENTS
// ============================================================================

/// Stable identifier for an imported shape.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub u32);

/// Static obstacle geometry, relative to the shape's [`Position`].
///
/// Shapes never move and never change state; they are only ever collision
/// candidates for walkers.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// One open line segment of an imported polyline.
    Segment { a: (f32, f32), b: (f32, f32) },
    /// Solid closed polygon.
    Polygon { vertices: Vec<(f32, f32)> },
}

impl Shape {
    /// Shape points in world space.
    pub fn world_points(&self, origin: &Position) -> Vec<Vec2> {
        let o = origin.as_vec2();
        match self {
            Shape::Segment { a, b } => vec![o + Vec2::new(a.0, a.1), o + Vec2::new(b.0, b.1)],
            Shape::Polygon { vertices } => vertices
                .iter()
                .map(|&(x, y)| o + Vec2::new(x, y))
                .collect(),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Shape::Polygon { .. })
    }
}

// ============================================================================
// BUNDLES
// ============================================================================

/// Bundle for spawning a body (walker or cluster particle).
#[derive(Bundle)]
pub struct BodyBundle {
    pub id: BodyId,
    pub position: Position,
    pub spawn_point: SpawnPoint,
    pub geometry: Geometry,
    pub stuck: Stuck,
    pub age: Age,
}

impl BodyBundle {
    pub fn new(id: BodyId, position: Position, geometry: Geometry, stuck: bool) -> Self {
        Self {
            id,
            position,
            spawn_point: SpawnPoint(position),
            geometry,
            stuck: Stuck(stuck),
            age: Age::default(),
        }
    }
}

/// Bundle for spawning a static shape.
#[derive(Bundle)]
pub struct ShapeBundle {
    pub id: ShapeId,
    pub origin: Position,
    pub shape: Shape,
}

// ============================================================================
// RESOURCES
// ============================================================================

/// Number of bodies with `stuck == false`.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveWalkers(pub usize);

impl ActiveWalkers {
    pub fn increment(&mut self) {
        self.0 += 1;
    }

    pub fn decrement(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }
}

/// Id allocator for bodies and shapes. Reset by `remove_all`.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct NextIds {
    body: u32,
    shape: u32,
}

impl NextIds {
    /// Id the next body will receive.
    pub fn peek_body(&self) -> BodyId {
        BodyId(self.body)
    }

    pub fn next_body(&mut self) -> BodyId {
        let id = BodyId(self.body);
        self.body += 1;
        id
    }

    pub fn next_shape(&mut self) -> ShapeId {
        let id = ShapeId(self.shape);
        self.shape += 1;
        id
    }
}

/// Line from the cluster particle a walker hit to where the walker stuck.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterLine {
    pub from: Position,
    pub to: Position,
}

/// Lines captured during aggregation, in the order they formed.
#[derive(Resource, Debug, Clone, Default)]
pub struct ClusterLines(pub Vec<ClusterLine>);
