//! Narrow-phase collision tests.
//!
//! Bodies and shapes are turned into world-space [`Collider`]s and every pair
//! is decided in one place, [`Collider::touches`]. Overlap includes touching.
//!
//! Point geometry has no area, so it collides by adjacency instead:
//! - point / point: neighbouring lattice sites (Chebyshev distance <= 1)
//! - point / circle: the point lies within the circle
//! - point / polygon or segment: inside the polygon, or within
//!   [`POINT_REACH`] of one of its edges
//!
//! Polygons may be concave (imported shapes often are), so polygon pairs are
//! tested by edge intersection plus containment rather than by separating axes.

use crate::components::{Geometry, Position, Shape};
use crate::spatial::Aabb;
use glam::Vec2;

/// How far a point body reaches when testing adjacency against edges.
pub const POINT_REACH: f32 = 1.0;

/// World-space collision primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Point(Vec2),
    Circle { center: Vec2, radius: f32 },
    /// Closed polygon, vertices in order.
    Polygon(Vec<Vec2>),
    /// Open line segment.
    Segment(Vec2, Vec2),
}

impl Collider {
    pub fn for_body(pos: &Position, geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point => Collider::Point(pos.as_vec2()),
            Geometry::Circle { radius } => Collider::Circle {
                center: pos.as_vec2(),
                radius: *radius,
            },
            Geometry::Polygon { .. } => Collider::Polygon(geometry.world_vertices(pos)),
        }
    }

    pub fn for_shape(origin: &Position, shape: &Shape) -> Self {
        let mut points = shape.world_points(origin);
        match shape {
            Shape::Segment { .. } => {
                let b = points.pop().unwrap_or(origin.as_vec2());
                let a = points.pop().unwrap_or(b);
                Collider::Segment(a, b)
            }
            Shape::Polygon { .. } => Collider::Polygon(points),
        }
    }

    /// Bounding box used by the broad phase.
    pub fn aabb(&self) -> Aabb {
        match self {
            Collider::Point(p) => Aabb::around(p.x, p.y, POINT_REACH),
            Collider::Circle { center, radius } => Aabb::around(center.x, center.y, *radius),
            Collider::Polygon(points) => points_aabb(points),
            Collider::Segment(a, b) => points_aabb(&[*a, *b]),
        }
    }

    /// Whether the two colliders overlap (or, for points, are adjacent).
    pub fn touches(&self, other: &Collider) -> bool {
        use Collider::*;
        match (self, other) {
            (Point(a), Point(b)) => (a.x - b.x).abs() <= 1.0 && (a.y - b.y).abs() <= 1.0,
            (Point(p), Circle { center, radius }) | (Circle { center, radius }, Point(p)) => {
                p.distance_squared(*center) <= radius * radius
            }
            (Point(p), edged) | (edged, Point(p)) => edged.within(*p, POINT_REACH),
            (Circle { center: a, radius: ra }, Circle { center: b, radius: rb }) => {
                let reach = ra + rb;
                a.distance_squared(*b) <= reach * reach
            }
            (Circle { center, radius }, edged) | (edged, Circle { center, radius }) => {
                edged.within(*center, *radius)
            }
            (a, b) => {
                let (edges_a, edges_b) = (a.edges(), b.edges());
                edges_a
                    .iter()
                    .any(|ea| edges_b.iter().any(|eb| segments_intersect(ea.0, ea.1, eb.0, eb.1)))
                    || a.vertices().iter().any(|&v| b.contains(v))
                    || b.vertices().iter().any(|&v| a.contains(v))
            }
        }
    }

    /// Polygon / segment: `p` is inside, or within `reach` of an edge.
    fn within(&self, p: Vec2, reach: f32) -> bool {
        self.contains(p)
            || self
                .edges()
                .iter()
                .any(|&(a, b)| distance_squared_to_segment(p, a, b) <= reach * reach)
    }

    fn contains(&self, p: Vec2) -> bool {
        match self {
            Collider::Polygon(points) => point_in_polygon(p, points),
            _ => false,
        }
    }

    fn vertices(&self) -> Vec<Vec2> {
        match self {
            Collider::Polygon(points) => points.clone(),
            Collider::Segment(a, b) => vec![*a, *b],
            Collider::Point(p) => vec![*p],
            Collider::Circle { center, .. } => vec![*center],
        }
    }

    fn edges(&self) -> Vec<(Vec2, Vec2)> {
        match self {
            Collider::Polygon(points) if points.len() == 1 => vec![(points[0], points[0])],
            Collider::Polygon(points) => points
                .iter()
                .zip(points.iter().cycle().skip(1))
                .map(|(&a, &b)| (a, b))
                .collect(),
            Collider::Segment(a, b) => vec![(*a, *b)],
            _ => Vec::new(),
        }
    }
}

fn points_aabb(points: &[Vec2]) -> Aabb {
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for p in points {
        min = min.min(*p);
        max = max.max(*p);
    }
    Aabb::new(min.x, min.y, max.x, max.y)
}

/// Even-odd ray cast.
fn point_in_polygon(p: Vec2, points: &[Vec2]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_squared_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a + ab * t)
}

fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = (q2 - q1).perp_dot(p1 - q1);
    let d2 = (q2 - q1).perp_dot(p2 - q1);
    let d3 = (p2 - p1).perp_dot(q1 - p1);
    let d4 = (p2 - p1).perp_dot(q2 - p1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear / endpoint-touching cases.
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f32, cy: f32, half: f32) -> Collider {
        Collider::Polygon(vec![
            Vec2::new(cx - half, cy - half),
            Vec2::new(cx + half, cy - half),
            Vec2::new(cx + half, cy + half),
            Vec2::new(cx - half, cy + half),
        ])
    }

    fn circle(x: f32, y: f32, radius: f32) -> Collider {
        Collider::Circle {
            center: Vec2::new(x, y),
            radius,
        }
    }

    #[test]
    fn circles_overlap_within_sum_of_radii() {
        assert!(circle(100.0, 100.0, 5.0).touches(&circle(104.0, 100.0, 5.0)));
        assert!(circle(0.0, 0.0, 5.0).touches(&circle(10.0, 0.0, 5.0)));
        assert!(!circle(0.0, 0.0, 5.0).touches(&circle(10.5, 0.0, 5.0)));
    }

    #[test]
    fn circle_against_polygon_checks_edges_and_interior() {
        let sq = square(0.0, 0.0, 10.0);
        assert!(circle(13.0, 0.0, 3.5).touches(&sq));
        assert!(sq.touches(&circle(0.0, 0.0, 1.0)));
        assert!(!circle(15.0, 0.0, 3.0).touches(&sq));
    }

    #[test]
    fn polygons_overlap_by_edges_or_containment() {
        assert!(square(0.0, 0.0, 5.0).touches(&square(8.0, 0.0, 5.0)));
        // Fully contained, no edge crossings.
        assert!(square(0.0, 0.0, 10.0).touches(&square(0.0, 0.0, 2.0)));
        assert!(!square(0.0, 0.0, 5.0).touches(&square(20.0, 0.0, 5.0)));
    }

    #[test]
    fn segment_against_polygon() {
        let seg = Collider::Segment(Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0));
        assert!(square(0.0, 3.0, 5.0).touches(&seg));
        assert!(!square(0.0, 10.0, 5.0).touches(&seg));
    }

    #[test]
    fn points_use_lattice_adjacency() {
        let p = Collider::Point(Vec2::new(10.0, 10.0));
        assert!(p.touches(&Collider::Point(Vec2::new(11.0, 11.0))));
        assert!(!p.touches(&Collider::Point(Vec2::new(12.0, 10.0))));
        assert!(p.touches(&circle(13.0, 10.0, 3.0)));
        assert!(!p.touches(&circle(14.0, 10.0, 3.0)));
    }

    #[test]
    fn point_near_segment_is_adjacent() {
        let seg = Collider::Segment(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert!(Collider::Point(Vec2::new(5.0, 0.8)).touches(&seg));
        assert!(!Collider::Point(Vec2::new(5.0, 1.5)).touches(&seg));
        assert!(seg.touches(&Collider::Point(Vec2::new(10.5, 0.0))));
    }

    #[test]
    fn concave_polygon_notch_is_outside() {
        // U shape opening upward; the notch spans x in (2, 8), y < 8.
        let u = Collider::Polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(8.0, 10.0),
            Vec2::new(8.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]);
        assert!(!u.touches(&circle(5.0, 7.0, 1.0)));
        assert!(u.touches(&circle(5.0, 1.0, 0.5)));
    }

    #[test]
    fn aabb_covers_collider() {
        let aabb = square(0.0, 0.0, 4.0).aabb();
        assert_eq!(aabb, Aabb::new(-4.0, -4.0, 4.0, 4.0));
        let aabb = Collider::Point(Vec2::new(3.0, 3.0)).aabb();
        assert_eq!(aabb, Aabb::around(3.0, 3.0, POINT_REACH));
    }
}
