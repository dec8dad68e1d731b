//! Initial cluster layouts.
//!
//! Every pattern resolves to a list of coordinates which are then turned into
//! stuck particles by [`create_cluster_from_coords`].

use crate::bounds::Bounds;
use crate::components::*;
use crate::config::{BiasMode, ClusterPattern, SimConfig, WalkerShape, WallEdge};
use crate::population::sample;
use crate::registry;
use crate::rng::SimRng;
use bevy_ecs::prelude::*;
use std::f32::consts::TAU;
use tracing::info;

/// Particles scattered by the `Random` pattern.
pub const RANDOM_SEED_COUNT: usize = 50;

/// Geometry of cluster particles: walker-sized circles, or lattice points when
/// walkers are points.
pub fn cluster_geometry(config: &SimConfig) -> Geometry {
    match config.walker_shape {
        WalkerShape::Point => Geometry::Point,
        _ => Geometry::circle(config.circle_diameter),
    }
}

/// Create one stuck particle per coordinate, clamped into the bounds.
pub fn create_cluster_from_coords(world: &mut World, coords: &[Position]) -> Vec<Entity> {
    let geometry = cluster_geometry(world.resource::<SimConfig>());
    let bounds = *world.resource::<Bounds>();
    coords
        .iter()
        .map(|&pos| registry::create_body(world, geometry.clone(), bounds.clamp_inside(pos), true))
        .collect()
}

/// Place the initial cluster for `pattern`.
pub fn seed_clusters(world: &mut World, pattern: ClusterPattern) -> Vec<Entity> {
    let config = world.resource::<SimConfig>().clone();
    let bounds = *world.resource::<Bounds>();
    let spacing = config.circle_diameter.max(1.0);

    let coords = match pattern {
        ClusterPattern::Point => vec![bounds.center()],
        ClusterPattern::Ring => ring(bounds.center(), config.spawn_radius, spacing),
        ClusterPattern::Random => {
            let mut rng = world.resource_mut::<SimRng>();
            (0..RANDOM_SEED_COUNT)
                .map(|_| {
                    let x = sample(&mut *rng, bounds.left, bounds.right);
                    let y = sample(&mut *rng, bounds.top, bounds.bottom);
                    Position::new(x, y)
                })
                .collect()
        }
        ClusterPattern::Wall => wall(&bounds, config.bias_towards, spacing),
    };

    let created = create_cluster_from_coords(world, &coords);
    info!(?pattern, particles = created.len(), "seeded initial cluster");
    created
}

/// Points `spacing` apart around a circle. A zero radius collapses to the center.
fn ring(center: Position, radius: f32, spacing: f32) -> Vec<Position> {
    let count = ((TAU * radius) / spacing).floor() as usize;
    if count == 0 {
        return vec![center];
    }
    let step = TAU / count as f32;
    (0..count)
        .map(|i| {
            let angle = step * i as f32;
            Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Points `spacing` apart from `from` to `to`, both ends included.
fn line(from: Position, to: Position, spacing: f32) -> Vec<Position> {
    let length = from.distance_to(&to);
    let steps = (length / spacing).floor() as usize;
    if steps == 0 {
        return vec![from];
    }
    let (dx, dy) = ((to.x - from.x) / length, (to.y - from.y) / length);
    (0..=steps)
        .map(|i| {
            let d = spacing * i as f32;
            Position::new(from.x + dx * d, from.y + dy * d)
        })
        .collect()
}

/// Place a line of stuck particles along one edge of the bounds, one
/// diameter apart. Independent of the bias mode.
pub fn seed_wall(world: &mut World, edge: WallEdge) -> Vec<Entity> {
    let spacing = world.resource::<SimConfig>().circle_diameter.max(1.0);
    let coords = edge_wall(world.resource::<Bounds>(), edge, spacing);
    let created = create_cluster_from_coords(world, &coords);
    info!(?edge, particles = created.len(), "seeded wall");
    created
}

fn edge_wall(bounds: &Bounds, edge: WallEdge, spacing: f32) -> Vec<Position> {
    let (l, t, r, b) = (bounds.left, bounds.top, bounds.right, bounds.bottom);
    match edge {
        WallEdge::Top => line(Position::new(l, t), Position::new(r, t), spacing),
        WallEdge::Bottom => line(Position::new(l, b), Position::new(r, b), spacing),
        WallEdge::Left => line(Position::new(l, t), Position::new(l, b), spacing),
        WallEdge::Right => line(Position::new(r, t), Position::new(r, b), spacing),
    }
}

/// Wall on the side walkers drift toward.
fn wall(bounds: &Bounds, bias: BiasMode, spacing: f32) -> Vec<Position> {
    let (l, t, r, b) = (bounds.left, bounds.top, bounds.right, bounds.bottom);
    let mid = bounds.center();

    match bias {
        BiasMode::Top => edge_wall(bounds, WallEdge::Top, spacing),
        BiasMode::Left => edge_wall(bounds, WallEdge::Left, spacing),
        BiasMode::Right => edge_wall(bounds, WallEdge::Right, spacing),
        BiasMode::Equator => line(Position::new(l, mid.y), Position::new(r, mid.y), spacing),
        BiasMode::Meridian => line(Position::new(mid.x, t), Position::new(mid.x, b), spacing),
        BiasMode::Edges => WallEdge::ALL
            .into_iter()
            .flat_map(|edge| edge_wall(bounds, edge, spacing))
            .collect(),
        BiasMode::Bottom | BiasMode::Center | BiasMode::None => {
            edge_wall(bounds, WallEdge::Bottom, spacing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::SpatialGrid;

    fn seeding_world(config: SimConfig) -> World {
        let mut world = World::new();
        world.insert_resource(config);
        world.insert_resource(Bounds::new(0.0, 0.0, 200.0, 100.0));
        world.insert_resource(SimRng::seeded(11));
        world.insert_resource(ActiveWalkers::default());
        world.insert_resource(NextIds::default());
        world.insert_resource(ClusterLines::default());
        world.insert_resource(SpatialGrid::default());
        world
    }

    fn positions(world: &mut World) -> Vec<Position> {
        world.query::<&Position>().iter(world).copied().collect()
    }

    #[test]
    fn point_pattern_places_one_particle_at_center() {
        let mut world = seeding_world(SimConfig::default());
        let created = seed_clusters(&mut world, ClusterPattern::Point);
        assert_eq!(created.len(), 1);
        assert_eq!(positions(&mut world), vec![Position::new(100.0, 50.0)]);
        assert_eq!(world.resource::<ActiveWalkers>().0, 0);
        assert_eq!(world.get::<Stuck>(created[0]), Some(&Stuck(true)));
    }

    #[test]
    fn random_pattern_scatters_fixed_count_inside_bounds() {
        let mut world = seeding_world(SimConfig::default());
        seed_clusters(&mut world, ClusterPattern::Random);
        let placed = positions(&mut world);
        assert_eq!(placed.len(), RANDOM_SEED_COUNT);
        let bounds = *world.resource::<Bounds>();
        assert!(placed.iter().all(|p| bounds.contains(p.x, p.y)));
    }

    #[test]
    fn ring_particles_sit_on_spawn_radius() {
        let config = SimConfig {
            spawn_radius: 30.0,
            circle_diameter: 5.0,
            ..Default::default()
        };
        let mut world = seeding_world(config);
        let created = seed_clusters(&mut world, ClusterPattern::Ring);
        // Circumference 188.5 / spacing 5.
        assert_eq!(created.len(), 37);
        for p in positions(&mut world) {
            assert!((p.distance_to(&Position::new(100.0, 50.0)) - 30.0).abs() < 1e-3);
        }
    }

    #[test]
    fn wall_follows_bias_direction() {
        let config = SimConfig {
            bias_towards: BiasMode::Left,
            circle_diameter: 10.0,
            ..Default::default()
        };
        let mut world = seeding_world(config);
        seed_clusters(&mut world, ClusterPattern::Wall);
        let placed = positions(&mut world);
        assert_eq!(placed.len(), 11);
        assert!(placed.iter().all(|p| p.x == 0.0));

        let mut world = seeding_world(SimConfig {
            circle_diameter: 10.0,
            ..Default::default()
        });
        seed_clusters(&mut world, ClusterPattern::Wall);
        assert!(positions(&mut world).iter().all(|p| p.y > 99.0 && p.y < 100.0));
    }

    #[test]
    fn coords_outside_bounds_are_clamped() {
        let mut world = seeding_world(SimConfig::default());
        create_cluster_from_coords(&mut world, &[Position::new(-40.0, 500.0), Position::new(20.0, 30.0)]);
        let bounds = *world.resource::<Bounds>();
        let placed = positions(&mut world);
        assert!(placed.iter().all(|p| bounds.contains(p.x, p.y)));
        assert!(placed.contains(&Position::new(20.0, 30.0)));
    }

    #[test]
    fn walls_ignore_bias_mode() {
        let config = SimConfig {
            bias_towards: BiasMode::Top,
            circle_diameter: 10.0,
            ..Default::default()
        };
        let mut world = seeding_world(config);
        let right = seed_wall(&mut world, WallEdge::Right);
        assert_eq!(right.len(), 11);
        let bounds = *world.resource::<Bounds>();
        for p in positions(&mut world) {
            assert!(p.x > 199.0 && p.x < 200.0);
            assert!(bounds.contains(p.x, p.y));
        }

        for edge in [WallEdge::Top, WallEdge::Bottom, WallEdge::Left] {
            seed_wall(&mut world, edge);
        }
        assert_eq!(positions(&mut world).len(), 11 + 21 + 21 + 11);
        assert_eq!(world.resource::<ActiveWalkers>().0, 0);
    }

    #[test]
    fn point_walkers_seed_point_particles() {
        let config = SimConfig {
            walker_shape: WalkerShape::Point,
            ..Default::default()
        };
        let mut world = seeding_world(config);
        let created = create_cluster_from_coords(&mut world, &[Position::new(3.0, 4.0), Position::new(5.0, 6.0)]);
        assert_eq!(created.len(), 2);
        assert!(created
            .iter()
            .all(|&e| world.get::<Geometry>(e) == Some(&Geometry::Point)));
    }
}
