//! Population manager: where walkers appear, how big they are, and which ones
//! get pruned.
//!
//! Placement and sizing are pure functions over the config, the bounds and the
//! injected generator; [`spawn_walkers`] feeds their output to the registry.

use crate::bounds::Bounds;
use crate::components::*;
use crate::config::{SimConfig, SpawnSource, WalkerShape};
use crate::registry;
use crate::rng::SimRng;
use bevy_ecs::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

/// Band width used by the `Edges` source when `EdgeMargin` is zero.
const MIN_EDGE_BAND: f32 = 1.0;

/// Position and geometry for one walker, decided before it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPlan {
    pub position: Position,
    pub geometry: Geometry,
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty.
pub(crate) fn sample(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// Raw spawn position for `source`. May fall outside the bounds for the
/// circular sources; [`plan_walker`] clamps it.
pub fn spawn_position(config: &SimConfig, bounds: &Bounds, source: SpawnSource, rng: &mut impl Rng) -> Position {
    let center = bounds.center();
    match source {
        SpawnSource::Edges => {
            let margin = config
                .edge_margin
                .max(MIN_EDGE_BAND)
                .min(bounds.width() / 2.0)
                .min(bounds.height() / 2.0);
            // Keep the along-edge coordinate out of the corner bands so the
            // walker is near exactly one edge.
            let along_x = sample(rng, bounds.left + margin, bounds.right - margin);
            let along_y = sample(rng, bounds.top + margin, bounds.bottom - margin);
            let depth = sample(rng, 0.0, margin);
            match rng.random_range(0..4u8) {
                0 => Position::new(along_x, bounds.top + depth),
                1 => Position::new(along_x, bounds.bottom - margin + depth),
                2 => Position::new(bounds.left + depth, along_y),
                _ => Position::new(bounds.right - margin + depth, along_y),
            }
        }
        SpawnSource::Circle => {
            let origin = config.circle_center.unwrap_or(center);
            let angle = sample(rng, 0.0, TAU);
            Position::new(
                origin.x + config.spawn_radius * angle.cos(),
                origin.y + config.spawn_radius * angle.sin(),
            )
        }
        SpawnSource::Random => Position::new(
            sample(rng, bounds.left, bounds.right),
            sample(rng, bounds.top, bounds.bottom),
        ),
        SpawnSource::RandomCircle => {
            let disk = bounds.width().min(bounds.height()) / 2.0;
            let radius = sample(rng, 0.0, disk);
            let angle = sample(rng, 0.0, TAU);
            Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        }
        SpawnSource::Center => center,
    }
}

/// Walker diameter under the configured size-variation policy.
pub fn walker_diameter(config: &SimConfig, bounds: &Bounds, position: Position, rng: &mut impl Rng) -> f32 {
    let (min, max) = config.circle_diameter_range;
    if config.vary_diameter_by_distance {
        let max_distance = bounds.max_distance();
        let t = if max_distance > 0.0 {
            (position.distance_to(&bounds.center()) / max_distance).clamp(0.0, 1.0)
        } else {
            0.0
        };
        min + (max - min) * t
    } else if config.vary_diameter_randomly {
        sample(rng, min, max)
    } else {
        config.circle_diameter
    }
}

/// Geometry for a walker of the given diameter.
pub fn walker_geometry(shape: WalkerShape, diameter: f32, rng: &mut impl Rng) -> Geometry {
    let sides = match shape {
        WalkerShape::Point => return Geometry::Point,
        WalkerShape::Circle => return Geometry::circle(diameter),
        WalkerShape::Triangle => 3,
        WalkerShape::Square => 4,
        WalkerShape::Pentagon => 5,
        WalkerShape::Hexagon => 6,
        WalkerShape::RandomPolygon => rng.random_range(3..6),
    };
    let rotation = sample(rng, 0.0, 360.0);
    Geometry::regular_polygon(sides, diameter / 2.0, rotation)
}

/// Decide where one walker from `source` goes and what it looks like.
pub fn plan_walker(config: &SimConfig, bounds: &Bounds, source: SpawnSource, rng: &mut impl Rng) -> SpawnPlan {
    let mut position = bounds.clamp_inside(spawn_position(config, bounds, source, rng));
    if config.walker_shape == WalkerShape::Point {
        position = bounds.clamp_inside(Position::new(position.x.round(), position.y.round()));
    }
    let diameter = walker_diameter(config, bounds, position, rng);
    let geometry = walker_geometry(config.walker_shape, diameter, rng);
    SpawnPlan { position, geometry }
}

/// Create `count` walkers placed by `source`.
pub fn spawn_walkers(world: &mut World, count: usize, source: SpawnSource) -> Vec<Entity> {
    let config = world.resource::<SimConfig>().clone();
    let bounds = *world.resource::<Bounds>();
    let plans: Vec<SpawnPlan> = {
        let mut rng = world.resource_mut::<SimRng>();
        (0..count)
            .map(|_| plan_walker(&config, &bounds, source, &mut *rng))
            .collect()
    };

    plans
        .into_iter()
        .map(|plan| registry::create_body(world, plan.geometry, plan.position, false))
        .collect()
}

/// Whether the pruning policy rejects a walker.
pub fn should_prune(config: &SimConfig, position: &Position, age: Age, spawn: &SpawnPoint) -> bool {
    (config.prune_old_walkers && age.0 > config.max_age)
        || (config.prune_distant_walkers && position.distance_to(&spawn.0) > config.max_wander_distance)
}

/// Number of walkers replenishment should add this tick.
pub fn replenish_deficit(config: &SimConfig, active: usize) -> usize {
    if config.replenish_walkers {
        config.max_walkers.saturating_sub(active)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameSize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square_bounds() -> Bounds {
        Bounds::new(0.0, 0.0, 1000.0, 1000.0)
    }

    #[test]
    fn edges_source_stays_in_one_band() {
        let config = SimConfig {
            edge_margin: 50.0,
            ..Default::default()
        };
        let bounds = square_bounds();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let p = bounds.clamp_inside(spawn_position(&config, &bounds, SpawnSource::Edges, &mut rng));
            let near = [p.y - bounds.top, bounds.bottom - p.y, p.x - bounds.left, bounds.right - p.x]
                .iter()
                .filter(|d| **d <= 50.0)
                .count();
            assert_eq!(near, 1, "{p:?}");
        }
    }

    #[test]
    fn circle_source_uses_radius_and_center_override() {
        let config = SimConfig {
            spawn_radius: 40.0,
            circle_center: Some(Position::new(300.0, 200.0)),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let p = spawn_position(&config, &square_bounds(), SpawnSource::Circle, &mut rng);
            assert!((p.distance_to(&Position::new(300.0, 200.0)) - 40.0).abs() < 1e-3);
        }
    }

    #[test]
    fn random_circle_stays_inside_disk() {
        let config = SimConfig::default();
        let bounds = Bounds::new(0.0, 0.0, 400.0, 200.0);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let p = spawn_position(&config, &bounds, SpawnSource::RandomCircle, &mut rng);
            assert!(p.distance_to(&bounds.center()) <= 100.0 + 1e-3);
        }
    }

    #[test]
    fn center_source_is_fixed() {
        let mut rng = StdRng::seed_from_u64(0);
        let p = spawn_position(&SimConfig::default(), &square_bounds(), SpawnSource::Center, &mut rng);
        assert_eq!(p, Position::new(500.0, 500.0));
    }

    #[test]
    fn plans_are_clamped_into_small_frames() {
        let config = SimConfig {
            spawn_radius: 500.0,
            frame_size: FrameSize::Square(100.0),
            ..Default::default()
        };
        let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let plan = plan_walker(&config, &bounds, SpawnSource::Circle, &mut rng);
            assert!(bounds.contains(plan.position.x, plan.position.y));
        }
    }

    #[test]
    fn diameter_interpolates_with_distance() {
        let config = SimConfig {
            circle_diameter_range: (2.0, 22.0),
            vary_diameter_by_distance: true,
            ..Default::default()
        };
        let bounds = Bounds::new(0.0, 0.0, 600.0, 800.0); // max distance 500
        let mut rng = StdRng::seed_from_u64(0);
        let at_center = walker_diameter(&config, &bounds, bounds.center(), &mut rng);
        let halfway = walker_diameter(&config, &bounds, Position::new(300.0, 650.0), &mut rng);
        assert!((at_center - 2.0).abs() < 1e-4);
        // 250 / 500 of the way from 2 to 22.
        assert!((halfway - 12.0).abs() < 1e-3);
    }

    #[test]
    fn random_diameter_stays_in_range() {
        let config = SimConfig {
            circle_diameter_range: (4.0, 8.0),
            vary_diameter_randomly: true,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let d = walker_diameter(&config, &square_bounds(), Position::default(), &mut rng);
            assert!((4.0..8.0).contains(&d));
        }
        let fixed = walker_diameter(&SimConfig::default(), &square_bounds(), Position::default(), &mut rng);
        assert_eq!(fixed, 5.0);
    }

    #[test]
    fn walker_shapes_map_to_geometry() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(walker_geometry(WalkerShape::Point, 5.0, &mut rng), Geometry::Point);
        assert_eq!(
            walker_geometry(WalkerShape::Circle, 6.0, &mut rng),
            Geometry::Circle { radius: 3.0 }
        );
        match walker_geometry(WalkerShape::Hexagon, 6.0, &mut rng) {
            Geometry::Polygon { vertices, rotation } => {
                assert_eq!(vertices.len(), 6);
                assert!((0.0..360.0).contains(&rotation));
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn prune_policy_respects_toggles() {
        let spawn = SpawnPoint(Position::new(0.0, 0.0));
        let far = Position::new(30.0, 0.0);
        let off = SimConfig::default();
        assert!(!should_prune(&off, &far, Age(1000), &spawn));

        let by_age = SimConfig {
            prune_old_walkers: true,
            max_age: 30,
            ..Default::default()
        };
        assert!(!should_prune(&by_age, &far, Age(30), &spawn));
        assert!(should_prune(&by_age, &far, Age(31), &spawn));

        let by_distance = SimConfig {
            prune_distant_walkers: true,
            max_wander_distance: 20.0,
            ..Default::default()
        };
        assert!(should_prune(&by_distance, &far, Age(0), &spawn));
        assert!(!should_prune(&by_distance, &Position::new(10.0, 0.0), Age(0), &spawn));
    }

    #[test]
    fn deficit_only_when_enabled() {
        let config = SimConfig {
            max_walkers: 10,
            ..Default::default()
        };
        assert_eq!(replenish_deficit(&config, 3), 0);
        let config = SimConfig {
            replenish_walkers: true,
            ..config
        };
        assert_eq!(replenish_deficit(&config, 3), 7);
        assert_eq!(replenish_deficit(&config, 12), 0);
    }
}
