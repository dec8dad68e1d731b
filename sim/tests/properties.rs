use dla_sim::{
    BiasMode, BodyId, FrameSize, Geometry, Position, ShapePath, SimConfig, SimWorld, SpawnSource,
    WalkerParams, WallEdge,
};
use rand::RngCore;
use std::collections::HashSet;

/// Generator whose floats all sample to 0.5, which makes jitter zero.
struct Midpoint;

impl RngCore for Midpoint {
    fn next_u32(&mut self) -> u32 {
        1 << 31
    }

    fn next_u64(&mut self) -> u64 {
        1 << 63
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(0);
    }
}

fn busy_config() -> SimConfig {
    SimConfig {
        max_walkers: 400,
        frame_size: FrameSize::Square(200.0),
        replenish_walkers: true,
        prune_old_walkers: true,
        max_age: 40,
        bias_towards: BiasMode::Center,
        ..Default::default()
    }
}

fn open_config() -> SimConfig {
    SimConfig {
        use_frame: false,
        max_walkers: 0,
        ..Default::default()
    }
}

#[test]
fn stuck_is_monotonic_and_counter_matches() {
    let mut sim = SimWorld::with_seed(300.0, 300.0, busy_config(), 17).unwrap();
    sim.reset();

    let mut stuck_ids: HashSet<u32> = HashSet::new();
    for _ in 0..60 {
        sim.tick();
        let snapshot = sim.snapshot();
        let now: HashSet<u32> = snapshot.cluster().map(|b| b.id).collect();
        assert!(stuck_ids.is_subset(&now), "a cluster particle came unstuck");
        stuck_ids = now;

        assert_eq!(sim.active_walkers(), sim.count_unstuck());
        assert_eq!(snapshot.active_walkers, snapshot.walkers().count());
    }
    assert!(stuck_ids.len() > dla_sim::seeding::RANDOM_SEED_COUNT);
}

#[test]
fn bodies_stay_inside_bounds() {
    let mut sim = SimWorld::with_seed(300.0, 300.0, busy_config(), 3).unwrap();
    sim.reset();
    let bounds = sim.bounds();

    for _ in 0..40 {
        sim.tick();
        for body in sim.snapshot().bodies {
            assert!(bounds.contains(body.x, body.y), "{body:?} left {bounds:?}");
        }
    }
}

#[test]
fn cluster_coords_outside_frame_land_inside() {
    let config = SimConfig {
        max_walkers: 0,
        ..Default::default()
    };
    let mut sim = SimWorld::with_seed(1000.0, 1000.0, config, 1000).unwrap();
    let ids = sim.create_cluster_from_coords(&[
        Position::new(10.0, 10.0),
        Position::new(2000.0, 500.0),
        Position::new(400.0, 400.0),
    ]);
    assert_eq!(ids.len(), 3);

    sim.tick();

    let bounds = sim.bounds();
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.cluster().count(), 3);
    for body in &snapshot.bodies {
        assert!(bounds.contains(body.x, body.y), "{body:?} left {bounds:?}");
    }
    assert!(snapshot.bodies.iter().any(|b| b.x == 400.0 && b.y == 400.0));
}

#[test]
fn walled_flow_field_keeps_invariants() {
    let config = SimConfig {
        circle_diameter: 8.0,
        use_frame: true,
        frame_size: FrameSize::Square(200.0),
        ..open_config()
    };
    let mut sim = SimWorld::with_seed(300.0, 300.0, config, 7).unwrap();
    for edge in WallEdge::ALL {
        sim.seed_wall(edge);
    }
    let walls = sim.stuck_count();
    assert!(walls > 0);
    assert_eq!(sim.active_walkers(), 0);

    sim.set_movement_field(|pos: &Position| ((pos.y * 0.05).sin() * 0.5, (pos.x * 0.05).cos() * 0.5));
    sim.spawn(150, SpawnSource::Random);

    let bounds = sim.bounds();
    for _ in 0..80 {
        sim.tick();
        assert_eq!(sim.active_walkers(), sim.count_unstuck());
        for body in sim.snapshot().bodies {
            assert!(bounds.contains(body.x, body.y), "{body:?} left {bounds:?}");
        }
    }
    assert!(sim.stuck_count() > walls);
}

#[test]
fn paused_ticks_change_nothing() {
    let mut sim = SimWorld::with_seed(300.0, 300.0, busy_config(), 8).unwrap();
    sim.reset();
    for _ in 0..5 {
        sim.tick();
    }

    sim.pause();
    let frozen = sim.snapshot_json();
    for _ in 0..25 {
        sim.tick();
    }
    assert_eq!(sim.snapshot_json(), frozen);
    assert!(sim.is_paused());
}

#[test]
fn remove_all_then_spawn_round_trips() {
    let mut sim = SimWorld::with_seed(300.0, 300.0, busy_config(), 2).unwrap();
    sim.reset();
    sim.tick();

    sim.remove_all();
    assert_eq!(sim.body_count(), 0);
    assert_eq!(sim.active_walkers(), 0);

    let ids = sim.spawn(123, SpawnSource::Random);
    assert_eq!(ids.len(), 123);
    assert_eq!(ids.first(), Some(&BodyId(0)));
    assert_eq!(sim.body_count(), 123);
    assert_eq!(sim.count_unstuck(), 123);
    assert_eq!(sim.active_walkers(), 123);
}

#[test]
fn overlapping_walker_sticks_after_one_tick() {
    let config = SimConfig {
        circle_diameter: 10.0,
        bias_towards: BiasMode::None,
        ..open_config()
    };
    let mut sim = SimWorld::with_seed(1000.0, 1000.0, config, 0).unwrap();
    sim.create_cluster_from_coords(&[Position::new(100.0, 100.0)]);
    let walker = sim.create_walker(WalkerParams {
        position: Position::new(104.0, 100.0),
        geometry: Geometry::circle(10.0),
        bias_target: None,
    });
    assert_eq!(sim.active_walkers(), 1);

    sim.tick();

    let snapshot = sim.snapshot();
    let body = snapshot.bodies.iter().find(|b| b.id == walker.0).unwrap();
    assert!(body.stuck);
    assert_eq!(sim.active_walkers(), 0);
    assert_eq!(snapshot.lines.len(), 1);
}

#[test]
fn center_bias_pulls_walker_inward() {
    let config = SimConfig {
        bias_towards: BiasMode::Center,
        bias_force: 1.0,
        ..open_config()
    };
    let mut sim = SimWorld::new(1000.0, 1000.0, config, Midpoint).unwrap();
    let start = Position::new(50.0, 900.0);
    sim.create_walker(WalkerParams {
        position: start,
        geometry: Geometry::circle(5.0),
        bias_target: None,
    });
    let center = sim.bounds().center();

    sim.tick();

    let body = &sim.snapshot().bodies[0];
    let moved = Position::new(body.x, body.y);
    assert!(moved.distance_to(&center) < start.distance_to(&center));
    assert_eq!(body.age, 1);
}

#[test]
fn edge_spawns_hug_exactly_one_edge() {
    let config = SimConfig {
        edge_margin: 50.0,
        ..open_config()
    };
    let mut sim = SimWorld::with_seed(1000.0, 1000.0, config, 99).unwrap();
    sim.spawn(1000, SpawnSource::Edges);

    let bounds = sim.bounds();
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.bodies.len(), 1000);
    for body in &snapshot.bodies {
        let distances = [
            body.y - bounds.top,
            bounds.bottom - body.y,
            body.x - bounds.left,
            bounds.right - body.x,
        ];
        let near = distances.iter().filter(|d| **d <= 50.0).count();
        assert_eq!(near, 1, "{body:?}");
    }
}

#[test]
fn same_seed_same_run() {
    let run = |seed| {
        let mut sim = SimWorld::with_seed(300.0, 300.0, busy_config(), seed).unwrap();
        sim.reset();
        for _ in 0..20 {
            sim.tick();
        }
        sim.snapshot_json()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn shapes_capture_walkers() {
    let config = SimConfig {
        bias_towards: BiasMode::Bottom,
        bias_force: 2.0,
        ..open_config()
    };
    let mut sim = SimWorld::with_seed(400.0, 400.0, config, 5).unwrap();
    let report = sim.create_shapes_from_paths(&[
        ShapePath {
            x: 0.0,
            y: 300.0,
            points: vec![(10.0, 0.0), (390.0, 0.0)],
            closed: false,
            solid: false,
        },
        ShapePath {
            x: 0.0,
            y: 0.0,
            points: vec![],
            closed: true,
            solid: true,
        },
    ]);
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(sim.shape_count(), 1);

    sim.spawn(50, SpawnSource::Center);
    for _ in 0..200 {
        sim.tick();
    }
    assert_eq!(sim.stuck_count(), 50);
    assert_eq!(sim.active_walkers(), 0);

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.shapes[0].points, vec![(10.0, 300.0), (390.0, 300.0)]);
    assert!(snapshot.lines.len() < 50);
}
