//! Basic demonstration of the DLA simulation.
//!
//! Run with: cargo run --example basic_demo

use dla_sim::{BiasMode, ClusterPattern, FrameSize, ShapePath, SimConfig, SimWorld, SpawnSource};

fn main() {
    println!("=== DLA Simulation Demo ===\n");

    let config = SimConfig {
        max_walkers: 2000,
        walker_source: SpawnSource::Edges,
        edge_margin: 20.0,
        initial_cluster_type: ClusterPattern::Point,
        bias_towards: BiasMode::Center,
        replenish_walkers: true,
        frame_size: FrameSize::Square(600.0),
        ..Default::default()
    };

    let mut sim = match SimWorld::with_seed(800.0, 800.0, config, 2024) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return;
        }
    };
    sim.reset();

    // A short wall below the seed for walkers to land on.
    let report = sim.create_shapes_from_paths(&[ShapePath {
        x: 300.0,
        y: 500.0,
        points: vec![(0.0, 0.0), (200.0, 0.0)],
        closed: false,
        solid: false,
    }]);
    println!("Imported {} shape(s), skipped {}", report.created.len(), report.skipped.len());

    println!("Initial state:");
    print_summary(&mut sim);

    println!("\nRunning 500 ticks...\n");
    for _ in 0..500 {
        sim.tick();
        if sim.current_tick() % 100 == 0 {
            println!("--- Tick {} ---", sim.current_tick());
            print_summary(&mut sim);
        }
    }

    // Pause: further ticks are ignored.
    sim.toggle_pause();
    sim.tick();
    println!("\nPaused at tick {}", sim.current_tick());

    let snapshot = sim.snapshot();
    println!(
        "\nFinal: {} bodies, {} cluster particles, {} lines",
        snapshot.bodies.len(),
        snapshot.cluster().count(),
        snapshot.lines.len()
    );
}

fn print_summary(sim: &mut SimWorld) {
    println!(
        "  walkers={} stuck={} shapes={} bounds={:?}",
        sim.active_walkers(),
        sim.stuck_count(),
        sim.shape_count(),
        sim.bounds()
    );
}
