//! ECS systems for the DLA simulation.
//!
//! Systems contain the simulation logic that operates on components.
//!
//! ## Tick Order
//!
//! One tick runs these systems strictly in sequence:
//!
//! 1. `prune_system` - drops walkers rejected by the pruning policy
//! 2. `replenish_system` - tops walkers back up to `MaxWalkers`
//! 3. `motion_system` - jitter, bias, optional movement field, per-axis bounds check
//! 4. `spatial_index_update_system` - rebuilds the broad phase
//! 5. `aggregation_system` - sticks walkers that touch the cluster or a shape
//!
//! Pausing skips the whole schedule; no system runs.

pub mod aggregation;
pub mod motion;
pub mod population;

pub use aggregation::*;
pub use motion::*;
pub use population::*;

use crate::spatial::spatial_index_update_system;
use bevy_ecs::prelude::*;

/// Build the per-tick schedule.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            prune_system,
            replenish_system,
            motion_system,
            spatial_index_update_system,
            aggregation_system,
        )
            .chain(),
    );
    schedule
}
