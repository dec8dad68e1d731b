//! Population systems - pruning and replenishment.
//!
//! Both create or destroy entities, so they are exclusive systems that go
//! through the registry instead of querying.

use crate::components::*;
use crate::config::SimConfig;
use crate::population::{replenish_deficit, should_prune, spawn_walkers};
use crate::registry;
use bevy_ecs::prelude::*;
use tracing::debug;

/// Hard-delete walkers rejected by the pruning policy.
pub fn prune_system(world: &mut World) {
    let config = world.resource::<SimConfig>().clone();
    if !(config.prune_old_walkers || config.prune_distant_walkers) {
        return;
    }

    let mut query = world.query::<(Entity, &Position, &Age, &SpawnPoint, &Stuck)>();
    let doomed: Vec<Entity> = query
        .iter(world)
        .filter(|(_, pos, age, spawn, stuck)| !stuck.is_stuck() && should_prune(&config, pos, **age, spawn))
        .map(|(entity, ..)| entity)
        .collect();

    let pruned = doomed
        .into_iter()
        .filter(|&entity| registry::discard_walker(world, entity))
        .count();
    if pruned > 0 {
        debug!(pruned, "pruned walkers");
    }
}

/// Top the walker population back up to `MaxWalkers`.
pub fn replenish_system(world: &mut World) {
    let config = world.resource::<SimConfig>();
    let deficit = replenish_deficit(config, world.resource::<ActiveWalkers>().0);
    if deficit == 0 {
        return;
    }
    let source = config.replenish_source();
    let spawned = spawn_walkers(world, deficit, source);
    debug!(spawned = spawned.len(), %source, "replenished walkers");
}
