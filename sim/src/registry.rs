//! Particle registry: the only code that creates or destroys entities.
//!
//! Keeping creation and removal here is what keeps [`ActiveWalkers`] equal to
//! the number of non-stuck bodies.

use crate::components::*;
use crate::spatial::SpatialGrid;
use bevy_ecs::prelude::*;

/// Create a body with `age = 0`. Non-stuck bodies count as active walkers.
pub fn create_body(world: &mut World, geometry: Geometry, position: Position, stuck: bool) -> Entity {
    let id = world.resource_mut::<NextIds>().next_body();
    if !stuck {
        world.resource_mut::<ActiveWalkers>().increment();
    }
    world.spawn(BodyBundle::new(id, position, geometry, stuck)).id()
}

/// Register a static shape anchored at `origin`.
pub fn create_shape(world: &mut World, origin: Position, shape: Shape) -> Entity {
    let id = world.resource_mut::<NextIds>().next_shape();
    world.spawn(ShapeBundle { id, origin, shape }).id()
}

/// Clear every body and shape and reset the walker counter.
pub fn remove_all(world: &mut World) -> usize {
    let mut query = world.query_filtered::<Entity, Or<(With<Geometry>, With<Shape>)>>();
    let entities: Vec<Entity> = query.iter(world).collect();
    for entity in &entities {
        world.despawn(*entity);
    }

    world.resource_mut::<ActiveWalkers>().0 = 0;
    *world.resource_mut::<NextIds>() = NextIds::default();
    world.resource_mut::<ClusterLines>().0.clear();
    world.resource_mut::<SpatialGrid>().clear();
    entities.len()
}

/// Hard-delete a walker rejected by pruning. Stuck bodies are never discarded.
pub(crate) fn discard_walker(world: &mut World, entity: Entity) -> bool {
    let is_walker = world
        .get::<Stuck>(entity)
        .map(|stuck| !stuck.is_stuck())
        .unwrap_or(false);
    if is_walker && world.despawn(entity) {
        world.resource_mut::<ActiveWalkers>().decrement();
        true
    } else {
        false
    }
}

/// Number of bodies whose `stuck` flag is false, counted directly.
pub fn count_unstuck(world: &mut World) -> usize {
    let mut query = world.query::<&Stuck>();
    query.iter(world).filter(|s| !s.is_stuck()).count()
}
