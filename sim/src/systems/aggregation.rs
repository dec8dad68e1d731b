//! Aggregation system - walkers that touch the cluster or a shape get stuck.
//!
//! ## Phases
//!
//! 1. **Gather** - build colliders for every stuck body and shape, then for
//!    each walker find the first broad-phase candidate the narrow phase
//!    confirms. Read-only, so it runs on rayon with `--features parallel`.
//! 2. **Apply** - flip `Stuck`, decrement the walker counter and record
//!    cluster lines, sequentially.
//!
//! Hits are tested against the stuck set as it was at the start of the pass:
//! a walker that sticks this tick does not capture another walker until the
//! next tick.

use crate::collision::Collider;
use crate::components::*;
use crate::config::SimConfig;
use crate::spatial::SpatialGrid;
use bevy_ecs::prelude::*;
use std::collections::HashMap;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Something a walker can stick to.
struct Anchor {
    collider: Collider,
    /// Body position for cluster lines; `None` for shapes.
    position: Option<Position>,
}

/// A walker and the anchor it hit.
struct Hit {
    walker: Entity,
    anchor: Option<Position>,
}

fn first_hit(
    walker: Entity,
    collider: &Collider,
    anchors: &HashMap<Entity, Anchor>,
    grid: &SpatialGrid,
) -> Option<Hit> {
    grid.potentials(walker)
        .into_iter()
        .filter_map(|candidate| anchors.get(&candidate))
        .find(|anchor| collider.touches(&anchor.collider))
        .map(|anchor| Hit {
            walker,
            anchor: anchor.position,
        })
}

/// System that resolves walker / cluster contacts for this tick.
pub fn aggregation_system(
    config: Res<SimConfig>,
    grid: Res<SpatialGrid>,
    mut walkers: ResMut<ActiveWalkers>,
    mut lines: ResMut<ClusterLines>,
    mut bodies: Query<(Entity, &Position, &Geometry, &mut Stuck)>,
    shapes: Query<(Entity, &Position, &Shape)>,
) {
    // GATHER PHASE
    let mut anchors: HashMap<Entity, Anchor> = HashMap::new();
    let mut subjects: Vec<(Entity, Collider)> = Vec::new();
    for (entity, pos, geometry, stuck) in bodies.iter() {
        let collider = Collider::for_body(pos, geometry);
        if stuck.is_stuck() {
            anchors.insert(
                entity,
                Anchor {
                    collider,
                    position: Some(*pos),
                },
            );
        } else {
            subjects.push((entity, collider));
        }
    }
    for (entity, origin, shape) in shapes.iter() {
        anchors.insert(
            entity,
            Anchor {
                collider: Collider::for_shape(origin, shape),
                position: None,
            },
        );
    }

    if subjects.is_empty() || anchors.is_empty() {
        return;
    }
    let grid: &SpatialGrid = &grid;

    #[cfg(feature = "parallel")]
    let hits: Vec<Hit> = subjects
        .par_iter()
        .filter_map(|(walker, collider)| first_hit(*walker, collider, &anchors, grid))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let hits: Vec<Hit> = subjects
        .iter()
        .filter_map(|(walker, collider)| first_hit(*walker, collider, &anchors, grid))
        .collect();

    // APPLY PHASE
    let mut joined = 0usize;
    for hit in hits {
        let Ok((_, pos, _, mut stuck)) = bodies.get_mut(hit.walker) else {
            continue;
        };
        if !stuck.stick() {
            continue;
        }
        walkers.decrement();
        joined += 1;
        if config.capture_lines {
            if let Some(from) = hit.anchor {
                lines.0.push(ClusterLine { from, to: *pos });
            }
        }
    }

    if joined > 0 {
        debug!(joined, active = walkers.0, "walkers joined the cluster");
    }
}
