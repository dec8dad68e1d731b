//! Motion system - random-walk jitter plus directional bias.
//!
//! A host can also install a [`MovementField`], a per-position force (for
//! example a flow field) added on top of the bias every tick.

use crate::bounds::Bounds;
use crate::components::*;
use crate::config::{BiasMode, SimConfig};
use crate::rng::SimRng;
use bevy_ecs::prelude::*;
use rand::Rng;

/// Host-supplied force sampled at each walker's position.
#[derive(Resource)]
pub struct MovementField(Box<dyn Fn(&Position) -> (f32, f32) + Send + Sync>);

impl MovementField {
    pub fn new(field: impl Fn(&Position) -> (f32, f32) + Send + Sync + 'static) -> Self {
        Self(Box::new(field))
    }

    #[inline]
    pub fn force_at(&self, pos: &Position) -> (f32, f32) {
        (self.0)(pos)
    }
}

/// Bias displacement for one walker.
///
/// A per-walker target, when given, replaces the global `mode`.
pub fn bias_offset(
    mode: BiasMode,
    force: f32,
    pos: &Position,
    center: &Position,
    target: Option<&BiasTarget>,
) -> (f32, f32) {
    if let Some(target) = target {
        let angle = match *target {
            BiasTarget::Point { x, y } => (y - pos.y).atan2(x - pos.x),
            BiasTarget::Vector { dx, dy } => {
                if dx == 0.0 && dy == 0.0 {
                    return (0.0, 0.0);
                }
                dy.atan2(dx)
            }
        };
        return (force * angle.cos(), force * angle.sin());
    }

    match mode {
        BiasMode::None => (0.0, 0.0),
        BiasMode::Top => (0.0, -force),
        BiasMode::Bottom => (0.0, force),
        BiasMode::Left => (-force, 0.0),
        BiasMode::Right => (force, 0.0),
        BiasMode::Center | BiasMode::Edges => {
            let angle = (center.y - pos.y).atan2(center.x - pos.x);
            let sign = if mode == BiasMode::Edges { -1.0 } else { 1.0 };
            (sign * force * angle.cos(), sign * force * angle.sin())
        }
        BiasMode::Equator => (0.0, toward(pos.y, center.y, force)),
        BiasMode::Meridian => (toward(pos.x, center.x, force), 0.0),
    }
}

/// Signed push of magnitude `force` from `from` toward `to`; zero on the line.
fn toward(from: f32, to: f32, force: f32) -> f32 {
    if from < to {
        force
    } else if from > to {
        -force
    } else {
        0.0
    }
}

/// System that moves every walker one step.
///
/// Each axis is committed only if the new coordinate stays strictly inside the
/// bounds. Age advances whether or not the walker moved.
pub fn motion_system(
    config: Res<SimConfig>,
    bounds: Res<Bounds>,
    mut rng: ResMut<SimRng>,
    field: Option<Res<MovementField>>,
    mut walkers: Query<(&mut Position, &Geometry, &Stuck, &mut Age, Option<&BiasTarget>)>,
) {
    let center = bounds.center();
    let rng = &mut *rng;

    for (mut pos, geometry, stuck, mut age, target) in walkers.iter_mut() {
        if stuck.is_stuck() {
            continue;
        }

        let mut dx: f32 = rng.random::<f32>() * 2.0 - 1.0;
        let mut dy: f32 = rng.random::<f32>() * 2.0 - 1.0;
        if matches!(geometry, Geometry::Point) {
            dx = dx.round();
            dy = dy.round();
        }

        let target = target.filter(|_| config.use_per_walker_bias);
        let (bx, by) = bias_offset(config.bias_towards, config.bias_force, &pos, &center, target);
        let (fx, fy) = field.as_ref().map_or((0.0, 0.0), |field| field.force_at(&pos));
        let (nx, ny) = (pos.x + dx + bx + fx, pos.y + dy + by + fy);

        if bounds.strictly_inside_x(nx) {
            pos.x = nx;
        }
        if bounds.strictly_inside_y(ny) {
            pos.y = ny;
        }
        age.increment();
    }
}
