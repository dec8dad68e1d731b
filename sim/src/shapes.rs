//! Import of static obstacle shapes from external path data.

use crate::components::*;
use crate::error::DlaError;
use crate::registry;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One imported path. `points` are relative to the origin `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapePath {
    pub x: f32,
    pub y: f32,
    pub points: Vec<(f32, f32)>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub solid: bool,
}

/// Outcome of [`create_shapes_from_paths`]: the shapes that were created and
/// one error per path that was skipped.
#[derive(Debug, Default)]
pub struct ShapeImport {
    pub created: Vec<Entity>,
    pub skipped: Vec<DlaError>,
}

/// Shapes a single path turns into.
///
/// Closed solid paths with at least three points become one polygon. Anything
/// else becomes a chain of segments, with a closing segment for closed paths.
pub fn shapes_for_path(path: &ShapePath) -> Vec<Shape> {
    let points = &path.points;
    if path.closed && path.solid && points.len() >= 3 {
        return vec![Shape::Polygon {
            vertices: points.clone(),
        }];
    }
    if let [only] = points.as_slice() {
        return vec![Shape::Segment { a: *only, b: *only }];
    }

    let mut shapes: Vec<Shape> = points
        .windows(2)
        .map(|pair| Shape::Segment {
            a: pair[0],
            b: pair[1],
        })
        .collect();
    if path.closed {
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if points.len() > 2 && first != last {
                shapes.push(Shape::Segment { a: last, b: first });
            }
        }
    }
    shapes
}

fn check_path(index: usize, path: &ShapePath) -> Result<(), DlaError> {
    if path.points.is_empty() {
        return Err(DlaError::InvalidGeometry {
            index,
            reason: "path has no points",
        });
    }
    let finite = path.x.is_finite()
        && path.y.is_finite()
        && path.points.iter().all(|(x, y)| x.is_finite() && y.is_finite());
    if !finite {
        return Err(DlaError::InvalidGeometry {
            index,
            reason: "path has non-finite coordinates",
        });
    }
    Ok(())
}

/// Register shapes for every usable path. Bad paths are skipped and reported;
/// the rest of the import continues.
pub fn create_shapes_from_paths(world: &mut World, paths: &[ShapePath]) -> ShapeImport {
    let mut report = ShapeImport::default();
    for (index, path) in paths.iter().enumerate() {
        if let Err(err) = check_path(index, path) {
            warn!(%err, "skipping shape path");
            report.skipped.push(err);
            continue;
        }
        let origin = Position::new(path.x, path.y);
        for shape in shapes_for_path(path) {
            report.created.push(registry::create_shape(world, origin, shape));
        }
    }
    debug!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        "imported shape paths"
    );
    report
}
