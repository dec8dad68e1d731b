//! Active motion bounds.
//!
//! Bounds are derived from the domain size handed to the engine and the frame
//! settings. They change only through an explicit resize or frame toggle.

use crate::components::Position;
use crate::config::SimConfig;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Half-open rectangle `[left, right) x [top, bottom)`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Whole domain, or a frame centered in it when `UseFrame` is set.
    pub fn from_domain(width: f32, height: f32, config: &SimConfig) -> Self {
        if config.use_frame {
            let (fw, fh) = config.frame_size.dimensions();
            let left = (width - fw) / 2.0;
            let top = (height - fh) / 2.0;
            Self::new(left, top, left + fw, top + fh)
        } else {
            Self::new(0.0, 0.0, width, height)
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Largest possible distance from the center to a point inside the bounds.
    pub fn max_distance(&self) -> f32 {
        (self.width() * self.width() + self.height() * self.height()).sqrt() / 2.0
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.left <= x && x < self.right && self.top <= y && y < self.bottom
    }

    #[inline]
    pub fn strictly_inside_x(&self, x: f32) -> bool {
        self.left < x && x < self.right
    }

    #[inline]
    pub fn strictly_inside_y(&self, y: f32) -> bool {
        self.top < y && y < self.bottom
    }

    /// Nearest position that satisfies [`Bounds::contains`].
    pub fn clamp_inside(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(self.left, just_below(self.right).max(self.left)),
            pos.y.clamp(self.top, just_below(self.bottom).max(self.top)),
        )
    }
}

/// Largest float meaningfully smaller than `v`.
fn just_below(v: f32) -> f32 {
    v - f32::EPSILON * v.abs().max(1.0)
}
