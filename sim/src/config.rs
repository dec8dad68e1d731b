//! Simulation configuration.
//!
//! Field names serialize in PascalCase (`MaxWalkers`, `BiasTowards`, ...) so
//! experiment settings files load directly with [`SimConfig::from_json`].
//! Every field is optional in JSON and falls back to [`SimConfig::default`].

use crate::components::Position;
use crate::error::DlaError;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// NAMED STRATEGIES
// ============================================================================

/// Named spawn distribution for new walkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpawnSource {
    /// Near one of the four bound edges, within `EdgeMargin`.
    Edges,
    /// On a circle of `SpawnRadius` around the center.
    Circle,
    /// Anywhere inside the bounds.
    Random,
    /// Inside a disk around the center.
    RandomCircle,
    /// Exactly at the center.
    Center,
}

impl SpawnSource {
    pub fn name(&self) -> &'static str {
        match self {
            SpawnSource::Edges => "Edges",
            SpawnSource::Circle => "Circle",
            SpawnSource::Random => "Random",
            SpawnSource::RandomCircle => "RandomCircle",
            SpawnSource::Center => "Center",
        }
    }
}

impl FromStr for SpawnSource {
    type Err = DlaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Edges" => Ok(SpawnSource::Edges),
            "Circle" => Ok(SpawnSource::Circle),
            "Random" => Ok(SpawnSource::Random),
            "RandomCircle" => Ok(SpawnSource::RandomCircle),
            "Center" => Ok(SpawnSource::Center),
            other => Err(DlaError::UnknownSpawnSource(other.to_string())),
        }
    }
}

impl TryFrom<String> for SpawnSource {
    type Error = DlaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpawnSource> for String {
    fn from(source: SpawnSource) -> Self {
        source.name().to_string()
    }
}

impl fmt::Display for SpawnSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Global drift applied to every walker each tick.
///
/// Parsing is lenient: unknown or empty names disable bias.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BiasMode {
    #[default]
    None,
    Top,
    Bottom,
    Left,
    Right,
    /// Toward the center of the bounds.
    Center,
    /// Away from the center of the bounds.
    Edges,
    /// Toward the horizontal midline.
    Equator,
    /// Toward the vertical midline.
    Meridian,
}

impl BiasMode {
    pub fn name(&self) -> &'static str {
        match self {
            BiasMode::None => "None",
            BiasMode::Top => "Top",
            BiasMode::Bottom => "Bottom",
            BiasMode::Left => "Left",
            BiasMode::Right => "Right",
            BiasMode::Center => "Center",
            BiasMode::Edges => "Edges",
            BiasMode::Equator => "Equator",
            BiasMode::Meridian => "Meridian",
        }
    }
}

impl From<&str> for BiasMode {
    fn from(value: &str) -> Self {
        match value {
            "Top" => BiasMode::Top,
            "Bottom" => BiasMode::Bottom,
            "Left" => BiasMode::Left,
            "Right" => BiasMode::Right,
            "Center" => BiasMode::Center,
            "Edges" => BiasMode::Edges,
            "Equator" => BiasMode::Equator,
            "Meridian" => BiasMode::Meridian,
            _ => BiasMode::None,
        }
    }
}

impl From<String> for BiasMode {
    fn from(value: String) -> Self {
        BiasMode::from(value.as_str())
    }
}

impl From<BiasMode> for String {
    fn from(mode: BiasMode) -> Self {
        mode.name().to_string()
    }
}

/// Geometry given to newly spawned walkers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalkerShape {
    Point,
    #[default]
    Circle,
    Triangle,
    Square,
    Pentagon,
    Hexagon,
    /// Three to five sides, chosen per walker.
    #[serde(alias = "Random")]
    RandomPolygon,
}

/// Layout of the initial stuck particles placed by a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterPattern {
    /// One particle at the center.
    Point,
    /// Particles spaced around a circle of `SpawnRadius`.
    Ring,
    /// A fixed number of particles scattered over the bounds.
    #[default]
    Random,
    /// A line of particles on the side the bias pushes toward.
    Wall,
}

/// One side of the bounds, for free-standing walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl WallEdge {
    pub const ALL: [WallEdge; 4] = [WallEdge::Top, WallEdge::Bottom, WallEdge::Left, WallEdge::Right];
}

/// Frame dimensions: a single number for a square, or `[width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameSize {
    Square(f32),
    Rect([f32; 2]),
}

impl FrameSize {
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            FrameSize::Square(size) => (size, size),
            FrameSize::Rect([w, h]) => (w, h),
        }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        FrameSize::Square(900.0)
    }
}

// ============================================================================
// CONFIG RESOURCE
// ============================================================================

/// Complete engine configuration.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SimConfig {
    /// Diameter of walkers and cluster particles when no variation is enabled.
    pub circle_diameter: f32,
    /// `[min, max]` used by the diameter variation policies.
    pub circle_diameter_range: (f32, f32),
    /// Target number of active walkers.
    pub max_walkers: usize,
    /// Where `reset` spawns walkers.
    pub walker_source: SpawnSource,
    pub walker_shape: WalkerShape,
    /// Cluster layout placed by `reset`.
    pub initial_cluster_type: ClusterPattern,
    pub bias_towards: BiasMode,
    pub bias_force: f32,
    /// Honour per-walker bias targets.
    pub use_per_walker_bias: bool,
    /// Confine motion to a centered frame instead of the whole domain.
    pub use_frame: bool,
    pub frame_size: FrameSize,
    /// Width of the spawn band used by the `Edges` source.
    pub edge_margin: f32,
    /// Radius used by the `Circle` source and the `Ring` cluster pattern.
    pub spawn_radius: f32,
    /// Overrides the bounds center for the `Circle` source.
    pub circle_center: Option<Position>,
    pub replenish_walkers: bool,
    /// Source for replenished walkers; `WalkerSource` when unset.
    pub replenishment_source: Option<SpawnSource>,
    pub vary_diameter_by_distance: bool,
    pub vary_diameter_randomly: bool,
    pub prune_old_walkers: bool,
    pub max_age: u32,
    pub prune_distant_walkers: bool,
    pub max_wander_distance: f32,
    /// Record a line for every walker that sticks to a cluster particle.
    pub capture_lines: bool,
    pub show_walkers: bool,
    pub show_clusters: bool,
    pub show_shapes: bool,
    /// Broad-phase grid cell size in world units.
    pub grid_cell_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            circle_diameter: 5.0,
            circle_diameter_range: (2.0, 25.0),
            max_walkers: 5000,
            walker_source: SpawnSource::Random,
            walker_shape: WalkerShape::Circle,
            initial_cluster_type: ClusterPattern::Random,
            bias_towards: BiasMode::None,
            bias_force: 1.0,
            use_per_walker_bias: true,
            use_frame: true,
            frame_size: FrameSize::default(),
            edge_margin: 0.0,
            spawn_radius: 100.0,
            circle_center: None,
            replenish_walkers: false,
            replenishment_source: None,
            vary_diameter_by_distance: false,
            vary_diameter_randomly: false,
            prune_old_walkers: false,
            max_age: 30,
            prune_distant_walkers: false,
            max_wander_distance: 20.0,
            capture_lines: true,
            show_walkers: true,
            show_clusters: true,
            show_shapes: true,
            grid_cell_size: 20.0,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON settings document.
    pub fn from_json(json: &str) -> Result<Self, DlaError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Settings as a pretty JSON document with PascalCase option names.
    pub fn to_json_pretty(&self) -> Result<String, DlaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Source used by the replenishment pass.
    pub fn replenish_source(&self) -> SpawnSource {
        self.replenishment_source.unwrap_or(self.walker_source)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), DlaError> {
        let (width, height) = self.frame_size.dimensions();
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(DlaError::InvalidFrameSize { width, height });
        }

        let (min, max) = self.circle_diameter_range;
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
            return Err(DlaError::InvalidDiameterRange { min, max });
        }

        non_negative("CircleDiameter", self.circle_diameter)?;
        non_negative("EdgeMargin", self.edge_margin)?;
        non_negative("SpawnRadius", self.spawn_radius)?;
        non_negative("MaxWanderDistance", self.max_wander_distance)?;

        if !self.bias_force.is_finite() {
            return Err(DlaError::parameter("BiasForce", "must be finite"));
        }
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(DlaError::parameter("GridCellSize", "must be finite and positive"));
        }
        if let Some(center) = self.circle_center {
            if !(center.x.is_finite() && center.y.is_finite()) {
                return Err(DlaError::parameter("CircleCenter", "must be finite"));
            }
        }
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), DlaError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DlaError::parameter(name, format!("{value} must be finite and non-negative")))
    }
}
