//! DLA Simulation Core
//!
//! A tick-driven diffusion-limited aggregation engine. Walkers random-walk
//! under an optional directional bias and stick when they touch the growing
//! cluster or an imported shape.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod bounds;
pub mod collision;
pub mod components;
pub mod config;
pub mod error;
pub mod population;
pub mod registry;
pub mod rng;
pub mod seeding;
pub mod shapes;
pub mod spatial;
pub mod systems;
pub mod world;

pub use api::{SimWorld, WalkerParams};
pub use bounds::Bounds;
pub use collision::Collider;
pub use components::*;
pub use config::{BiasMode, ClusterPattern, FrameSize, SimConfig, SpawnSource, WalkerShape, WallEdge};
pub use error::DlaError;
pub use rng::SimRng;
pub use shapes::{ShapeImport, ShapePath};
pub use spatial::{Aabb, SpatialEntry, SpatialGrid};
pub use systems::*;
pub use world::{BodySnapshot, GeometrySnapshot, ShapeSnapshot, Snapshot, Visibility};
