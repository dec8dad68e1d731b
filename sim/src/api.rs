//! Public API for the simulation.
//!
//! This module provides the main interface for a renderer or input layer to
//! drive the simulation.
//!
//! ## Ticks
//!
//! The host loop calls [`SimWorld::tick`] once per frame. A running tick runs
//! the system schedule in order (prune, replenish, motion, spatial index,
//! aggregation) and then advances the tick counter. A paused tick does nothing
//! at all.
//!
//! ## Reconfiguration
//!
//! Changing the domain size or the frame mode moves the bounds, so those
//! operations reset the world. Other settings take effect on the next tick or
//! the next reset.

use crate::bounds::Bounds;
use crate::components::*;
use crate::config::{BiasMode, ClusterPattern, SimConfig, SpawnSource, WallEdge};
use crate::error::DlaError;
use crate::population::spawn_walkers;
use crate::registry;
use crate::rng::SimRng;
use crate::seeding;
use crate::shapes::{self, ShapeImport, ShapePath};
use crate::spatial::SpatialGrid;
use crate::systems::{tick_schedule, MovementField};
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use rand::{RngCore, SeedableRng};
use tracing::info;

/// Parameters for [`SimWorld::create_walker`].
#[derive(Debug, Clone, PartialEq)]
pub struct WalkerParams {
    pub position: Position,
    pub geometry: Geometry,
    pub bias_target: Option<BiasTarget>,
}

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Building and resetting the simulation
/// - Stepping the simulation forward
/// - Extracting state snapshots
/// - Applying input from the host
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    paused: bool,
    /// Domain size given by the host; bounds are derived from it.
    domain: (f32, f32),
}

fn check_domain(width: f32, height: f32) -> Result<(), DlaError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(DlaError::parameter(
            "domain",
            format!("{width}x{height} must be finite and positive"),
        ))
    }
}

impl SimWorld {
    /// Create an empty world over a `width` x `height` domain.
    ///
    /// The world starts running with no bodies; call [`SimWorld::reset`] to
    /// seed the cluster and spawn the initial walkers.
    pub fn new(
        width: f32,
        height: f32,
        config: SimConfig,
        rng: impl RngCore + Send + Sync + 'static,
    ) -> Result<Self, DlaError> {
        config.validate()?;
        check_domain(width, height)?;

        let mut world = World::new();
        world.insert_resource(Bounds::from_domain(width, height, &config));
        world.insert_resource(SpatialGrid::new(config.grid_cell_size));
        world.insert_resource(SimRng::new(rng));
        world.insert_resource(ActiveWalkers::default());
        world.insert_resource(NextIds::default());
        world.insert_resource(ClusterLines::default());
        world.insert_resource(config);

        Ok(Self {
            world,
            schedule: tick_schedule(),
            tick: 0,
            paused: false,
            domain: (width, height),
        })
    }

    /// [`SimWorld::new`] with a seeded `StdRng`.
    pub fn with_seed(width: f32, height: f32, config: SimConfig, seed: u64) -> Result<Self, DlaError> {
        Self::new(width, height, config, rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Advance the simulation by one tick. No-op while paused.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        self.schedule.run(&mut self.world);
        self.tick += 1;
    }

    // ------------------------------------------------------------------
    // Pause control
    // ------------------------------------------------------------------

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ------------------------------------------------------------------
    // Population
    // ------------------------------------------------------------------

    /// Clear everything, seed the initial cluster and spawn `MaxWalkers`
    /// walkers from `WalkerSource`.
    pub fn reset(&mut self) {
        let removed = registry::remove_all(&mut self.world);
        let (pattern, count, source) = {
            let config = self.config();
            (config.initial_cluster_type, config.max_walkers, config.walker_source)
        };
        let seeded = seeding::seed_clusters(&mut self.world, pattern);
        let spawned = spawn_walkers(&mut self.world, count, source);
        info!(
            removed,
            seeded = seeded.len(),
            walkers = spawned.len(),
            %source,
            "simulation reset"
        );
    }

    /// Remove every body and shape.
    pub fn remove_all(&mut self) -> usize {
        registry::remove_all(&mut self.world)
    }

    /// Spawn `count` walkers placed by `source`.
    pub fn spawn(&mut self, count: usize, source: SpawnSource) -> Vec<BodyId> {
        let entities = spawn_walkers(&mut self.world, count, source);
        self.body_ids(&entities)
    }

    /// Create one walker with explicit position, geometry and bias target.
    /// The position is clamped into the bounds.
    pub fn create_walker(&mut self, params: WalkerParams) -> BodyId {
        let position = self.bounds().clamp_inside(params.position);
        let id = self.world.resource::<NextIds>().peek_body();
        let entity = registry::create_body(&mut self.world, params.geometry, position, false);
        if let Some(target) = params.bias_target {
            self.world.entity_mut(entity).insert(target);
        }
        id
    }

    /// Create stuck cluster particles at the given points.
    pub fn create_cluster_from_coords(&mut self, coords: &[Position]) -> Vec<BodyId> {
        let entities = seeding::create_cluster_from_coords(&mut self.world, coords);
        self.body_ids(&entities)
    }

    /// Place an initial cluster layout without clearing the world.
    pub fn seed_clusters(&mut self, pattern: ClusterPattern) -> Vec<BodyId> {
        let entities = seeding::seed_clusters(&mut self.world, pattern);
        self.body_ids(&entities)
    }

    /// Line one edge of the bounds with stuck particles.
    pub fn seed_wall(&mut self, edge: WallEdge) -> Vec<BodyId> {
        let entities = seeding::seed_wall(&mut self.world, edge);
        self.body_ids(&entities)
    }

    /// Import static shapes. Unusable paths are skipped and reported.
    pub fn create_shapes_from_paths(&mut self, paths: &[ShapePath]) -> ShapeImport {
        shapes::create_shapes_from_paths(&mut self.world, paths)
    }

    /// Point every current walker at `target`, or clear all targets with `None`.
    pub fn set_bias_target_all(&mut self, target: Option<BiasTarget>) {
        let mut query = self.world.query_filtered::<(Entity, &Stuck), With<Geometry>>();
        let walkers: Vec<Entity> = query
            .iter(&self.world)
            .filter(|(_, stuck)| !stuck.is_stuck())
            .map(|(entity, _)| entity)
            .collect();

        for entity in walkers {
            let mut entity = self.world.entity_mut(entity);
            match target {
                Some(target) => {
                    entity.insert(target);
                }
                None => {
                    entity.remove::<BiasTarget>();
                }
            }
        }
    }

    /// Install a per-position force added to every walker's step, on top of
    /// the bias. Survives resets.
    pub fn set_movement_field(&mut self, field: impl Fn(&Position) -> (f32, f32) + Send + Sync + 'static) {
        self.world.insert_resource(MovementField::new(field));
    }

    pub fn clear_movement_field(&mut self) {
        self.world.remove_resource::<MovementField>();
    }

    fn body_ids(&self, entities: &[Entity]) -> Vec<BodyId> {
        entities
            .iter()
            .filter_map(|&e| self.world.get::<BodyId>(e).copied())
            .collect()
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Switch between frame and whole-domain bounds, then reset.
    pub fn toggle_use_frame(&mut self) {
        let use_frame = {
            let mut config = self.world.resource_mut::<SimConfig>();
            config.use_frame = !config.use_frame;
            config.use_frame
        };
        self.refresh_bounds();
        info!(use_frame, "frame mode toggled");
        self.reset();
    }

    /// Change the domain size, then reset.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), DlaError> {
        check_domain(width, height)?;
        self.domain = (width, height);
        self.refresh_bounds();
        info!(width, height, "domain resized");
        self.reset();
        Ok(())
    }

    /// Replace the configuration.
    ///
    /// Invalid configurations are rejected and leave the world untouched. If
    /// the new settings move the bounds the world is reset; otherwise they
    /// apply from the next tick and reset.
    pub fn set_config(&mut self, config: SimConfig) -> Result<(), DlaError> {
        config.validate()?;
        self.world.resource_mut::<SpatialGrid>().cell_size = config.grid_cell_size;
        self.world.insert_resource(config);
        if self.refresh_bounds() {
            self.reset();
        }
        Ok(())
    }

    /// Change the global bias mode.
    pub fn set_bias_mode(&mut self, mode: BiasMode) {
        self.world.resource_mut::<SimConfig>().bias_towards = mode;
    }

    /// Edit a copy of the configuration and apply it through
    /// [`SimWorld::set_config`]. A rejected edit leaves the world untouched.
    pub fn update_config(&mut self, edit: impl FnOnce(&mut SimConfig)) -> Result<(), DlaError> {
        let mut config = self.config().clone();
        edit(&mut config);
        self.set_config(config)
    }

    pub fn toggle_show_walkers(&mut self) {
        let mut config = self.world.resource_mut::<SimConfig>();
        config.show_walkers = !config.show_walkers;
    }

    pub fn toggle_show_clusters(&mut self) {
        let mut config = self.world.resource_mut::<SimConfig>();
        config.show_clusters = !config.show_clusters;
    }

    pub fn toggle_show_shapes(&mut self) {
        let mut config = self.world.resource_mut::<SimConfig>();
        config.show_shapes = !config.show_shapes;
    }

    /// Recompute bounds from the domain and frame settings. Returns whether
    /// they changed.
    fn refresh_bounds(&mut self) -> bool {
        let (width, height) = self.domain;
        let bounds = Bounds::from_domain(width, height, self.config());
        let mut current = self.world.resource_mut::<Bounds>();
        if *current == bounds {
            return false;
        }
        *current = bounds;
        info!(?bounds, "bounds updated");
        true
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.paused)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Value of the active-walker counter.
    pub fn active_walkers(&self) -> usize {
        self.world.resource::<ActiveWalkers>().0
    }

    /// Non-stuck bodies counted directly, for checking the counter.
    pub fn count_unstuck(&mut self) -> usize {
        registry::count_unstuck(&mut self.world)
    }

    pub fn body_count(&mut self) -> usize {
        self.world.query::<&BodyId>().iter(&self.world).count()
    }

    pub fn stuck_count(&mut self) -> usize {
        self.body_count() - self.count_unstuck()
    }

    pub fn shape_count(&mut self) -> usize {
        self.world.query::<&ShapeId>().iter(&self.world).count()
    }

    pub fn bounds(&self) -> Bounds {
        *self.world.resource::<Bounds>()
    }

    pub fn domain(&self) -> (f32, f32) {
        self.domain
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    /// Get the spatial grid reference (for debugging/visualization).
    pub fn spatial_grid(&self) -> &SpatialGrid {
        self.world.resource::<SpatialGrid>()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }
}
