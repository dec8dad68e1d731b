//! Injected pseudo-random source.
//!
//! The engine never reaches for a thread-local generator. Callers hand in any
//! `RngCore`, which makes runs seedable and lets tests script the sequence.

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;

/// Resource wrapping the generator used by motion and spawning.
#[derive(Resource)]
pub struct SimRng(Box<dyn RngCore + Send + Sync>);

impl SimRng {
    pub fn new(rng: impl RngCore + Send + Sync + 'static) -> Self {
        Self(Box::new(rng))
    }

    /// Deterministic `StdRng` stream for `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.0.fill_bytes(dst)
    }
}

impl fmt::Debug for SimRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SimRng")
    }
}
