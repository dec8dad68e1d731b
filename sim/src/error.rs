//! Error type shared by configuration, construction and shape import.

use thiserror::Error;

/// Errors emitted by the simulation engine.
///
/// Everything except [`DlaError::InvalidGeometry`] is a configuration error:
/// it is raised while building or reconfiguring a `SimWorld` and the
/// offending configuration is rejected as a whole.
#[derive(Debug, Error)]
pub enum DlaError {
    #[error("unknown spawn source '{0}' (expected Edges, Circle, Random, RandomCircle or Center)")]
    UnknownSpawnSource(String),

    #[error("frame size {width}x{height} must be finite and positive")]
    InvalidFrameSize { width: f32, height: f32 },

    #[error("diameter range [{min}, {max}] is invalid: bounds must be finite, non-negative and min <= max")]
    InvalidDiameterRange { min: f32, max: f32 },

    #[error("invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A single imported path could not be turned into a shape. Recoverable.
    #[error("shape path {index} skipped: {reason}")]
    InvalidGeometry { index: usize, reason: &'static str },
}

impl DlaError {
    /// `true` for errors that reject a configuration outright.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, DlaError::InvalidGeometry { .. })
    }

    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        DlaError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
