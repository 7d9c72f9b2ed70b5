//! Error types surfaced synchronously at the call site that caused them.

use thiserror::Error;

use crate::core::shape::ShapeType;

/// Fatal conditions reported by the physics core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Invalid shape, body or joint parameters. Never silently clamped.
    #[error("invalid {what}: {reason}")]
    Configuration { what: &'static str, reason: String },

    /// The narrow-phase dispatch table has no entry for this shape-type pair.
    #[error("no narrow-phase detector for {first:?} against {second:?}")]
    UnsupportedPair { first: ShapeType, second: ShapeType },

    /// A handle was already released or never belonged to this world.
    #[error("stale or unknown {kind} handle")]
    StaleHandle { kind: &'static str },

    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f32),
}

impl PhysicsError {
    pub(crate) fn config(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            what,
            reason: reason.into(),
        }
    }
}

/// Convenient Result alias for fallible physics operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;
