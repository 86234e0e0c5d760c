//! Errors raised by registry and arena operations
//!
//! Geometric queries never fail; only operations that take a handle can.

use crate::foundation::collections::{ActorId, ObstacleHandle};

/// Physics errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Handle does not name a live body
    #[error("Unknown obstacle: {0:?}")]
    UnknownObstacle(ObstacleHandle),

    /// Id does not name a live actor
    #[error("Unknown actor: {0:?}")]
    UnknownActor(ActorId),

    /// Body already driven by a kinematic platform
    #[error("Obstacle {0:?} is already a kinematic platform")]
    PlatformAlreadyRegistered(ObstacleHandle),

    /// Geometry that cannot be simulated
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result alias for physics operations
pub type PhysicsResult<T> = Result<T, PhysicsError>;
