//! # Collision Engine
//!
//! Collision detection and movement resolution for a first-person action
//! game: sphere-proxy actors moving through box-shaped level geometry.
//!
//! ## Features
//!
//! - **Oriented boxes**: exact SAT box-box tests, closest point and sphere penetration
//! - **Obstacle registry**: handle-keyed, insertion-ordered, deepest-contact queries
//! - **Ground/ceiling probes**: stepped vertical sampling with floor/wall classification
//! - **Movement resolver**: direct, step-up, slide, per-axis and fan-search strategies
//! - **Vertical integrator**: gravity, jumps, ground snap, ceiling clip and timed step-climbs
//! - **Kinematic platforms**: scripted vertical motion applied before actor queries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collision_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PhysicsConfig::load_from_file("config/physics.toml")?;
//!     let mut world = PhysicsWorld::new(config, SimClock::from_rate(60));
//!     world.register_obstacle(
//!         OrientedBox::axis_aligned(Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0)),
//!         Some(Vec3::y()),
//!     );
//!
//!     let player = world.spawn_actor(ActorKind::Player, Vec3::new(0.0, 2.0, 0.0));
//!     for _ in 0..120 {
//!         world.step(&[(player, ActorInput::walk(Vec3::new(0.1, 0.0, 0.0)))])?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::must_use_candidate
)]

pub mod config;
pub mod foundation;
pub mod physics;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        foundation::{
            collections::{ActorId, ObstacleHandle},
            math::{Quat, Vec3},
            time::SimClock,
        },
        physics::{
            resolve_movement, ActorInput, ActorKind, Collider, CollisionWorld, MoveStage, Obstacle,
            ObstacleGeometry, OrientedBox, PhysicsError, PhysicsWorld, VerticalPhase,
        },
    };
}
