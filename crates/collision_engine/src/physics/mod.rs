//! Collision detection and movement resolution
//!
//! Sphere-proxy actors against static and kinematic box obstacles. Queries
//! are pure reads of the registry; only kinematic platforms and each actor's
//! own body are written, and always in the order driven by
//! [`simulation::PhysicsWorld::step`].

pub mod actor;
pub mod collision;
pub mod collision_system;
pub mod error;
pub mod kinematic;
pub mod movement;
pub mod simulation;
pub mod vertical;

pub use actor::{Actor, ActorInput, ActorKind, TickContext};
pub use collision::{
    ActorBody,
    Body,
    BoundingSphere,
    Collider,
    Obstacle,
    ObstacleGeometry,
    OrientedBox,
    SphereContact,
};
pub use collision_system::{CollisionResult, CollisionWorld, Contact, GroundProbeResult, SurfaceHit};
pub use error::{PhysicsError, PhysicsResult};
pub use kinematic::{KinematicPlatform, KinematicPlatforms};
pub use movement::{resolve_movement, ClimbTarget, MoveOutcome, MoveRequest, MoveStage, MovementResolver};
pub use simulation::PhysicsWorld;
pub use vertical::{VerticalInput, VerticalIntegrator, VerticalPhase, VerticalState};
