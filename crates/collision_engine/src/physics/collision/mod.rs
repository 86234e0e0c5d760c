//! Narrow-phase collision geometry
//!
//! Level geometry is described by oriented boxes; moving actors are sphere
//! proxies. Both are stored in model terms (center, extents, rotation) and
//! the world-space box with its axes is rebuilt on every access.
//!
//! # Module Organization
//!
//! - [`primitives`] - Sphere proxy, oriented box, SAT and sphere-box tests
//! - [`shape`] - The `Collider` capability and the bodies that implement it

pub mod primitives;
pub mod shape;

// Re-export commonly used types
pub use primitives::{BoundingSphere, Interval, NarrowPhase, OrientedBox, SphereContact};
pub use shape::{ActorBody, Body, Collider, Obstacle, ObstacleGeometry, VisualTag};
