//! Collision bodies and the capability they share
//!
//! Anything that "has a box and can report contacts" implements [`Collider`].
//! The registry and every query are generic over that capability only, so
//! static level boxes, kinematic platforms and actor proxies are all handled
//! by the same code.

use serde::{Deserialize, Serialize};

use super::primitives::OrientedBox;
use crate::foundation::math::{rotation_from_degrees, try_direction, Quat, Vec3};

/// Minimal capability of a registered body
pub trait Collider {
    /// World-space box, rebuilt from the current transform on every call
    fn collision_box(&self) -> OrientedBox;

    /// Normal used to tell floor from wall, if the body declares one
    fn surface_normal(&self) -> Option<Vec3> {
        None
    }

    /// Move the body to a new center (kinematic motion or actor write-back)
    fn set_center(&mut self, center: Vec3);
}

/// Opaque back-reference to whatever renders an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualTag(pub u64);

/// Level geometry as handed over by the level loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleGeometry {
    /// Box center
    pub center: Vec3,
    /// Box half-size on each local axis
    pub half_extents: Vec3,
    /// Euler rotation in degrees (roll, pitch, yaw)
    #[serde(default = "Vec3::zeros")]
    pub rotation_degrees: Vec3,
    /// Floor/wall classification normal
    #[serde(default)]
    pub normal: Option<Vec3>,
    /// Render-side identifier
    #[serde(default)]
    pub visual: Option<u64>,
}

/// A static or kinematic box in the level
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    center: Vec3,
    half_extents: Vec3,
    rotation: Quat,
    normal: Option<Vec3>,
    visual: Option<VisualTag>,
}

impl Obstacle {
    /// Obstacle from an existing box and optional classification normal
    ///
    /// A normal too short to carry a direction is dropped.
    pub fn new(geometry: OrientedBox, normal: Option<Vec3>) -> Self {
        Self {
            center: geometry.center(),
            half_extents: geometry.half_extents(),
            rotation: geometry.rotation(),
            normal: normal.as_ref().and_then(try_direction),
            visual: None,
        }
    }

    /// Attach the render-side back-reference
    pub fn with_visual(mut self, visual: VisualTag) -> Self {
        self.visual = Some(visual);
        self
    }

    /// Render-side back-reference
    pub fn visual(&self) -> Option<VisualTag> {
        self.visual
    }

    /// Current center
    pub fn center(&self) -> Vec3 {
        self.center
    }
}

impl From<&ObstacleGeometry> for Obstacle {
    fn from(desc: &ObstacleGeometry) -> Self {
        let geometry = OrientedBox::new(desc.center, desc.half_extents, rotation_from_degrees(&desc.rotation_degrees));
        let obstacle = Self::new(geometry, desc.normal);
        match desc.visual {
            Some(tag) => obstacle.with_visual(VisualTag(tag)),
            None => obstacle,
        }
    }
}

impl Collider for Obstacle {
    fn collision_box(&self) -> OrientedBox {
        OrientedBox::new(self.center, self.half_extents, self.rotation)
    }

    fn surface_normal(&self) -> Option<Vec3> {
        self.normal
    }

    fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }
}

/// Registered proxy of a moving actor
///
/// Lets other actors bump into it; the owning actor passes its own handle as
/// the ignore-identity so it never collides with itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorBody {
    /// Actor position
    pub center: Vec3,
    /// Sphere proxy radius
    pub radius: f32,
}

impl ActorBody {
    /// Create a proxy body
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Collider for ActorBody {
    fn collision_box(&self) -> OrientedBox {
        OrientedBox::axis_aligned(self.center, Vec3::repeat(self.radius))
    }

    fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }
}

/// Any body a mixed world can hold
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Level geometry
    Obstacle(Obstacle),
    /// Actor proxy
    Actor(ActorBody),
}

impl Collider for Body {
    fn collision_box(&self) -> OrientedBox {
        match self {
            Self::Obstacle(obstacle) => obstacle.collision_box(),
            Self::Actor(actor) => actor.collision_box(),
        }
    }

    fn surface_normal(&self) -> Option<Vec3> {
        match self {
            Self::Obstacle(obstacle) => obstacle.surface_normal(),
            Self::Actor(actor) => actor.surface_normal(),
        }
    }

    fn set_center(&mut self, center: Vec3) {
        match self {
            Self::Obstacle(obstacle) => obstacle.set_center(center),
            Self::Actor(actor) => actor.set_center(center),
        }
    }
}

impl From<Obstacle> for Body {
    fn from(obstacle: Obstacle) -> Self {
        Self::Obstacle(obstacle)
    }
}

impl From<ActorBody> for Body {
    fn from(actor: ActorBody) -> Self {
        Self::Actor(actor)
    }
}

impl From<&ObstacleGeometry> for Body {
    fn from(desc: &ObstacleGeometry) -> Self {
        Self::Obstacle(Obstacle::from(desc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_obstacle_box_follows_center() {
        let mut obstacle = Obstacle::new(
            OrientedBox::axis_aligned(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 0.5, 2.0)),
            Some(Vec3::new(0.0, 3.0, 0.0)),
        );
        assert_relative_eq!(obstacle.surface_normal().unwrap(), Vec3::y(), epsilon = 1e-6);

        obstacle.set_center(Vec3::new(0.0, 4.0, 0.0));
        let rebuilt = obstacle.collision_box();
        assert_relative_eq!(rebuilt.top(), 4.5, epsilon = 1e-6);
        assert_eq!(rebuilt.half_extents(), Vec3::new(2.0, 0.5, 2.0));
    }

    #[test]
    fn test_degenerate_normal_is_dropped() {
        let obstacle = Obstacle::new(OrientedBox::axis_aligned(Vec3::zeros(), Vec3::repeat(1.0)), Some(Vec3::zeros()));
        assert!(obstacle.surface_normal().is_none());
    }

    #[test]
    fn test_geometry_description_parses_from_ron() {
        let desc: ObstacleGeometry = ron::from_str(
            "(center: (0.0, 2.0, 0.0), half_extents: (1.0, 0.25, 1.0), rotation_degrees: (0.0, 90.0, 0.0), visual: Some(12))",
        )
        .unwrap();
        let obstacle = Obstacle::from(&desc);

        assert_eq!(obstacle.visual(), Some(VisualTag(12)));
        assert!(obstacle.surface_normal().is_none());
        // Quarter turn about Y moves the local X axis onto Z
        let axes = obstacle.collision_box().axes();
        assert_relative_eq!(axes[0].z.abs(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_actor_body_is_radius_cube() {
        let body = Body::from(ActorBody::new(Vec3::new(1.0, 2.0, 3.0), 0.5));
        let collision_box = body.collision_box();
        assert_eq!(collision_box.half_extents(), Vec3::repeat(0.5));
        assert_eq!(collision_box.center(), Vec3::new(1.0, 2.0, 3.0));
        assert!(body.surface_normal().is_none());
    }
}
