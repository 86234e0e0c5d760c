//! Scripted vertical platforms
//!
//! A platform is an ordinary registered body whose center height is driven
//! here once per tick. [`KinematicPlatforms::advance`] has to run before any
//! actor query of the same tick so every actor sees the platform at the same
//! place.

use crate::config::PlatformConfig;
use crate::foundation::collections::ObstacleHandle;
use crate::foundation::logging::{debug, warn};
use crate::foundation::math::Vec3;
use crate::foundation::time::SimClock;
use crate::physics::collision::Collider;
use crate::physics::collision_system::CollisionWorld;
use crate::physics::error::{PhysicsError, PhysicsResult};

/// One body moving up and down between two heights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicPlatform {
    handle: ObstacleHandle,
    base_height: f32,
    travel: f32,
    velocity: f32,
    height: f32,
}

impl KinematicPlatform {
    /// Body being driven
    pub fn handle(&self) -> ObstacleHandle {
        self.handle
    }

    /// Current center height
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Signed vertical speed in units per tick-equivalent
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Lowest and highest center heights
    pub fn range(&self) -> (f32, f32) {
        (self.base_height, self.base_height + self.travel)
    }

    fn step(&mut self, tick_scale: f32) {
        let (low, high) = self.range();
        self.height += self.velocity * tick_scale;

        if self.height >= high {
            self.height = high;
            self.velocity = -self.velocity.abs();
        } else if self.height <= low {
            self.height = low;
            self.velocity = self.velocity.abs();
        }
    }
}

/// The set of bodies with scripted vertical motion
#[derive(Debug, Clone, Default)]
pub struct KinematicPlatforms {
    platforms: Vec<KinematicPlatform>,
    config: PlatformConfig,
}

impl KinematicPlatforms {
    /// Create an empty set
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            platforms: Vec::new(),
            config,
        }
    }

    /// Drive an already registered body
    ///
    /// The body is moved to `initial_height` right away; it then travels up
    /// by the configured range at `velocity` and back down again.
    pub fn register_kinematic_platform<C: Collider>(
        &mut self,
        world: &mut CollisionWorld<C>,
        handle: ObstacleHandle,
        initial_height: f32,
        velocity: f32,
    ) -> PhysicsResult<()> {
        if self.get(handle).is_some() {
            return Err(PhysicsError::PlatformAlreadyRegistered(handle));
        }
        if !initial_height.is_finite() || !velocity.is_finite() {
            return Err(PhysicsError::InvalidGeometry(format!(
                "platform {handle:?} needs finite height and velocity"
            )));
        }

        let center = world
            .obstacle(handle)
            .map(|body| body.collision_box().center())
            .ok_or(PhysicsError::UnknownObstacle(handle))?;
        world.set_center(handle, Vec3::new(center.x, initial_height, center.z))?;

        debug!("Platform {:?} from {} over {} at {}", handle, initial_height, self.config.travel, velocity);
        self.platforms.push(KinematicPlatform {
            handle,
            base_height: initial_height,
            travel: self.config.travel,
            velocity,
            height: initial_height,
        });
        Ok(())
    }

    /// Stop driving a body; the body itself stays registered
    pub fn remove(&mut self, handle: ObstacleHandle) -> Option<KinematicPlatform> {
        let index = self.platforms.iter().position(|p| p.handle == handle)?;
        Some(self.platforms.remove(index))
    }

    /// Look up a platform by its body
    pub fn get(&self, handle: ObstacleHandle) -> Option<&KinematicPlatform> {
        self.platforms.iter().find(|p| p.handle == handle)
    }

    /// Platforms in registration order
    pub fn iter(&self) -> impl Iterator<Item = &KinematicPlatform> {
        self.platforms.iter()
    }

    /// Number of platforms
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// True when nothing is driven
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Move every platform by one tick and write the new centers back
    ///
    /// Platforms whose body has been removed from the world are dropped.
    pub fn advance<C: Collider>(&mut self, world: &mut CollisionWorld<C>, clock: &SimClock) {
        let tick_scale = clock.tick_scale();

        self.platforms.retain_mut(|platform| {
            let Some(body) = world.obstacle_mut(platform.handle) else {
                warn!("Dropping platform {:?}: body no longer registered", platform.handle);
                return false;
            };

            platform.step(tick_scale);
            let center = body.collision_box().center();
            body.set_center(Vec3::new(center.x, platform.height, center.z));
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::OrientedBox;
    use approx::assert_relative_eq;

    fn world_with_slab() -> (CollisionWorld, ObstacleHandle) {
        let mut world = CollisionWorld::default();
        let slab = world.register_obstacle(
            OrientedBox::axis_aligned(Vec3::new(3.0, 0.0, -2.0), Vec3::new(1.0, 0.25, 1.0)),
            Some(Vec3::y()),
        );
        (world, slab)
    }

    fn center(world: &CollisionWorld, handle: ObstacleHandle) -> Vec3 {
        world.obstacle(handle).unwrap().collision_box().center()
    }

    #[test]
    fn test_register_moves_body_to_initial_height() {
        let (mut world, slab) = world_with_slab();
        let mut platforms = KinematicPlatforms::default();
        platforms.register_kinematic_platform(&mut world, slab, 1.5, 0.05).unwrap();

        assert_eq!(center(&world, slab), Vec3::new(3.0, 1.5, -2.0));
        assert_eq!(platforms.len(), 1);
    }

    #[test]
    fn test_register_errors() {
        let (mut world, slab) = world_with_slab();
        let mut platforms = KinematicPlatforms::default();
        platforms.register_kinematic_platform(&mut world, slab, 0.0, 0.1).unwrap();

        assert_eq!(
            platforms.register_kinematic_platform(&mut world, slab, 0.0, 0.1),
            Err(PhysicsError::PlatformAlreadyRegistered(slab))
        );

        world.remove_obstacle(slab).unwrap();
        let mut fresh = KinematicPlatforms::default();
        assert_eq!(
            fresh.register_kinematic_platform(&mut world, slab, 0.0, 0.1),
            Err(PhysicsError::UnknownObstacle(slab))
        );
    }

    #[test]
    fn test_platform_reverses_at_ends() {
        let (mut world, slab) = world_with_slab();
        let mut platforms = KinematicPlatforms::new(PlatformConfig { travel: 1.0 });
        platforms.register_kinematic_platform(&mut world, slab, 0.0, 0.3).unwrap();
        let clock = SimClock::from_rate(60);

        let mut heights = Vec::new();
        for _ in 0..10 {
            platforms.advance(&mut world, &clock);
            heights.push(center(&world, slab).y);
        }

        let expected = [0.3, 0.6, 0.9, 1.0, 0.7, 0.4, 0.1, 0.0, 0.3, 0.6];
        for (height, expected) in heights.iter().zip(expected) {
            assert_relative_eq!(*height, expected, epsilon = 1e-3);
        }
        assert!(platforms.get(slab).unwrap().velocity() > 0.0);
    }

    #[test]
    fn test_motion_scales_with_tick_rate() {
        let (mut world, slab) = world_with_slab();
        let mut platforms = KinematicPlatforms::default();
        platforms.register_kinematic_platform(&mut world, slab, 0.0, 0.1).unwrap();

        platforms.advance(&mut world, &SimClock::from_rate(120));
        assert_relative_eq!(center(&world, slab).y, 0.05, epsilon = 1e-4);
    }

    #[test]
    fn test_removed_body_drops_platform() {
        let (mut world, slab) = world_with_slab();
        let mut platforms = KinematicPlatforms::default();
        platforms.register_kinematic_platform(&mut world, slab, 0.0, 0.1).unwrap();

        world.remove_obstacle(slab).unwrap();
        platforms.advance(&mut world, &SimClock::default());
        assert!(platforms.is_empty());
    }
}
