//! Collision-aware horizontal movement
//!
//! One resolver serves every actor. Given a position and the displacement an
//! actor wants this tick, it tries progressively looser strategies and keeps
//! the first one that ends in free space:
//!
//! 1. Direct move
//! 2. Step-up onto a low ledge (grounded actors only; arms a timed climb)
//! 3. Slide along the contact plane
//! 4. Each horizontal axis on its own
//! 5. Fan search around the desired direction
//!
//! If nothing works the actor stays exactly where it was.

use crate::config::MovementConfig;
use crate::foundation::collections::ObstacleHandle;
use crate::foundation::logging::trace;
use crate::foundation::math::{horizontal, is_finite, rotate_about_up, try_direction, Vec3, DIRECTION_EPSILON};
use crate::physics::collision::Collider;
use crate::physics::collision_system::CollisionWorld;

/// Which strategy produced a [`MoveOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveStage {
    /// Nothing was requested
    Idle,
    /// The full displacement was free
    Direct,
    /// A ledge climb was armed; the position is unchanged until it runs
    StepUp,
    /// Displacement projected onto the contact plane
    Slide,
    /// Displacement applied per horizontal axis
    AxisSeparated,
    /// Best free direction from the fan
    FanSearch,
    /// Every strategy failed
    Blocked,
}

/// Start and end of a step-climb transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimbTarget {
    /// Position when the climb was armed
    pub start: Vec3,
    /// Position on top of the ledge
    pub target: Vec3,
}

/// Result of resolving one displacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Corrected position
    pub position: Vec3,
    /// Strategy that succeeded
    pub stage: MoveStage,
    /// Armed climb, only for [`MoveStage::StepUp`]
    pub climb: Option<ClimbTarget>,
}

impl MoveOutcome {
    fn at(position: Vec3, stage: MoveStage) -> Self {
        Self {
            position,
            stage,
            climb: None,
        }
    }
}

/// What an actor wants to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Current position (sphere center)
    pub position: Vec3,
    /// Desired displacement, already clamped to the actor's speed
    pub displacement: Vec3,
    /// Sphere proxy radius
    pub radius: f32,
    /// Distance from the feet to the position
    pub stand_height: f32,
    /// Body the actor must not collide with (its own proxy)
    pub ignore: Option<ObstacleHandle>,
    /// Step-up is only attempted from the ground
    pub grounded: bool,
}

impl MoveRequest {
    /// Airborne request with the feet at the bottom of the sphere
    pub fn new(position: Vec3, displacement: Vec3, radius: f32) -> Self {
        Self {
            position,
            displacement,
            radius,
            stand_height: radius,
            ignore: None,
            grounded: false,
        }
    }

    /// Skip this body in every query
    pub fn ignoring(mut self, handle: ObstacleHandle) -> Self {
        self.ignore = Some(handle);
        self
    }

    /// Mark the actor as standing, with its feet `stand_height` below the position
    pub fn standing(mut self, stand_height: f32) -> Self {
        self.grounded = true;
        self.stand_height = stand_height;
        self
    }
}

/// Remove the part of `displacement` that goes along `normal`
pub fn clip_to_plane(displacement: &Vec3, normal: &Vec3) -> Vec3 {
    displacement - normal * displacement.dot(normal)
}

/// The shared sliding and stepping algorithm
#[derive(Debug, Clone, Default)]
pub struct MovementResolver {
    config: MovementConfig,
}

impl MovementResolver {
    /// Create a resolver
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Resolver tunables
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Turn a desired displacement into a collision-free position
    pub fn resolve<C: Collider>(&self, world: &CollisionWorld<C>, request: &MoveRequest) -> MoveOutcome {
        let MoveRequest {
            position,
            displacement,
            radius,
            ignore,
            ..
        } = *request;
        assert!(is_finite(&position), "move position must be finite: {position:?}");
        assert!(is_finite(&displacement), "move displacement must be finite: {displacement:?}");

        if displacement.norm_squared() < DIRECTION_EPSILON {
            return MoveOutcome::at(position, MoveStage::Idle);
        }

        let direct = world.get_collision_info(position + displacement, radius, ignore);
        let Some(penetration) = direct.penetration() else {
            return MoveOutcome::at(position + displacement, MoveStage::Direct);
        };

        if request.grounded {
            if let Some(climb) = self.try_step_up(world, request) {
                trace!("Step-up from {:?} to {:?}", climb.start, climb.target);
                return MoveOutcome {
                    position,
                    stage: MoveStage::StepUp,
                    climb: Some(climb),
                };
            }
        }

        if let Some(slid) = self.try_slide(world, request, &penetration) {
            trace!("Slide along {:?} to {:?}", penetration, slid);
            return MoveOutcome::at(slid, MoveStage::Slide);
        }

        if let Some(partial) = self.try_axes(world, request) {
            trace!("Axis-separated move to {:?}", partial);
            return MoveOutcome::at(partial, MoveStage::AxisSeparated);
        }

        if let Some(best) = self.fan_search(world, request) {
            trace!("Fan search picked {:?}", best);
            return MoveOutcome::at(best, MoveStage::FanSearch);
        }

        trace!("Move from {:?} blocked in every direction", position);
        MoveOutcome::at(position, MoveStage::Blocked)
    }

    fn try_step_up<C: Collider>(&self, world: &CollisionWorld<C>, request: &MoveRequest) -> Option<ClimbTarget> {
        let step_height = self.config.step_height;
        let step = horizontal(&request.displacement);
        if step.norm_squared() < DIRECTION_EPSILON || step_height <= 0.0 {
            return None;
        }

        let raised = request.position + step + Vec3::new(0.0, step_height, 0.0);
        if world.check_collision(raised, request.radius, request.ignore) {
            return None;
        }

        // Reach down to where the sphere would rest on a floor at foot level
        let foot = request.position.y - request.stand_height;
        let probe_height = step_height + request.stand_height - request.radius;
        let ground = world.check_ground_collision(raised, request.radius, probe_height, request.ignore);
        let height = ground.ground_height()?;

        let delta = height - foot;
        if delta <= 0.0 || delta > step_height {
            trace!("Ledge delta {} outside (0, {}]", delta, step_height);
            return None;
        }

        let target = request.position + step;
        Some(ClimbTarget {
            start: request.position,
            target: Vec3::new(target.x, height + request.stand_height, target.z),
        })
    }

    fn try_slide<C: Collider>(&self, world: &CollisionWorld<C>, request: &MoveRequest, penetration: &Vec3) -> Option<Vec3> {
        let normal = try_direction(&horizontal(penetration))?;
        let desired = horizontal(&request.displacement);
        let slid = try_direction(&clip_to_plane(&desired, &normal))? * desired.norm();

        let candidate = request.position + slid;
        (!world.check_collision(candidate, request.radius, request.ignore)).then_some(candidate)
    }

    fn try_axes<C: Collider>(&self, world: &CollisionWorld<C>, request: &MoveRequest) -> Option<Vec3> {
        let mut current = request.position;
        let mut moved = false;

        for axis in [Vec3::x(), Vec3::z()] {
            let component = axis * request.displacement.dot(&axis);
            if component.norm_squared() < DIRECTION_EPSILON {
                continue;
            }
            let candidate = current + component;
            if !world.check_collision(candidate, request.radius, request.ignore) {
                current = candidate;
                moved = true;
            }
        }

        moved.then_some(current)
    }

    fn fan_search<C: Collider>(&self, world: &CollisionWorld<C>, request: &MoveRequest) -> Option<Vec3> {
        let desired = horizontal(&request.displacement);
        if desired.norm_squared() < DIRECTION_EPSILON {
            return None;
        }

        let samples = self.config.fan_samples.max(2);
        let half_angle = self.config.fan_half_angle_degrees.to_radians();
        let mut best: Option<(Vec3, f32)> = None;

        for i in 0..samples {
            let angle = -half_angle + 2.0 * half_angle * i as f32 / (samples - 1) as f32;
            let candidate = rotate_about_up(&desired, angle);
            let position = request.position + candidate;
            if world.check_collision(position, request.radius, request.ignore) {
                continue;
            }

            let score = candidate.dot(&request.displacement).max(0.0) * candidate.norm();
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((position, score));
            }
        }

        best.filter(|(_, score)| *score > 0.0).map(|(position, _)| position)
    }
}

/// Resolve an airborne move with default tunables
///
/// Airborne-only form: the request is never grounded, so the step-up stage
/// is skipped and no climb is armed, and the default [`MovementConfig`] is
/// used. Grounded actors and loaded configurations go through
/// [`MovementResolver::resolve`], which also reports the [`MoveOutcome`].
pub fn resolve_movement<C: Collider>(
    world: &CollisionWorld<C>,
    position: Vec3,
    displacement: Vec3,
    radius: f32,
    ignore: Option<ObstacleHandle>,
) -> Vec3 {
    let mut request = MoveRequest::new(position, displacement, radius);
    request.ignore = ignore;
    MovementResolver::default().resolve(world, &request).position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::{ActorBody, Body, OrientedBox};
    use approx::assert_relative_eq;

    const RADIUS: f32 = 0.5;
    const STAND: f32 = 0.75;

    fn wall(center: Vec3, half: Vec3) -> OrientedBox {
        OrientedBox::axis_aligned(center, half)
    }

    fn world_with(boxes: &[OrientedBox]) -> CollisionWorld {
        let mut world = CollisionWorld::default();
        for b in boxes {
            world.register_obstacle(*b, None);
        }
        world
    }

    /// Floor with its top at y = 0 and a step whose top is at `step_top`
    fn step_world(step_top: f32) -> CollisionWorld {
        let mut world = CollisionWorld::default();
        world.register_obstacle(wall(Vec3::new(0.0, -0.5, 0.0), Vec3::new(10.0, 0.5, 10.0)), Some(Vec3::y()));
        world.register_obstacle(
            wall(Vec3::new(1.5, step_top / 2.0, 0.0), Vec3::new(0.5, step_top / 2.0, 2.0)),
            Some(Vec3::y()),
        );
        world
    }

    #[test]
    fn test_zero_displacement_is_identity() {
        let worlds = [
            world_with(&[]),
            world_with(&[wall(Vec3::zeros(), Vec3::repeat(1.0))]),
            step_world(0.5),
        ];
        let position = Vec3::new(0.25, 0.3, -0.1);

        for world in &worlds {
            let outcome = MovementResolver::default().resolve(world, &MoveRequest::new(position, Vec3::zeros(), RADIUS).standing(STAND));
            assert_eq!(outcome.position, position);
            assert_eq!(outcome.stage, MoveStage::Idle);
            assert_eq!(resolve_movement(world, position, Vec3::zeros(), RADIUS, None), position);
        }
    }

    #[test]
    fn test_direct_move_in_open_space() {
        let world = world_with(&[wall(Vec3::new(0.0, 0.0, 10.0), Vec3::repeat(1.0))]);
        let outcome = MovementResolver::default().resolve(
            &world,
            &MoveRequest::new(Vec3::zeros(), Vec3::new(0.1, 0.0, 0.1), RADIUS),
        );
        assert_eq!(outcome.stage, MoveStage::Direct);
        assert_relative_eq!(outcome.position, Vec3::new(0.1, 0.0, 0.1), epsilon = 1e-6);
    }

    #[test]
    fn test_approach_stops_short_of_box() {
        let target = wall(Vec3::zeros(), Vec3::repeat(1.0));
        let world = world_with(&[target]);
        let mut position = Vec3::new(3.0, 0.0, 0.0);

        for _ in 0..14 {
            position = resolve_movement(&world, position, Vec3::new(-0.15, 0.0, 0.0), RADIUS, None);
            let gap = (position - target.closest_point_to_point(&position)).norm();
            assert!(gap >= RADIUS - 1e-4, "gap {gap} at {position:?}");
        }
        assert!(position.x >= 1.0 + RADIUS - 1e-4);
    }

    #[test]
    fn test_slide_along_wall() {
        let world = world_with(&[wall(Vec3::new(0.0, 0.0, 1.1), Vec3::new(5.0, 1.0, 0.5))]);
        let outcome = MovementResolver::default().resolve(
            &world,
            &MoveRequest::new(Vec3::zeros(), Vec3::new(0.2, 0.0, 0.2), RADIUS),
        );

        assert_eq!(outcome.stage, MoveStage::Slide);
        // Full desired length kept, redirected along the wall
        assert_relative_eq!(outcome.position, Vec3::new(0.2 * 2.0_f32.sqrt(), 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_axis_fallback_keeps_partial_progress() {
        let world = world_with(&[
            wall(Vec3::new(0.0, 0.0, 1.1), Vec3::new(5.0, 1.0, 0.5)),
            wall(Vec3::new(1.25, 0.0, 0.0), Vec3::new(0.5, 1.0, 0.5)),
        ]);
        let outcome = MovementResolver::default().resolve(
            &world,
            &MoveRequest::new(Vec3::zeros(), Vec3::new(0.2, 0.0, 0.2), RADIUS),
        );

        assert_eq!(outcome.stage, MoveStage::AxisSeparated);
        assert_relative_eq!(outcome.position, Vec3::new(0.2, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_fully_boxed_in_actor_does_not_move() {
        let world = world_with(&[
            wall(Vec3::new(1.1, 0.0, 0.0), Vec3::new(0.5, 1.0, 2.0)),
            wall(Vec3::new(-1.1, 0.0, 0.0), Vec3::new(0.5, 1.0, 2.0)),
            wall(Vec3::new(0.0, 0.0, 1.1), Vec3::new(2.0, 1.0, 0.5)),
            wall(Vec3::new(0.0, 0.0, -1.1), Vec3::new(2.0, 1.0, 0.5)),
        ]);
        let position = Vec3::new(0.0, 0.0, 0.0);
        assert!(!world.check_collision(position, RADIUS, None));

        for displacement in [Vec3::new(0.2, 0.0, 0.0), Vec3::new(-0.15, 0.0, 0.15), Vec3::new(0.0, 0.0, -0.3)] {
            let outcome = MovementResolver::default().resolve(&world, &MoveRequest::new(position, displacement, RADIUS));
            assert_eq!(outcome.stage, MoveStage::Blocked);
            assert_eq!(outcome.position, position);
        }
    }

    #[test]
    fn test_fan_search_finds_a_way_around() {
        // Wall straight ahead, slide impossible because the push is head-on
        let world = world_with(&[wall(Vec3::new(1.1, 0.0, 0.0), Vec3::new(0.5, 1.0, 0.3))]);
        let position = Vec3::new(0.0, 0.0, 0.0);
        let displacement = Vec3::new(0.3, 0.0, 0.0);
        let outcome = MovementResolver::default().resolve(&world, &MoveRequest::new(position, displacement, RADIUS));

        assert_eq!(outcome.stage, MoveStage::FanSearch);
        assert!(!world.check_collision(outcome.position, RADIUS, None));
        assert!((outcome.position - position).dot(&displacement) > 0.0);
        assert_relative_eq!((outcome.position - position).norm(), 0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_step_at_exact_step_height_is_climbable() {
        let world = step_world(0.5);
        let start = Vec3::new(0.3, STAND, 0.0);
        let request = MoveRequest::new(start, Vec3::new(0.8, 0.0, 0.0), RADIUS).standing(STAND);

        let outcome = MovementResolver::default().resolve(&world, &request);
        assert_eq!(outcome.stage, MoveStage::StepUp);
        assert_eq!(outcome.position, start);

        let climb = outcome.climb.unwrap();
        assert_eq!(climb.start, start);
        assert_relative_eq!(climb.target, Vec3::new(1.1, 0.5 + STAND, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_step_above_step_height_is_not_climbable() {
        let world = step_world(0.625);
        let start = Vec3::new(0.3, STAND, 0.0);
        let request = MoveRequest::new(start, Vec3::new(0.8, 0.0, 0.0), RADIUS).standing(STAND);

        let outcome = MovementResolver::default().resolve(&world, &request);
        assert_ne!(outcome.stage, MoveStage::StepUp);
        assert!(outcome.climb.is_none());
        assert_eq!(outcome.position.y, start.y);
        assert!(!world.check_collision(outcome.position, RADIUS, None));
    }

    #[test]
    fn test_airborne_actor_never_steps() {
        let world = step_world(0.5);
        let request = MoveRequest::new(Vec3::new(0.3, STAND, 0.0), Vec3::new(0.8, 0.0, 0.0), RADIUS);
        let outcome = MovementResolver::default().resolve(&world, &request);
        assert!(outcome.climb.is_none());

        // The free-function form is always airborne
        let moved = resolve_movement(&world, Vec3::new(0.3, STAND, 0.0), Vec3::new(0.8, 0.0, 0.0), RADIUS, None);
        assert_eq!(moved.y, STAND);
        assert!(!world.check_collision(moved, RADIUS, None));
    }

    #[test]
    fn test_custom_step_height_from_config() {
        let world = step_world(0.625);
        let resolver = MovementResolver::new(MovementConfig {
            step_height: 0.625,
            ..MovementConfig::default()
        });
        let request = MoveRequest::new(Vec3::new(0.3, STAND, 0.0), Vec3::new(0.8, 0.0, 0.0), RADIUS).standing(STAND);

        assert_eq!(resolver.resolve(&world, &request).stage, MoveStage::StepUp);
    }

    #[test]
    fn test_actor_ignores_its_own_body() {
        let mut world: CollisionWorld<Body> = CollisionWorld::default();
        let me = world.insert(ActorBody::new(Vec3::zeros(), RADIUS).into());
        let request = MoveRequest::new(Vec3::zeros(), Vec3::new(0.1, 0.0, 0.0), RADIUS).ignoring(me);

        let outcome = MovementResolver::default().resolve(&world, &request);
        assert_eq!(outcome.stage, MoveStage::Direct);

        let stuck = MovementResolver::default().resolve(&world, &MoveRequest::new(Vec3::zeros(), Vec3::new(0.1, 0.0, 0.0), RADIUS));
        assert_ne!(stuck.stage, MoveStage::Direct);
    }

    #[test]
    fn test_clip_to_plane_removes_normal_component() {
        let clipped = clip_to_plane(&Vec3::new(1.0, 0.0, 1.0), &Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(clipped, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }
}
