//! Per-actor vertical motion
//!
//! Gravity, jumping, ground snapping, ceiling clipping and the timed
//! step-climb all live here. The horizontal resolver never moves an actor
//! vertically; it only arms a climb that this integrator then plays out.
//!
//! ```text
//!            jump (cooldown clear)
//!   Grounded ───────────────────────▶ Jumping
//!     ▲  │  ▲                            │ velocity <= 0
//!     │  │  └── downward ground contact ─┤
//!     │  │ no ground                     ▼
//!     │  └────────────────────────────▶ Falling
//!     │ climb done
//!   Climbing ◀── step-up armed while grounded
//! ```

use std::time::Duration;

use crate::config::{ActorConfig, VerticalConfig};
use crate::foundation::collections::ObstacleHandle;
use crate::foundation::logging::debug;
use crate::foundation::math::{ease_in_out_sine, Vec3};
use crate::foundation::time::{elapsed_since, SimClock};
use crate::physics::collision::Collider;
use crate::physics::collision_system::CollisionWorld;
use crate::physics::movement::ClimbTarget;

/// Where an actor is in its vertical cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalPhase {
    /// Standing on a floor
    Grounded,
    /// Airborne and moving down (or not moving)
    Falling,
    /// Airborne and moving up
    Jumping,
    /// Playing a step-climb transition
    Climbing,
}

/// An active step-climb
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimbState {
    /// Simulation time the climb started
    pub start_time: Duration,
    /// Position when the climb started
    pub start: Vec3,
    /// Position on top of the ledge
    pub target: Vec3,
}

/// Vertical state of one actor
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalState {
    velocity: f32,
    grounded: bool,
    falling: bool,
    climb: Option<ClimbState>,
    last_jump: Option<Duration>,
}

impl Default for VerticalState {
    fn default() -> Self {
        Self {
            velocity: 0.0,
            grounded: false,
            falling: true,
            climb: None,
            last_jump: None,
        }
    }
}

impl VerticalState {
    /// Fresh state of a spawned actor (falling until it finds ground)
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertical velocity in units per tick-equivalent
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Standing on a floor
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Airborne and not rising
    pub fn is_falling(&self) -> bool {
        self.falling
    }

    /// Active climb, if any
    pub fn climb(&self) -> Option<&ClimbState> {
        self.climb.as_ref()
    }

    /// Current phase
    pub fn phase(&self) -> VerticalPhase {
        if self.climb.is_some() {
            VerticalPhase::Climbing
        } else if self.grounded {
            VerticalPhase::Grounded
        } else if self.velocity > 0.0 {
            VerticalPhase::Jumping
        } else {
            VerticalPhase::Falling
        }
    }

    /// Start a climb armed by the movement resolver
    ///
    /// Ignored unless the actor is grounded and not already climbing.
    pub fn begin_climb(&mut self, climb: ClimbTarget, now: Duration) -> bool {
        if !self.grounded || self.climb.is_some() {
            return false;
        }
        debug!("Climb from {:?} to {:?}", climb.start, climb.target);
        self.climb = Some(ClimbState {
            start_time: now,
            start: climb.start,
            target: climb.target,
        });
        self.velocity = 0.0;
        true
    }

    fn land(&mut self) {
        self.velocity = 0.0;
        self.grounded = true;
        self.falling = false;
    }

    fn leave_ground(&mut self) {
        self.grounded = false;
        self.falling = self.velocity <= 0.0;
    }
}

/// Per-tick inputs of the vertical integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalInput<'a> {
    /// Position after horizontal resolution
    pub position: Vec3,
    /// Body dimensions
    pub body: &'a ActorConfig,
    /// Actor's own registered body
    pub ignore: Option<ObstacleHandle>,
    /// Jump button held this tick
    pub jump_requested: bool,
}

/// Gravity, jump, snap and climb rules
#[derive(Debug, Clone, Default)]
pub struct VerticalIntegrator {
    config: VerticalConfig,
}

impl VerticalIntegrator {
    /// Create an integrator
    pub fn new(config: VerticalConfig) -> Self {
        Self { config }
    }

    /// Integrator tunables
    pub fn config(&self) -> &VerticalConfig {
        &self.config
    }

    /// Advance one actor by one tick and return its new position
    pub fn integrate<C: Collider>(
        &self,
        world: &CollisionWorld<C>,
        state: &mut VerticalState,
        input: &VerticalInput<'_>,
        clock: &SimClock,
    ) -> Vec3 {
        let before = state.phase();
        let position = match state.climb {
            Some(climb) => self.advance_climb(state, climb, clock.now()),
            None => self.integrate_free(world, state, input, clock),
        };

        let after = state.phase();
        if before != after {
            debug!("Vertical phase {:?} -> {:?} at y={}", before, after, position.y);
        }
        position
    }

    fn advance_climb(&self, state: &mut VerticalState, climb: ClimbState, now: Duration) -> Vec3 {
        let duration = Duration::from_millis(self.config.climb_duration_ms);
        let elapsed = elapsed_since(now, climb.start_time);

        if elapsed >= duration {
            state.climb = None;
            state.land();
            return climb.target;
        }

        let t = elapsed.as_secs_f32() / duration.as_secs_f32();
        state.velocity = 0.0;
        climb.start + (climb.target - climb.start) * ease_in_out_sine(t)
    }

    fn integrate_free<C: Collider>(
        &self,
        world: &CollisionWorld<C>,
        state: &mut VerticalState,
        input: &VerticalInput<'_>,
        clock: &SimClock,
    ) -> Vec3 {
        let scale = clock.tick_scale();
        let now = clock.now();
        let body = input.body;
        let mut position = input.position;

        if !state.grounded {
            state.velocity -= self.config.gravity * scale;
        }

        if input.jump_requested && state.grounded && self.jump_ready(state, now) {
            state.velocity = self.config.jump_impulse;
            state.grounded = false;
            state.falling = false;
            state.last_jump = Some(now);
        }

        state.velocity = state.velocity.max(self.config.terminal_velocity);
        let start_y = position.y;
        position.y += state.velocity * scale;

        if state.velocity > 0.0 {
            let reach = (body.head_offset - body.radius).max(0.0);
            let ceiling = world.check_ceiling_collision(position, body.radius, reach, input.ignore);
            if let Some(height) = ceiling.ground_height() {
                position.y = position.y.min(height - body.head_offset - self.config.ceiling_skin);
                state.velocity = 0.0;
                debug!("Head hit ceiling at {}", height);
            }
        }

        if state.velocity <= 0.0 {
            // Probe from where the tick started so a fast fall cannot skip a floor
            let from = Vec3::new(position.x, start_y.max(position.y), position.z);
            let reach = (from.y - position.y) + body.stand_height - body.radius + self.config.ground_snap;
            // Ledges above the snap distance are left to step-up
            let max_height = start_y - body.stand_height + self.config.ground_snap;
            let ground = world.check_ground_collision_below(from, body.radius, reach, max_height, input.ignore);
            if let Some(height) = ground.ground_height() {
                position.y = height + body.stand_height;
                state.land();
                return position;
            }
        }

        state.leave_ground();
        position
    }

    fn jump_ready(&self, state: &VerticalState, now: Duration) -> bool {
        let cooldown = Duration::from_millis(self.config.jump_cooldown_ms);
        state
            .last_jump
            .map_or(true, |last| elapsed_since(now, last) >= cooldown)
    }
}
