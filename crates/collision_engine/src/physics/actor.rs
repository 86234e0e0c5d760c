//! Physics-enabled actors
//!
//! Player-driven and AI-driven actors are the same type and go through the
//! same [`Actor::tick`]; only their [`ActorConfig`] differs.

use crate::config::ActorConfig;
use crate::foundation::collections::ObstacleHandle;
use crate::foundation::logging::trace;
use crate::foundation::math::{horizontal, Vec3};
use crate::foundation::time::SimClock;
use crate::physics::collision::Collider;
use crate::physics::collision_system::CollisionWorld;
use crate::physics::error::PhysicsResult;
use crate::physics::movement::{MoveRequest, MoveStage, MovementResolver};
use crate::physics::vertical::{VerticalInput, VerticalIntegrator, VerticalPhase, VerticalState};

/// Who drives an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// Driven by player input
    Player,
    /// Driven by enemy AI
    Ai,
}

/// What the controller wants from an actor this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActorInput {
    /// Desired horizontal velocity in units per tick-equivalent
    pub desired_velocity: Vec3,
    /// Jump requested
    pub jump: bool,
}

impl ActorInput {
    /// Walk in a direction
    pub fn walk(desired_velocity: Vec3) -> Self {
        Self {
            desired_velocity,
            jump: false,
        }
    }
}

/// Shared solvers an actor needs for one tick
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Horizontal resolver
    pub resolver: &'a MovementResolver,
    /// Vertical integrator
    pub integrator: &'a VerticalIntegrator,
    /// Simulation clock, not yet advanced for this tick
    pub clock: &'a SimClock,
}

/// A moving sphere-proxy actor
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    kind: ActorKind,
    position: Vec3,
    body: ActorConfig,
    vertical: VerticalState,
    proxy: Option<ObstacleHandle>,
    last_stage: MoveStage,
}

impl Actor {
    /// Create an actor with no registered body
    pub fn new(kind: ActorKind, position: Vec3, body: ActorConfig) -> Self {
        Self {
            kind,
            position,
            body,
            vertical: VerticalState::new(),
            proxy: None,
            last_stage: MoveStage::Idle,
        }
    }

    /// Attach the body other actors collide with
    pub fn with_proxy(mut self, proxy: ObstacleHandle) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Who drives this actor
    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Current position (sphere center)
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Body dimensions and speed
    pub fn body(&self) -> &ActorConfig {
        &self.body
    }

    /// Vertical state
    pub fn vertical(&self) -> &VerticalState {
        &self.vertical
    }

    /// Vertical phase
    pub fn phase(&self) -> VerticalPhase {
        self.vertical.phase()
    }

    /// Registered body, ignored by this actor's own queries
    pub fn proxy(&self) -> Option<ObstacleHandle> {
        self.proxy
    }

    /// Resolver stage of the last tick
    pub fn last_stage(&self) -> MoveStage {
        self.last_stage
    }

    /// Clamp the desired velocity to this actor's speed and scale it to one tick
    pub fn displacement_for(&self, input: &ActorInput, clock: &SimClock) -> Vec3 {
        let scale = clock.tick_scale();
        let desired = horizontal(&input.desired_velocity) * scale;
        let limit = self.body.max_speed * scale;
        if desired.norm() > limit {
            desired.normalize() * limit
        } else {
            desired
        }
    }

    /// Run one tick: horizontal resolution, climb arming, vertical integration
    ///
    /// Only this actor's own body is written back to the world.
    pub fn tick<C: Collider>(
        &mut self,
        world: &mut CollisionWorld<C>,
        ctx: &TickContext<'_>,
        input: &ActorInput,
    ) -> PhysicsResult<MoveStage> {
        let horizontal_position = if self.vertical.phase() == VerticalPhase::Climbing {
            self.last_stage = MoveStage::Idle;
            self.position
        } else {
            let mut request = MoveRequest::new(self.position, self.displacement_for(input, ctx.clock), self.body.radius);
            request.ignore = self.proxy;
            if self.vertical.is_grounded() {
                request = request.standing(self.body.stand_height);
            }

            let outcome = ctx.resolver.resolve(world, &request);
            // Step-up is only offered to grounded requests, so the climb always arms
            if let Some(climb) = outcome.climb {
                let armed = self.vertical.begin_climb(climb, ctx.clock.now());
                debug_assert!(armed, "step-up armed for an actor that cannot climb");
            }
            self.last_stage = outcome.stage;
            outcome.position
        };

        let vertical_input = VerticalInput {
            position: horizontal_position,
            body: &self.body,
            ignore: self.proxy,
            jump_requested: input.jump,
        };
        self.position = ctx.integrator.integrate(world, &mut self.vertical, &vertical_input, ctx.clock);

        if let Some(proxy) = self.proxy {
            world.set_center(proxy, self.position)?;
        }
        trace!("{:?} actor at {:?} after {:?}", self.kind, self.position, self.last_stage);
        Ok(self.last_stage)
    }
}
