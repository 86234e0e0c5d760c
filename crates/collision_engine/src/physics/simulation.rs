//! Fixed-step simulation root
//!
//! [`PhysicsWorld`] owns the registry, the kinematic platforms, every actor
//! and the clock. [`PhysicsWorld::step`] runs one tick in a fixed order:
//! platforms move first, then actors are resolved one after another in spawn
//! order, then the clock advances.

use crate::config::PhysicsConfig;
use crate::foundation::collections::{ActorId, ObstacleHandle, OrderedSlotMap};
use crate::foundation::logging::{info, warn};
use crate::foundation::math::Vec3;
use crate::foundation::time::SimClock;
use crate::physics::actor::{Actor, ActorInput, ActorKind, TickContext};
use crate::physics::collision::{ActorBody, Body, ObstacleGeometry, OrientedBox};
use crate::physics::collision_system::CollisionWorld;
use crate::physics::error::{PhysicsError, PhysicsResult};
use crate::physics::kinematic::KinematicPlatforms;
use crate::physics::movement::{MoveStage, MovementResolver};
use crate::physics::vertical::VerticalIntegrator;

/// Everything the collision core simulates
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
    collision: CollisionWorld<Body>,
    platforms: KinematicPlatforms,
    actors: OrderedSlotMap<ActorId, Actor>,
    resolver: MovementResolver,
    integrator: VerticalIntegrator,
    clock: SimClock,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new(config: PhysicsConfig, clock: SimClock) -> Self {
        Self {
            collision: CollisionWorld::new(config.collision.clone()),
            platforms: KinematicPlatforms::new(config.platforms.clone()),
            actors: OrderedSlotMap::new(),
            resolver: MovementResolver::new(config.movement.clone()),
            integrator: VerticalIntegrator::new(config.vertical.clone()),
            clock,
            config,
        }
    }

    /// Create a world and load level geometry into it
    pub fn from_level(config: PhysicsConfig, clock: SimClock, geometry: &[ObstacleGeometry]) -> PhysicsResult<Self> {
        let mut world = Self::new(config, clock);
        world.collision = CollisionWorld::from_geometry(geometry, world.config.collision.clone())?;
        Ok(world)
    }

    /// Active configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Registry and queries
    pub fn collision(&self) -> &CollisionWorld<Body> {
        &self.collision
    }

    /// Kinematic platforms
    pub fn platforms(&self) -> &KinematicPlatforms {
        &self.platforms
    }

    /// Simulation clock
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Shared horizontal resolver
    pub fn resolver(&self) -> &MovementResolver {
        &self.resolver
    }

    /// Add a box to the level
    pub fn register_obstacle(&mut self, geometry: OrientedBox, normal: Option<Vec3>) -> ObstacleHandle {
        self.collision.register_obstacle(geometry, normal)
    }

    /// Drive a registered box up and down
    pub fn register_kinematic_platform(
        &mut self,
        handle: ObstacleHandle,
        initial_height: f32,
        velocity: f32,
    ) -> PhysicsResult<()> {
        self.platforms
            .register_kinematic_platform(&mut self.collision, handle, initial_height, velocity)
    }

    /// Spawn an actor with a registered body, using the preset for its kind
    pub fn spawn_actor(&mut self, kind: ActorKind, position: Vec3) -> ActorId {
        let body = match kind {
            ActorKind::Player => self.config.player.clone(),
            ActorKind::Ai => self.config.enemy.clone(),
        };

        if self.collision.check_collision(position, body.radius, None) {
            warn!("{:?} actor spawned inside geometry at {:?}", kind, position);
        }

        let proxy = self.collision.insert(ActorBody::new(position, body.radius).into());
        let id = self.actors.insert(Actor::new(kind, position, body).with_proxy(proxy));
        info!("Spawned {:?} actor {:?} at {:?}", kind, id, position);
        id
    }

    /// Remove an actor and its body
    pub fn despawn_actor(&mut self, id: ActorId) -> PhysicsResult<Actor> {
        let actor = self.actors.remove(id).ok_or(PhysicsError::UnknownActor(id))?;
        if let Some(proxy) = actor.proxy() {
            self.collision.remove_obstacle(proxy)?;
        }
        Ok(actor)
    }

    /// Look up an actor
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Actors in spawn order
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> + '_ {
        self.actors.iter()
    }

    /// Run one tick
    ///
    /// Actors without an entry in `inputs` stand still but still fall. Every
    /// id is checked before anything moves.
    pub fn step(&mut self, inputs: &[(ActorId, ActorInput)]) -> PhysicsResult<Vec<(ActorId, MoveStage)>> {
        if let Some((id, _)) = inputs.iter().find(|(id, _)| !self.actors.contains_key(*id)) {
            return Err(PhysicsError::UnknownActor(*id));
        }

        self.platforms.advance(&mut self.collision, &self.clock);

        let ctx = TickContext {
            resolver: &self.resolver,
            integrator: &self.integrator,
            clock: &self.clock,
        };

        let order = self.actors.keys().to_vec();
        let mut stages = Vec::with_capacity(order.len());
        for id in order {
            let input = inputs
                .iter()
                .find(|(target, _)| *target == id)
                .map(|(_, input)| *input)
                .unwrap_or_default();
            let Some(actor) = self.actors.get_mut(id) else {
                continue;
            };
            stages.push((id, actor.tick(&mut self.collision, &ctx, &input)?));
        }

        self.clock.advance();
        Ok(stages)
    }

    /// Drop all geometry, platforms and actors (level unload)
    pub fn clear(&mut self) {
        self.collision.clear();
        self.platforms = KinematicPlatforms::new(self.config.platforms.clone());
        self.actors.clear();
    }
}
