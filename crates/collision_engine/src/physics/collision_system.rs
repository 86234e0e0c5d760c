//! Obstacle registry and sphere-proxy queries
//!
//! The registry owns every body an actor can bump into. Queries are pure:
//! they read the current transform of each body, rebuild its box, and run
//! the narrow phase against a sphere proxy. Nothing is cached between calls,
//! so a kinematic platform moved earlier in the tick is seen at its new place.
//!
//! Scans walk bodies in insertion order, which keeps every result
//! reproducible for identical inputs.

use crate::config::CollisionConfig;
use crate::foundation::collections::{ObstacleHandle, OrderedSlotMap};
use crate::foundation::logging::{info, trace};
use crate::foundation::math::{is_finite, Vec3};
use crate::physics::collision::{BoundingSphere, Collider, NarrowPhase, Obstacle, ObstacleGeometry, OrientedBox, SphereContact};
use crate::physics::error::{PhysicsError, PhysicsResult};

/// The most significant contact found by [`CollisionWorld::get_collision_info`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Body that was hit
    pub obstacle: ObstacleHandle,
    /// Vector that moves the sphere out of the body
    pub penetration: Vec3,
    /// Point of the body closest to the sphere center
    pub closest_point: Vec3,
}

/// Outcome of a sphere overlap query
///
/// A penetration exists exactly when a collision was found.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionResult {
    contact: Option<Contact>,
}

impl CollisionResult {
    /// No overlap
    pub fn none() -> Self {
        Self { contact: None }
    }

    /// True when the sphere overlaps some body
    pub fn collided(&self) -> bool {
        self.contact.is_some()
    }

    /// Penetration vector of the deepest contact
    pub fn penetration(&self) -> Option<Vec3> {
        self.contact.map(|c| c.penetration)
    }

    /// Body responsible for the deepest contact
    pub fn obstacle(&self) -> Option<ObstacleHandle> {
        self.contact.map(|c| c.obstacle)
    }

    /// Full contact record
    pub fn contact(&self) -> Option<&Contact> {
        self.contact.as_ref()
    }
}

/// A classified surface found by a vertical probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Height of the surface
    pub height: f32,
    /// Normal the surface was classified with
    pub normal: Vec3,
    /// Body that owns the surface
    pub obstacle: ObstacleHandle,
}

/// Outcome of a ground or ceiling probe
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceProbeResult {
    hit: Option<SurfaceHit>,
}

/// Ground probe result
pub type GroundProbeResult = SurfaceProbeResult;

/// Ceiling probe result
pub type CeilingProbeResult = SurfaceProbeResult;

impl SurfaceProbeResult {
    /// True when a surface was found
    pub fn collided(&self) -> bool {
        self.hit.is_some()
    }

    /// Height of the floor top or ceiling underside
    pub fn ground_height(&self) -> Option<f32> {
        self.hit.map(|h| h.height)
    }

    /// Classification normal
    pub fn normal(&self) -> Option<Vec3> {
        self.hit.map(|h| h.normal)
    }

    /// Body that was hit
    pub fn obstacle(&self) -> Option<ObstacleHandle> {
        self.hit.map(|h| h.obstacle)
    }

    /// Full hit record
    pub fn hit(&self) -> Option<&SurfaceHit> {
        self.hit.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProbeDirection {
    Down { max_height: f32 },
    Up,
}

/// Registry of collidable bodies plus the queries run against it
///
/// Generic over the [`Collider`] capability only: a world of plain
/// [`Obstacle`]s and a world mixing obstacles with actor proxies
/// (`CollisionWorld<Body>`) share every query.
#[derive(Debug, Clone)]
pub struct CollisionWorld<C: Collider = Obstacle> {
    bodies: OrderedSlotMap<ObstacleHandle, C>,
    config: CollisionConfig,
    narrow_phase: NarrowPhase,
}

impl<C: Collider> Default for CollisionWorld<C> {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}

impl<C: Collider> CollisionWorld<C> {
    /// Create an empty world
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            bodies: OrderedSlotMap::new(),
            narrow_phase: NarrowPhase::from(&config),
            config,
        }
    }

    /// Collision tunables
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Add any body implementing the capability
    pub fn insert(&mut self, body: C) -> ObstacleHandle {
        self.bodies.insert(body)
    }

    /// Remove a body
    pub fn remove_obstacle(&mut self, handle: ObstacleHandle) -> PhysicsResult<C> {
        self.bodies.remove(handle).ok_or(PhysicsError::UnknownObstacle(handle))
    }

    /// Drop every body (level unload)
    pub fn clear(&mut self) {
        if !self.bodies.is_empty() {
            info!("Unloading {} collision bodies", self.bodies.len());
        }
        self.bodies.clear();
    }

    /// Look up a body
    pub fn obstacle(&self, handle: ObstacleHandle) -> Option<&C> {
        self.bodies.get(handle)
    }

    /// Look up a body for mutation
    pub fn obstacle_mut(&mut self, handle: ObstacleHandle) -> Option<&mut C> {
        self.bodies.get_mut(handle)
    }

    /// True when the handle names a live body
    pub fn contains(&self, handle: ObstacleHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Move a body to a new center
    pub fn set_center(&mut self, handle: ObstacleHandle, center: Vec3) -> PhysicsResult<()> {
        let body = self.bodies.get_mut(handle).ok_or(PhysicsError::UnknownObstacle(handle))?;
        body.set_center(center);
        Ok(())
    }

    /// Bodies in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ObstacleHandle, &C)> + '_ {
        self.bodies.iter()
    }

    /// Number of registered bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies that take part in a query, with their freshly built boxes
    fn candidates(&self, ignore: Option<ObstacleHandle>) -> impl Iterator<Item = (ObstacleHandle, &C, OrientedBox)> + '_ {
        self.bodies
            .iter()
            .filter(move |(handle, _)| Some(*handle) != ignore)
            .map(|(handle, body)| (handle, body, body.collision_box()))
    }

    /// True if a sphere at `position` touches any body other than `ignore`
    ///
    /// Stops at the first overlapping body.
    pub fn check_collision(&self, position: Vec3, radius: f32, ignore: Option<ObstacleHandle>) -> bool {
        let sphere = BoundingSphere::new(position, radius);
        let hit = self
            .candidates(ignore)
            .find(|(_, _, collision_box)| collision_box.intersects_sphere(&sphere));

        if let Some((handle, _, _)) = hit {
            trace!("Sphere at {:?} r={} overlaps {:?}", position, radius, handle);
        }
        hit.is_some()
    }

    /// Deepest contact between a sphere and the registered bodies
    ///
    /// Every body is tested; when several overlap, the largest penetration
    /// wins and ties keep the earlier-registered body.
    pub fn get_collision_info(&self, position: Vec3, radius: f32, ignore: Option<ObstacleHandle>) -> CollisionResult {
        let sphere = BoundingSphere::new(position, radius);
        let mut deepest: Option<(Contact, f32)> = None;

        for (handle, _, collision_box) in self.candidates(ignore) {
            let Some(SphereContact { penetration, closest_point }) =
                collision_box.sphere_collision_info_with(&sphere, &self.narrow_phase)
            else {
                continue;
            };

            let depth = penetration.norm_squared();
            if deepest.map_or(true, |(_, best)| depth > best) {
                deepest = Some((
                    Contact {
                        obstacle: handle,
                        penetration,
                        closest_point,
                    },
                    depth,
                ));
            }
        }

        if let Some((contact, _)) = &deepest {
            trace!(
                "Deepest contact at {:?}: {:?} pen={:?}",
                position,
                contact.obstacle,
                contact.penetration
            );
        }

        CollisionResult {
            contact: deepest.map(|(contact, _)| contact),
        }
    }

    /// Look for a floor below `position`
    ///
    /// Samples `probe_steps` sphere positions from `position` down to
    /// `position - (0, probe_height, 0)`. At each depth every body is tested
    /// in order; a contact that pushes the sphere up by more than
    /// `ground_normal_threshold`, on a body whose declared normal (if any)
    /// agrees, is a floor and ends the probe. Wall-like contacts and bodies
    /// touched from below are skipped and sampling continues deeper.
    pub fn check_ground_collision(
        &self,
        position: Vec3,
        radius: f32,
        probe_height: f32,
        ignore: Option<ObstacleHandle>,
    ) -> GroundProbeResult {
        let direction = ProbeDirection::Down { max_height: f32::INFINITY };
        self.probe_surface(position, radius, probe_height, ignore, direction)
    }

    /// Ground probe that ignores floors higher than `max_height`
    ///
    /// Same sampling and classification as
    /// [`check_ground_collision`](Self::check_ground_collision), but a floor
    /// whose height is above `max_height` is skipped like a wall. The vertical
    /// integrator uses this so a ledge edge caught by the probe's radius does
    /// not lift a standing actor; higher ledges are climbed by step-up.
    pub fn check_ground_collision_below(
        &self,
        position: Vec3,
        radius: f32,
        probe_height: f32,
        max_height: f32,
        ignore: Option<ObstacleHandle>,
    ) -> GroundProbeResult {
        self.probe_surface(position, radius, probe_height, ignore, ProbeDirection::Down { max_height })
    }

    /// Look for a ceiling above `position`
    ///
    /// Mirror of [`check_ground_collision`](Self::check_ground_collision):
    /// samples upward and accepts contacts that push the sphere down.
    pub fn check_ceiling_collision(
        &self,
        position: Vec3,
        radius: f32,
        probe_height: f32,
        ignore: Option<ObstacleHandle>,
    ) -> CeilingProbeResult {
        self.probe_surface(position, radius, probe_height, ignore, ProbeDirection::Up)
    }

    fn probe_surface(
        &self,
        position: Vec3,
        radius: f32,
        probe_height: f32,
        ignore: Option<ObstacleHandle>,
        direction: ProbeDirection,
    ) -> SurfaceProbeResult {
        debug_assert!(is_finite(&position), "probe position must be finite: {position:?}");
        let steps = self.config.probe_steps.max(2);
        let sign = match direction {
            ProbeDirection::Down { .. } => -1.0,
            ProbeDirection::Up => 1.0,
        };

        let boxes: Vec<_> = self.candidates(ignore).collect();

        for step in 0..steps {
            let offset = probe_height * step as f32 / (steps - 1) as f32;
            let sample = Vec3::new(position.x, position.y + sign * offset, position.z);
            let sphere = BoundingSphere::new(sample, radius);

            for (handle, body, collision_box) in &boxes {
                let Some(contact) = collision_box.sphere_collision_info_with(&sphere, &self.narrow_phase) else {
                    continue;
                };
                let inside = (contact.closest_point - sample).norm() < self.narrow_phase.inside_epsilon;

                let hit = match direction {
                    // A declared normal can veto a floor but never turn an underside into one
                    ProbeDirection::Down { max_height } => {
                        let pushed = contact.normal();
                        let normal = body.surface_normal().unwrap_or(pushed);
                        let threshold = self.config.ground_normal_threshold;
                        (pushed.y > threshold && normal.y > threshold)
                            .then(|| SurfaceHit {
                                height: if inside { collision_box.top() } else { contact.closest_point.y },
                                normal,
                                obstacle: *handle,
                            })
                            .filter(|hit| hit.height <= max_height)
                    }
                    // Declared normals describe walkable tops, so ceilings use the contact
                    ProbeDirection::Up => {
                        let normal = contact.normal();
                        (-normal.y > self.config.ground_normal_threshold).then(|| SurfaceHit {
                            height: if inside { collision_box.bottom() } else { contact.closest_point.y },
                            normal,
                            obstacle: *handle,
                        })
                    }
                };

                match hit {
                    Some(hit) => {
                        trace!("{:?} probe from {:?} hit {:?} at {}", direction, position, hit.obstacle, hit.height);
                        return SurfaceProbeResult { hit: Some(hit) };
                    }
                    None => trace!("{:?} probe skipped contact with {:?}", direction, handle),
                }
            }
        }

        SurfaceProbeResult::default()
    }
}

impl<C: Collider + From<Obstacle>> CollisionWorld<C> {
    /// Register a static or kinematic box with an optional classification normal
    pub fn register_obstacle(&mut self, geometry: OrientedBox, normal: Option<Vec3>) -> ObstacleHandle {
        let handle = self.insert(C::from(Obstacle::new(geometry, normal)));
        trace!("Registered obstacle {:?} at {:?}", handle, geometry.center());
        handle
    }

    /// Build a world from level geometry
    ///
    /// Descriptions with non-finite values or negative extents are rejected
    /// instead of tripping the box constructor's assertions.
    pub fn from_geometry(descriptions: &[ObstacleGeometry], config: CollisionConfig) -> PhysicsResult<Self> {
        let mut world = Self::new(config);
        for (index, desc) in descriptions.iter().enumerate() {
            let finite = is_finite(&desc.center)
                && is_finite(&desc.half_extents)
                && is_finite(&desc.rotation_degrees)
                && desc.normal.as_ref().map_or(true, is_finite);
            if !finite {
                return Err(PhysicsError::InvalidGeometry(format!("obstacle {index} has non-finite values")));
            }
            if desc.half_extents.iter().any(|h| *h < 0.0) {
                return Err(PhysicsError::InvalidGeometry(format!(
                    "obstacle {index} has negative half-extents {:?}",
                    desc.half_extents
                )));
            }
            world.insert(C::from(Obstacle::from(desc)));
        }
        info!("Loaded {} obstacles into collision world", world.len());
        Ok(world)
    }
}
