//! Primitive collision shapes and intersection algorithms
//!
//! Provides the sphere proxy used for moving actors and the oriented box used
//! for level geometry, with exact box-box (SAT) and box-sphere tests.

use crate::config::CollisionConfig;
use crate::foundation::math::{is_finite, Quat, Vec3};

/// A sphere proxy for an actor during one query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        debug_assert!(is_finite(&center), "sphere center must be finite: {center:?}");
        debug_assert!(radius.is_finite() && radius >= 0.0, "sphere radius must be non-negative: {radius}");
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).norm_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }
}

/// Closed interval produced by projecting a shape onto an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl Interval {
    /// True when the two intervals share at least one point
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.max >= other.min && other.max >= self.min
    }
}

/// Result of a sphere-box narrow-phase test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereContact {
    /// Direction and distance that moves the sphere out of the box
    pub penetration: Vec3,
    /// Point of the box closest to the sphere center
    pub closest_point: Vec3,
}

impl SphereContact {
    /// Unit direction of the penetration vector
    pub fn normal(&self) -> Vec3 {
        self.penetration.normalize()
    }

    /// Length of the penetration vector
    pub fn depth(&self) -> f32 {
        self.penetration.norm()
    }
}

/// Tunables for the narrow phase, extracted from [`CollisionConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrowPhase {
    /// Separation added on top of the raw overlap
    pub penetration_buffer: f32,
    /// Distance under which the sphere center counts as inside the box
    pub inside_epsilon: f32,
    /// Cross products shorter than this (squared) are skipped in SAT
    pub parallel_axis_epsilon: f32,
}

impl Default for NarrowPhase {
    fn default() -> Self {
        Self::from(&CollisionConfig::default())
    }
}

impl From<&CollisionConfig> for NarrowPhase {
    fn from(config: &CollisionConfig) -> Self {
        Self {
            penetration_buffer: config.penetration_buffer,
            inside_epsilon: config.inside_epsilon,
            parallel_axis_epsilon: config.parallel_axis_epsilon,
        }
    }
}

/// A box with arbitrary rotation
///
/// The three axes are derived from `rotation` at construction and are never
/// cached across ticks: owners rebuild the box whenever they may have moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    center: Vec3,
    half_extents: Vec3,
    rotation: Quat,
    axes: [Vec3; 3],
}

impl OrientedBox {
    /// Create a new oriented box
    ///
    /// # Panics
    ///
    /// If any half-extent is negative or any input is non-finite.
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        assert!(is_finite(&center), "box center must be finite: {center:?}");
        assert!(
            half_extents.iter().all(|h| h.is_finite() && *h >= 0.0),
            "box half-extents must be finite and non-negative: {half_extents:?}"
        );
        Self {
            center,
            half_extents,
            rotation,
            axes: [rotation * Vec3::x(), rotation * Vec3::y(), rotation * Vec3::z()],
        }
    }

    /// Create an axis-aligned box (identity rotation)
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center, half_extents, Quat::identity())
    }

    /// Center in world space
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Half-size along each local axis
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Orientation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// World-space unit axes: the canonical basis rotated by the orientation
    pub fn axes(&self) -> [Vec3; 3] {
        self.axes
    }

    /// Same box moved to a new center
    pub fn with_center(&self, center: Vec3) -> Self {
        Self::new(center, self.half_extents, self.rotation)
    }

    /// Height of the highest point of the box
    pub fn top(&self) -> f32 {
        self.center.y + self.vertical_reach()
    }

    /// Height of the lowest point of the box
    pub fn bottom(&self) -> f32 {
        self.center.y - self.vertical_reach()
    }

    fn vertical_reach(&self) -> f32 {
        (0..3).map(|i| self.axes[i].y.abs() * self.half_extents[i]).sum()
    }

    /// Project the box onto `axis`
    ///
    /// The axis does not need to be unit length; both boxes in a SAT test are
    /// projected onto the same vector so the scale cancels out.
    pub fn project_onto_axis(&self, axis: &Vec3) -> Interval {
        let center = self.center.dot(axis);
        let reach: f32 = (0..3)
            .map(|i| axis.dot(&self.axes[i]).abs() * self.half_extents[i])
            .sum();
        Interval {
            min: center - reach,
            max: center + reach,
        }
    }

    /// Separating-axis test against another box
    pub fn intersects(&self, other: &OrientedBox) -> bool {
        self.intersects_with(other, NarrowPhase::default().parallel_axis_epsilon)
    }

    /// Separating-axis test with an explicit near-parallel threshold
    ///
    /// Tests the 3 face normals of each box, then the 9 edge cross products,
    /// stopping at the first axis whose projections are disjoint.
    pub fn intersects_with(&self, other: &OrientedBox, parallel_axis_epsilon: f32) -> bool {
        let separated_on = |axis: &Vec3| !self.project_onto_axis(axis).overlaps(&other.project_onto_axis(axis));

        if self.axes.iter().chain(other.axes.iter()).any(|axis| separated_on(axis)) {
            return false;
        }

        for a in &self.axes {
            for b in &other.axes {
                let axis = a.cross(b);
                // Near-parallel edges give no usable axis
                if axis.norm_squared() < parallel_axis_epsilon {
                    continue;
                }
                if separated_on(&axis) {
                    return false;
                }
            }
        }

        true
    }

    /// Local-frame coordinates of a world point
    fn to_local(&self, point: &Vec3) -> Vec3 {
        let d = point - self.center;
        Vec3::new(d.dot(&self.axes[0]), d.dot(&self.axes[1]), d.dot(&self.axes[2]))
    }

    /// Closest point of the box (surface or interior) to `point`
    pub fn closest_point_to_point(&self, point: &Vec3) -> Vec3 {
        let local = self.to_local(point);
        (0..3).fold(self.center, |acc, i| {
            let h = self.half_extents[i];
            acc + self.axes[i] * local[i].clamp(-h, h)
        })
    }

    /// True when the sphere touches or overlaps the box
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let closest = self.closest_point_to_point(&sphere.center);
        (closest - sphere.center).norm_squared() <= sphere.radius * sphere.radius
    }

    /// Penetration of a sphere into the box, using default narrow-phase tunables
    pub fn sphere_collision_info(&self, sphere: &BoundingSphere) -> Option<SphereContact> {
        self.sphere_collision_info_with(sphere, &NarrowPhase::default())
    }

    /// Penetration of a sphere into the box
    ///
    /// The penetration points from the box toward the sphere. When the sphere
    /// center lies inside the box the shortest face exit is used instead of
    /// the (undefined) center-to-closest-point direction.
    pub fn sphere_collision_info_with(&self, sphere: &BoundingSphere, tuning: &NarrowPhase) -> Option<SphereContact> {
        let closest = self.closest_point_to_point(&sphere.center);
        let offset = sphere.center - closest;
        let distance = offset.norm();

        if distance > sphere.radius {
            return None;
        }

        let overlap = sphere.radius - distance + tuning.penetration_buffer;

        let penetration = if distance < tuning.inside_epsilon {
            let (direction, exit) = self.shortest_face_exit(&sphere.center);
            direction * (exit + overlap)
        } else {
            offset / distance * overlap
        };

        Some(SphereContact {
            penetration,
            closest_point: closest,
        })
    }

    /// Face direction and distance of the nearest way out for an interior point
    ///
    /// Ties go to the lower axis index, then to the positive side.
    fn shortest_face_exit(&self, point: &Vec3) -> (Vec3, f32) {
        let local = self.to_local(point);
        let mut best = (self.axes[0], f32::INFINITY);

        for i in 0..3 {
            let h = self.half_extents[i];
            for (sign, exit) in [(1.0_f32, h - local[i]), (-1.0, h + local[i])] {
                if exit < best.1 {
                    best = (self.axes[i] * sign, exit);
                }
            }
        }

        (best.0, best.1.max(0.0))
    }
}
