//! Math utilities and types
//!
//! Provides the fundamental vector and rotation types used by the collision
//! core, plus a handful of helpers for the horizontal-plane work done by the
//! movement resolver.

pub use nalgebra::{UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Squared lengths below this are treated as "no direction".
pub const DIRECTION_EPSILON: f32 = 1e-8;

/// Returns `v` with its vertical component removed.
pub fn horizontal(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Normalize `v`, or `None` if it is too short to carry a direction.
pub fn try_direction(v: &Vec3) -> Option<Vec3> {
    if v.norm_squared() < DIRECTION_EPSILON {
        None
    } else {
        Some(v.normalize())
    }
}

/// Rotate `v` about the world vertical axis by `angle` radians.
pub fn rotate_about_up(v: &Vec3, angle: f32) -> Vec3 {
    Quat::from_axis_angle(&Vec3::y_axis(), angle) * *v
}

/// Build a rotation from Euler angles given in degrees (roll, pitch, yaw).
pub fn rotation_from_degrees(degrees: &Vec3) -> Quat {
    Quat::from_euler_angles(
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}

/// True when every component is finite.
pub fn is_finite(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Sine ease-in-out on `t` in `[0, 1]`.
pub fn ease_in_out_sine(t: f32) -> f32 {
    0.5 - 0.5 * (std::f32::consts::PI * t.clamp(0.0, 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_try_direction_rejects_zero() {
        assert!(try_direction(&Vec3::zeros()).is_none());
        assert!(try_direction(&Vec3::new(1e-5, 0.0, 0.0)).is_none());

        let dir = try_direction(&Vec3::new(0.0, 0.0, 4.0)).unwrap();
        assert_relative_eq!(dir, Vec3::z(), epsilon = EPSILON);
    }

    #[test]
    fn test_rotate_about_up_quarter_turn() {
        // Right-handed: +X rotated +90 degrees about +Y lands on -Z
        let rotated = rotate_about_up(&Vec3::x(), FRAC_PI_2);
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(rotated.norm(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_horizontal_drops_y() {
        assert_eq!(horizontal(&Vec3::new(1.0, 5.0, -2.0)), Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_ease_endpoints() {
        assert_relative_eq!(ease_in_out_sine(0.0), 0.0, epsilon = EPSILON);
        assert_relative_eq!(ease_in_out_sine(0.5), 0.5, epsilon = EPSILON);
        assert_relative_eq!(ease_in_out_sine(1.0), 1.0, epsilon = EPSILON);
        assert_relative_eq!(ease_in_out_sine(2.0), 1.0, epsilon = EPSILON);
    }
}
