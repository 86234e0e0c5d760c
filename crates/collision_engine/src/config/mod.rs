//! Configuration system
//!
//! Every tunable of the collision core lives here so it can be loaded from a
//! `.toml` or `.ron` file instead of being baked into the algorithms.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file, picking the format from the extension
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of its legal range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Narrow-phase and probe tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// A contact counts as floor when the vertical component of its normal is
    /// strictly greater than this
    pub ground_normal_threshold: f32,

    /// Number of sphere samples taken by the ground and ceiling probes
    pub probe_steps: u32,

    /// Extra separation added to every penetration vector
    pub penetration_buffer: f32,

    /// Distance under which a sphere center counts as inside a box
    pub inside_epsilon: f32,

    /// Squared length under which an edge cross product is skipped in SAT
    pub parallel_axis_epsilon: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            ground_normal_threshold: 0.7,
            probe_steps: 10,
            penetration_buffer: 0.01,
            inside_epsilon: 1e-4,
            parallel_axis_epsilon: 1e-4,
        }
    }
}

/// Horizontal movement resolver tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Tallest ledge that can be climbed, inclusive
    pub step_height: f32,

    /// Number of directions sampled by the fan search
    pub fan_samples: u32,

    /// Fan spans `-half_angle..=+half_angle` around the desired direction
    pub fan_half_angle_degrees: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            step_height: 0.5,
            fan_samples: 16,
            fan_half_angle_degrees: 90.0,
        }
    }
}

/// Gravity, jump and climb tunables
///
/// Velocities are in units per tick-equivalent (see
/// [`crate::foundation::time::REFERENCE_TICK_RATE`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalConfig {
    /// Downward acceleration per tick-equivalent
    pub gravity: f32,

    /// Upward velocity set by a jump
    pub jump_impulse: f32,

    /// Minimum time between two jumps
    pub jump_cooldown_ms: u64,

    /// Most negative vertical velocity allowed
    pub terminal_velocity: f32,

    /// Duration of a step-climb transition
    pub climb_duration_ms: u64,

    /// How far below the feet the ground probe still snaps
    pub ground_snap: f32,

    /// Gap left between the head and a ceiling after clamping
    pub ceiling_skin: f32,
}

impl Default for VerticalConfig {
    fn default() -> Self {
        Self {
            gravity: 0.012,
            jump_impulse: 0.22,
            jump_cooldown_ms: 300,
            terminal_velocity: -0.5,
            climb_duration_ms: 200,
            ground_snap: 0.1,
            ceiling_skin: 0.01,
        }
    }
}

/// Scripted vertical platform tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Distance a platform rises above its initial height before turning back
    pub travel: f32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self { travel: 2.0 }
    }
}

/// Body dimensions and speed of one kind of actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Sphere proxy radius
    pub radius: f32,

    /// Distance from the feet to the actor position (sphere center)
    pub stand_height: f32,

    /// Distance from the actor position to the top of the head
    pub head_offset: f32,

    /// Longest horizontal displacement per tick-equivalent
    pub max_speed: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self::player()
    }
}

impl ActorConfig {
    /// Player-controlled actor preset
    pub fn player() -> Self {
        Self {
            radius: 0.5,
            stand_height: 0.9,
            head_offset: 0.8,
            max_speed: 0.15,
        }
    }

    /// AI-controlled actor preset
    pub fn enemy() -> Self {
        Self {
            radius: 0.6,
            stand_height: 1.0,
            head_offset: 1.0,
            max_speed: 0.08,
        }
    }
}

/// Top-level configuration of the collision core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Narrow phase and probes
    pub collision: CollisionConfig,
    /// Horizontal resolver
    pub movement: MovementConfig,
    /// Vertical integrator
    pub vertical: VerticalConfig,
    /// Kinematic platforms
    pub platforms: PlatformConfig,
    /// Player actor preset
    pub player: ActorConfig,
    /// AI actor preset
    pub enemy: ActorConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            collision: CollisionConfig::default(),
            movement: MovementConfig::default(),
            vertical: VerticalConfig::default(),
            platforms: PlatformConfig::default(),
            player: ActorConfig::player(),
            enemy: ActorConfig::enemy(),
        }
    }
}

impl Config for PhysicsConfig {}

fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason })
    }
}

impl PhysicsConfig {
    /// Reject values the algorithms cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.collision;
        check(
            c.ground_normal_threshold.is_finite() && c.ground_normal_threshold > 0.0 && c.ground_normal_threshold <= 1.0,
            "collision.ground_normal_threshold",
            "must be in (0, 1]",
        )?;
        check(c.probe_steps >= 2, "collision.probe_steps", "must be at least 2")?;
        check(
            c.penetration_buffer.is_finite() && c.penetration_buffer >= 0.0,
            "collision.penetration_buffer",
            "must be finite and non-negative",
        )?;
        check(
            c.inside_epsilon.is_finite() && c.inside_epsilon > 0.0,
            "collision.inside_epsilon",
            "must be positive",
        )?;
        check(
            c.parallel_axis_epsilon.is_finite() && c.parallel_axis_epsilon > 0.0,
            "collision.parallel_axis_epsilon",
            "must be positive",
        )?;

        let m = &self.movement;
        check(
            m.step_height.is_finite() && m.step_height >= 0.0,
            "movement.step_height",
            "must be finite and non-negative",
        )?;
        check(m.fan_samples >= 2, "movement.fan_samples", "must be at least 2")?;
        check(
            m.fan_half_angle_degrees.is_finite() && m.fan_half_angle_degrees > 0.0 && m.fan_half_angle_degrees <= 180.0,
            "movement.fan_half_angle_degrees",
            "must be in (0, 180]",
        )?;

        let v = &self.vertical;
        check(v.gravity.is_finite() && v.gravity >= 0.0, "vertical.gravity", "must be finite and non-negative")?;
        check(
            v.jump_impulse.is_finite() && v.jump_impulse >= 0.0,
            "vertical.jump_impulse",
            "must be finite and non-negative",
        )?;
        check(
            v.terminal_velocity.is_finite() && v.terminal_velocity < 0.0,
            "vertical.terminal_velocity",
            "must be negative",
        )?;
        check(v.climb_duration_ms > 0, "vertical.climb_duration_ms", "must be non-zero")?;
        check(
            v.ground_snap.is_finite() && v.ground_snap >= 0.0,
            "vertical.ground_snap",
            "must be finite and non-negative",
        )?;
        check(
            v.ceiling_skin.is_finite() && v.ceiling_skin >= 0.0,
            "vertical.ceiling_skin",
            "must be finite and non-negative",
        )?;

        check(
            self.platforms.travel.is_finite() && self.platforms.travel >= 0.0,
            "platforms.travel",
            "must be finite and non-negative",
        )?;

        for (actor, field) in [(&self.player, "player"), (&self.enemy, "enemy")] {
            check(
                actor.radius.is_finite() && actor.radius > 0.0,
                field,
                "radius must be positive",
            )?;
            check(
                actor.stand_height.is_finite() && actor.stand_height > actor.radius,
                field,
                "stand_height must exceed the radius",
            )?;
            check(
                actor.head_offset.is_finite() && actor.head_offset >= actor.radius,
                field,
                "head_offset must be at least the radius",
            )?;
            check(
                actor.max_speed.is_finite() && actor.max_speed >= 0.0,
                field,
                "max_speed must be non-negative",
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("collision_engine_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.collision.probe_steps, 10);
        assert_eq!(config.movement.fan_samples, 16);
        assert!((config.collision.ground_normal_threshold - 0.7).abs() < f32::EPSILON);
        assert!((config.movement.step_height - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("physics.toml");
        let mut config = PhysicsConfig::default();
        config.movement.step_height = 0.75;
        config.save_to_file(&path).unwrap();

        let loaded = PhysicsConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_ron_partial_file_uses_defaults() {
        let path = temp_path("partial.ron");
        std::fs::write(&path, "(movement: (fan_samples: 24))").unwrap();

        let loaded = PhysicsConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.movement.fan_samples, 24);
        assert_eq!(loaded.collision, CollisionConfig::default());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unsupported_extension() {
        let result = PhysicsConfig::load_from_file("physics.json");
        // Extension is checked after reading, so a missing file reports IO first
        assert!(matches!(result, Err(ConfigError::Io(_))));

        let path = temp_path("physics.json");
        let err = PhysicsConfig::default().save_to_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PhysicsConfig::default();
        config.vertical.terminal_velocity = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "vertical.terminal_velocity", .. })
        ));

        let mut config = PhysicsConfig::default();
        config.collision.probe_steps = 1;
        assert!(config.validate().is_err());

        let mut config = PhysicsConfig::default();
        config.player.stand_height = 0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "player", .. })));
    }

    #[test]
    fn test_validate_body_proportions() {
        // Feet exactly at the sphere bottom would keep a standing actor in floor contact
        let mut config = PhysicsConfig::default();
        config.player.stand_height = config.player.radius;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "player", .. })));

        config.player.stand_height = config.player.radius + 0.01;
        assert!(config.validate().is_ok());

        let mut config = PhysicsConfig::default();
        config.enemy.head_offset = config.enemy.radius - 0.01;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "enemy", .. })));

        config.enemy.head_offset = config.enemy.radius;
        assert!(config.validate().is_ok());
    }
}
