//! Arena level description
//!
//! Stands in for the game's level loader: reads a RON file listing the
//! obstacle boxes, which of them are lifts, and where actors spawn.

use std::path::Path;

use collision_engine::foundation::math::Vec3;
use collision_engine::physics::{ObstacleGeometry, PhysicsError};
use serde::{Deserialize, Serialize};

/// Level loading errors
#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A lift points past the obstacle list
    #[error("Lift refers to obstacle {0}, level has {1}")]
    UnknownObstacle(usize, usize),

    /// The physics core rejected the level
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),
}

/// A lift: an obstacle moving up and down
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftDescription {
    /// Index into [`LevelDescription::obstacles`]
    pub obstacle: usize,
    /// Lowest center height
    pub initial_height: f32,
    /// Vertical speed per tick-equivalent
    pub velocity: f32,
}

/// Everything needed to build the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Display name
    pub name: String,
    /// Static and kinematic boxes, in registration order
    pub obstacles: Vec<ObstacleGeometry>,
    /// Obstacles with scripted motion
    #[serde(default)]
    pub lifts: Vec<LiftDescription>,
    /// Player spawn point
    pub player_spawn: Vec3,
    /// Enemy spawn points
    #[serde(default)]
    pub enemy_spawns: Vec<Vec3>,
    /// Waypoints the scripted player walks through in a loop
    #[serde(default)]
    pub patrol: Vec<Vec3>,
}

impl LevelDescription {
    /// Read a level from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let contents = std::fs::read_to_string(path)?;
        let level: Self = ron::from_str(&contents)?;
        level.check()?;
        Ok(level)
    }

    fn check(&self) -> Result<(), LevelError> {
        let count = self.obstacles.len();
        match self.lifts.iter().find(|lift| lift.obstacle >= count) {
            Some(lift) => Err(LevelError::UnknownObstacle(lift.obstacle, count)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_arena_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/arena.ron");
        let level = LevelDescription::load(path).unwrap();
        assert!(!level.obstacles.is_empty());
        assert!(!level.enemy_spawns.is_empty());
        assert!(level.lifts.iter().all(|lift| lift.obstacle < level.obstacles.len()));
    }

    #[test]
    fn test_lift_index_is_checked() {
        let level: LevelDescription = ron::from_str(
            "(name: \"bad\", obstacles: [], lifts: [(obstacle: 3, initial_height: 0.0, velocity: 0.1)], player_spawn: (0.0, 1.0, 0.0))",
        )
        .unwrap();
        assert!(matches!(level.check(), Err(LevelError::UnknownObstacle(3, 0))));
    }
}
