//! Headless arena sandbox
//!
//! Loads an arena, spawns a scripted player and a few chasing enemies, and
//! runs the fixed-step simulation for a number of ticks while logging what
//! the collision core decides. Usage:
//!
//! ```text
//! arena_sandbox [level.ron] [ticks] [seed]
//! ```

mod level;

use std::collections::HashMap;
use std::path::PathBuf;

use collision_engine::foundation::logging;
use collision_engine::foundation::math::{horizontal, rotate_about_up, try_direction};
use collision_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use level::LevelDescription;

const DEFAULT_TICKS: u64 = 1_800;
const DEFAULT_SEED: u64 = 7;
const WAYPOINT_RADIUS: f32 = 0.75;
const JUMP_INTERVAL: u64 = 240;
const CHASE_STOP_DISTANCE: f32 = 1.5;
const CHASE_JITTER: f32 = 0.35;

/// Walks the patrol loop, jumping now and then or when stuck
struct PlayerScript {
    patrol: Vec<Vec3>,
    next: usize,
    blocked_ticks: u32,
}

impl PlayerScript {
    fn new(patrol: Vec<Vec3>) -> Self {
        Self {
            patrol,
            next: 0,
            blocked_ticks: 0,
        }
    }

    fn input(&mut self, tick: u64, position: Vec3, max_speed: f32, last_stage: MoveStage) -> ActorInput {
        if last_stage == MoveStage::Blocked {
            self.blocked_ticks += 1;
        } else {
            self.blocked_ticks = 0;
        }

        let Some(&target) = self.patrol.get(self.next) else {
            return ActorInput::default();
        };
        let to_target = horizontal(&(target - position));
        if to_target.norm() < WAYPOINT_RADIUS {
            self.next = (self.next + 1) % self.patrol.len();
            log::info!("Player reached waypoint {:?}", target);
        }

        ActorInput {
            desired_velocity: try_direction(&to_target).map_or_else(Vec3::zeros, |dir| dir * max_speed),
            jump: tick % JUMP_INTERVAL == JUMP_INTERVAL - 1 || self.blocked_ticks > 10,
        }
    }
}

/// Heads for the player with a little seeded wobble
fn chase_input(rng: &mut StdRng, position: Vec3, player: Vec3, max_speed: f32) -> ActorInput {
    let to_player = horizontal(&(player - position));
    if to_player.norm() < CHASE_STOP_DISTANCE {
        return ActorInput::default();
    }

    let wobble = rng.gen_range(-CHASE_JITTER..=CHASE_JITTER);
    let desired = try_direction(&to_player).map_or_else(Vec3::zeros, |dir| rotate_about_up(&dir, wobble) * max_speed);
    ActorInput::walk(desired)
}

fn load_config(root: &std::path::Path) -> Result<PhysicsConfig, ConfigError> {
    let path = root.join("config/physics.toml");
    let config = if path.exists() {
        log::info!("Loading physics config from {}", path.display());
        PhysicsConfig::load_from_file(&path)?
    } else {
        log::info!("No physics config at {}, using defaults", path.display());
        PhysicsConfig::default()
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let mut args = std::env::args().skip(1);
    let level_path = args.next().map_or_else(|| root.join("assets/arena.ron"), PathBuf::from);
    let ticks: u64 = args.next().map(|arg| arg.parse()).transpose()?.unwrap_or(DEFAULT_TICKS);
    let seed: u64 = args.next().map(|arg| arg.parse()).transpose()?.unwrap_or(DEFAULT_SEED);

    log::info!("Starting arena sandbox");
    let config = load_config(&root)?;
    let level = LevelDescription::load(&level_path)?;
    log::info!("Level '{}': {} obstacles, {} lifts", level.name, level.obstacles.len(), level.lifts.len());

    let mut world = PhysicsWorld::from_level(config, SimClock::from_rate(60), &level.obstacles)?;
    let handles: Vec<ObstacleHandle> = world.collision().iter().map(|(handle, _)| handle).collect();
    for lift in &level.lifts {
        let handle = *handles
            .get(lift.obstacle)
            .ok_or(level::LevelError::UnknownObstacle(lift.obstacle, handles.len()))?;
        world.register_kinematic_platform(handle, lift.initial_height, lift.velocity)?;
    }

    let player = world.spawn_actor(ActorKind::Player, level.player_spawn);
    let enemies: Vec<ActorId> = level
        .enemy_spawns
        .iter()
        .map(|spawn| world.spawn_actor(ActorKind::Ai, *spawn))
        .collect();

    let mut script = PlayerScript::new(level.patrol.clone());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut phases: HashMap<ActorId, VerticalPhase> = HashMap::new();
    let mut stage_counts: HashMap<MoveStage, u64> = HashMap::new();

    for tick in 0..ticks {
        let Some(player_actor) = world.actor(player) else {
            break;
        };
        let player_position = player_actor.position();

        let mut inputs = vec![(
            player,
            script.input(tick, player_position, player_actor.body().max_speed, player_actor.last_stage()),
        )];
        for &enemy in &enemies {
            if let Some(actor) = world.actor(enemy) {
                inputs.push((enemy, chase_input(&mut rng, actor.position(), player_position, actor.body().max_speed)));
            }
        }

        for (_, stage) in world.step(&inputs)? {
            *stage_counts.entry(stage).or_default() += 1;
        }

        for (id, actor) in world.actors() {
            let phase = actor.phase();
            if phases.insert(id, phase) != Some(phase) {
                log::info!("tick {tick}: {:?} {:?} -> {:?} at {:?}", actor.kind(), id, phase, actor.position());
            }
        }

        if tick % 300 == 0 {
            log::debug!("tick {tick}: player at {:?}", player_position);
        }
    }

    let mut summary: Vec<_> = stage_counts.into_iter().collect();
    summary.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    log::info!("Ran {} ticks ({:.1}s simulated)", world.clock().tick_count(), world.clock().now().as_secs_f32());
    for (stage, count) in summary {
        log::info!("  {:?}: {}", stage, count);
    }

    Ok(())
}
