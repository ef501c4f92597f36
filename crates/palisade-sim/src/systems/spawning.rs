//! Wave spawning and the pooled-enemy activation/deactivation pair.
//!
//! Activation and deactivation replace engine enable/disable hooks:
//! the spawner, not the entity, owns registry membership.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use palisade_core::components::{Collider, Corpse, Movement, UnitHealth};
use palisade_core::constants::{ENEMY_SPEED, SPAWN_JITTER, WAVE_INTERVAL_TICKS, WAVE_SPACING_TICKS};
use palisade_core::enums::UnitState;
use palisade_core::events::GameEvent;
use palisade_core::types::Position;
use palisade_effects::StatusEffects;

use crate::pool::EntityPool;
use crate::registry::EnemyRegistry;
use crate::world_setup::{self, PathSet};

/// One scheduled burst of enemies.
#[derive(Debug, Clone)]
pub struct WaveEntry {
    /// Tick at which this wave begins.
    pub start_tick: u64,
    /// Enemies in the wave.
    pub count: u32,
    /// Ticks between consecutive spawns.
    pub spacing_ticks: u64,
    /// Enemies spawned so far.
    pub spawned: u32,
    /// Whether the start event has been emitted.
    pub announced: bool,
}

/// The complete wave schedule for a mission.
#[derive(Debug, Clone, Default)]
pub struct WaveSchedule {
    pub waves: Vec<WaveEntry>,
}

impl WaveSchedule {
    /// Default 3-wave mission with escalating counts.
    pub fn default_mission() -> Self {
        let wave = |index: u64, count: u32| WaveEntry {
            start_tick: index * WAVE_INTERVAL_TICKS,
            count,
            spacing_ticks: WAVE_SPACING_TICKS,
            spawned: 0,
            announced: false,
        };
        Self {
            waves: vec![wave(0, 4), wave(1, 6), wave(2, 8)],
        }
    }

    /// Total number of enemies across all waves.
    pub fn total_enemies(&self) -> u32 {
        self.waves.iter().map(|w| w.count).sum()
    }

    /// True once every scheduled enemy has been spawned.
    pub fn complete(&self) -> bool {
        self.waves.iter().all(|w| w.spawned >= w.count)
    }
}

/// Check the schedule and activate any due enemies. A full pool stops
/// this tick's spawning; the due spawns retry on later ticks.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    registry: &mut EnemyRegistry,
    paths: &PathSet,
    enemy_pool: &mut EntityPool,
    schedule: &mut WaveSchedule,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    current_tick: u64,
) {
    for (index, wave) in schedule.waves.iter_mut().enumerate() {
        if wave.spawned >= wave.count || current_tick < wave.start_tick {
            continue;
        }
        if !wave.announced {
            events.push(GameEvent::WaveStarted { wave: index });
            wave.announced = true;
        }

        while wave.spawned < wave.count
            && current_tick >= wave.start_tick + u64::from(wave.spawned) * wave.spacing_ticks
        {
            let path_index = rng.gen_range(0..paths.count().max(1));
            let jitter = rng.gen_range(-SPAWN_JITTER..SPAWN_JITTER);

            let Some(entity) =
                activate_enemy(world, registry, enemy_pool, paths, path_index, jitter)
            else {
                break;
            };
            wave.spawned += 1;

            let position = world.get::<&Position>(entity).map(|p| *p).unwrap_or_default();
            events.push(GameEvent::EnemySpawned { position });
        }
    }
}

/// Pull an enemy from the pool and restore every invariant death broke:
/// full health, `Moving` state, enabled collider, fresh movement state,
/// no stale effects — then register it.
pub fn activate_enemy(
    world: &mut World,
    registry: &mut EnemyRegistry,
    enemy_pool: &mut EntityPool,
    paths: &PathSet,
    path_index: usize,
    jitter: f64,
) -> Option<Entity> {
    let entity = enemy_pool.acquire(world, world_setup::create_enemy)?;

    let anchor = paths.start(path_index);
    let spawn_position = Position::new(anchor.x, anchor.y + jitter);

    if let Ok(mut health) = world.get::<&mut UnitHealth>(entity) {
        health.current_health = health.max_health;
        health.state = UnitState::Moving;
    }
    if let Ok(mut movement) = world.get::<&mut Movement>(entity) {
        *movement = Movement::new(ENEMY_SPEED, path_index);
    }
    if let Ok(mut collider) = world.get::<&mut Collider>(entity) {
        collider.enabled = true;
    }
    if let Ok(mut effects) = world.get::<&mut StatusEffects>(entity) {
        effects.stop_all();
    }
    if let Ok(mut position) = world.get::<&mut Position>(entity) {
        *position = spawn_position;
    }
    let _ = world.remove_one::<Corpse>(entity);

    registry.register(entity);
    Some(entity)
}

/// Return a unit to its pool: unregister, cancel effects (restoring the
/// movement multiplier), drop any corpse countdown, park the entity.
pub fn deactivate_enemy(
    world: &mut World,
    registry: &mut EnemyRegistry,
    enemy_pool: &mut EntityPool,
    entity: Entity,
) {
    registry.unregister(entity);

    if let Ok(mut effects) = world.get::<&mut StatusEffects>(entity) {
        effects.stop_all();
    }
    if let Ok(mut movement) = world.get::<&mut Movement>(entity) {
        movement.speed_multiplier = 1.0;
    }
    let _ = world.remove_one::<Corpse>(entity);

    let _ = enemy_pool.release(world, entity);
}
