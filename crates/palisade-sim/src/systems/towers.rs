//! Tower system — target caching against the registry version and
//! cooldown-gated arrow launches.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use palisade_core::components::UnitHealth;
use palisade_core::constants::TOWER_RETARGET_INTERVAL_SECS;
use palisade_core::enums::{DamageType, UnitState};
use palisade_core::events::GameEvent;
use palisade_core::types::Position;

use crate::engine::ScoreState;
use crate::pool::EntityPool;
use crate::registry::EnemyRegistry;
use crate::weapons::{ArrowState, Tower};
use crate::world_setup;

pub fn run(
    world: &mut World,
    registry: &mut EnemyRegistry,
    arrow_pool: &mut EntityPool,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    dt: f64,
) {
    let mut towers: Vec<Entity> = Vec::new();
    for (entity, _) in world.query_mut::<(&Tower, &Position)>() {
        towers.push(entity);
    }

    for entity in towers {
        step_tower(world, registry, arrow_pool, rng, events, score, entity, dt);
    }
}

#[allow(clippy::too_many_arguments)]
fn step_tower(
    world: &mut World,
    registry: &mut EnemyRegistry,
    arrow_pool: &mut EntityPool,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    entity: Entity,
    dt: f64,
) {
    let tower_pos = match world.get::<&Position>(entity) {
        Ok(p) => *p,
        Err(_) => return,
    };
    let (mut cooldown, mut retarget_timer, mut target, seen_version, range, fire_rate, damage_type, scatter) = {
        let Ok(tower) = world.get::<&Tower>(entity) else {
            return;
        };
        (
            tower.cooldown_secs,
            tower.retarget_timer_secs,
            tower.target,
            tower.seen_version,
            tower.range,
            tower.fire_rate,
            tower.damage_type,
            tower.aim_scatter,
        )
    };

    cooldown -= dt;
    retarget_timer -= dt;

    // Re-resolve when the interval elapsed or the registry changed
    // under us; otherwise the cached target stays.
    if retarget_timer <= 0.0 || seen_version != registry.version() {
        target = registry.try_nearest(world, tower_pos, range);
        retarget_timer = TOWER_RETARGET_INTERVAL_SECS;
    }
    let version = registry.version();

    if let Some(unit) = target {
        if !target_shootable(world, unit, tower_pos, range) {
            target = None;
        }
    }

    let mut aim = None;
    if cooldown <= 0.0 {
        if let Some(unit) = target {
            if let Ok(target_pos) = world.get::<&Position>(unit) {
                aim = Some(scatter_around(*target_pos, scatter, rng));
                cooldown = 1.0 / fire_rate;
            }
        }
    }

    if let Ok(mut tower) = world.get::<&mut Tower>(entity) {
        tower.cooldown_secs = cooldown;
        tower.retarget_timer_secs = retarget_timer;
        tower.target = target;
        tower.seen_version = version;
    }

    if let Some(aim) = aim {
        fire_arrow(
            world, arrow_pool, events, score, tower_pos, aim, damage_type,
        );
    }
}

/// A cached target may have died or walked out of range since it was
/// resolved; never fire at one that has.
fn target_shootable(world: &World, unit: Entity, origin: Position, range: f64) -> bool {
    let alive = match world.get::<&UnitHealth>(unit) {
        Ok(health) => health.state != UnitState::Dead,
        Err(_) => false,
    };
    if !alive {
        return false;
    }
    match world.get::<&Position>(unit) {
        Ok(position) => origin.distance_squared_to(&position) <= range * range,
        Err(_) => false,
    }
}

/// Uniform random point in the scatter disc around the aim point.
fn scatter_around(target: Position, scatter: f64, rng: &mut ChaCha8Rng) -> Position {
    let angle: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
    let radius = scatter * rng.gen::<f64>().sqrt();
    Position::new(
        target.x + radius * angle.cos(),
        target.y + radius * angle.sin(),
    )
}

fn fire_arrow(
    world: &mut World,
    arrow_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    from: Position,
    aim: Position,
    damage_type: DamageType,
) {
    let Some(arrow) = arrow_pool.acquire(world, world_setup::create_arrow) else {
        return;
    };

    if let Ok(mut state) = world.get::<&mut ArrowState>(arrow) {
        state.launch(from, aim, damage_type);
    }
    if let Ok(mut position) = world.get::<&mut Position>(arrow) {
        *position = from;
    }

    score.arrows_fired += 1;
    events.push(GameEvent::ArrowFired { from, target: aim });
}
