//! Waypoint-following movement with knockback and neighbor separation.
//!
//! While a knockback impulse is running it takes precedence over path
//! following. A unit that reaches the final waypoint leaks: it is
//! unregistered and returned to its pool rather than killed.

use hecs::{Entity, World};

use palisade_core::components::{Active, LayerMask, Movement, UnitHealth};
use palisade_core::constants::{SEPARATION_FORCE, SEPARATION_RADIUS, WAYPOINT_ARRIVAL_DISTANCE_SQ};
use palisade_core::enums::UnitState;
use palisade_core::events::GameEvent;
use palisade_core::types::{Position, Velocity};

use crate::engine::ScoreState;
use crate::pool::EntityPool;
use crate::registry::EnemyRegistry;
use crate::spatial::SpatialQuery;
use crate::systems::spawning;
use crate::world_setup::PathSet;

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    registry: &mut EnemyRegistry,
    paths: &PathSet,
    spatial: &dyn SpatialQuery,
    enemy_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    overlap_buffer: &mut Vec<Entity>,
    dt: f64,
) {
    let mut walkers: Vec<Entity> = Vec::new();
    for (entity, _) in world
        .query_mut::<(&Movement, &UnitHealth)>()
        .with::<&Active>()
    {
        walkers.push(entity);
    }

    for entity in walkers {
        step_unit(
            world,
            registry,
            paths,
            spatial,
            enemy_pool,
            events,
            score,
            overlap_buffer,
            entity,
            dt,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn step_unit(
    world: &mut World,
    registry: &mut EnemyRegistry,
    paths: &PathSet,
    spatial: &dyn SpatialQuery,
    enemy_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    overlap_buffer: &mut Vec<Entity>,
    entity: Entity,
    dt: f64,
) {
    match world.get::<&UnitHealth>(entity) {
        Ok(health) if health.state == UnitState::Moving => {}
        _ => return,
    }

    // Knockback takes precedence over path following.
    let knockback = {
        let Ok(mut movement) = world.get::<&mut Movement>(entity) else {
            return;
        };
        if movement.knockback_remaining_secs > 0.0 {
            movement.knockback_remaining_secs -= dt;
            Some(movement.knockback_velocity)
        } else {
            None
        }
    };
    if let Some(impulse) = knockback {
        if let Ok(mut position) = world.get::<&mut Position>(entity) {
            position.x += impulse.x * dt;
            position.y += impulse.y * dt;
        }
        return;
    }

    let (path_index, waypoint_index, speed, multiplier) = {
        let Ok(movement) = world.get::<&Movement>(entity) else {
            return;
        };
        (
            movement.path_index,
            movement.waypoint_index,
            movement.speed,
            movement.speed_multiplier,
        )
    };
    let Some(target) = paths.waypoint(path_index, waypoint_index) else {
        return;
    };
    let position = match world.get::<&Position>(entity) {
        Ok(p) => *p,
        Err(_) => return,
    };

    let direction = position.direction_to(&target);
    let separation = separation_nudge(world, spatial, overlap_buffer, entity, position);
    let step = dt * speed * multiplier;

    let new_position = Position::new(
        position.x + (direction.x + separation.x) * step,
        position.y + (direction.y + separation.y) * step,
    );
    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        *pos = new_position;
    }

    if new_position.distance_squared_to(&target) < WAYPOINT_ARRIVAL_DISTANCE_SQ {
        let reached_goal = {
            let Ok(mut movement) = world.get::<&mut Movement>(entity) else {
                return;
            };
            movement.waypoint_index += 1;
            movement.waypoint_index >= paths.waypoint_count(path_index)
        };

        if reached_goal {
            score.enemies_leaked += 1;
            events.push(GameEvent::EnemyLeaked {
                position: new_position,
            });
            spawning::deactivate_enemy(world, registry, enemy_pool, entity);
        }
    }
}

/// Push-apart vector away from overlapping neighbors, scaled by
/// inverse distance like the classic boids separation term.
fn separation_nudge(
    world: &World,
    spatial: &dyn SpatialQuery,
    overlap_buffer: &mut Vec<Entity>,
    entity: Entity,
    position: Position,
) -> Velocity {
    spatial.query(
        world,
        position,
        SEPARATION_RADIUS,
        LayerMask::UNITS,
        overlap_buffer,
    );

    let mut separation = Velocity::default();
    for i in 0..overlap_buffer.len() {
        let neighbor = overlap_buffer[i];
        if neighbor == entity {
            continue;
        }
        let neighbor_pos = match world.get::<&Position>(neighbor) {
            Ok(p) => *p,
            Err(_) => continue,
        };
        let dist_sq = position.distance_squared_to(&neighbor_pos);
        if dist_sq <= 1e-8 {
            continue;
        }
        let away = neighbor_pos.direction_to(&position);
        let dist = dist_sq.sqrt();
        separation.x += away.x / dist;
        separation.y += away.y / dist;
    }

    separation.scaled(SEPARATION_FORCE)
}
