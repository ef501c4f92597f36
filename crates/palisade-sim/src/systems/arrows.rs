//! Arrow flight system — parametric arc, pierce-with-dedup hit tests,
//! and terminal blast.
//!
//! An arrow belongs to the pool that launched it; a finished flight is
//! released back (or despawned outright if the pool disowned it).

use hecs::{Entity, World};

use palisade_core::components::{Active, LayerMask, UnitHealth};
use palisade_core::constants::ARROW_HIT_RADIUS;
use palisade_core::enums::VfxKind;
use palisade_core::events::GameEvent;
use palisade_core::types::Position;

use crate::engine::ScoreState;
use crate::pool::EntityPool;
use crate::registry::EnemyRegistry;
use crate::spatial::SpatialQuery;
use crate::systems::{combat, vfx};
use crate::weapons::ArrowState;

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    registry: &mut EnemyRegistry,
    spatial: &dyn SpatialQuery,
    arrow_pool: &mut EntityPool,
    vfx_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    scratch: &mut Vec<Entity>,
    overlap_buffer: &mut Vec<Entity>,
    dt: f64,
) {
    scratch.clear();
    for (entity, _) in world.query_mut::<&ArrowState>().with::<&Active>() {
        scratch.push(entity);
    }

    for i in 0..scratch.len() {
        let arrow = scratch[i];
        step_arrow(
            world,
            registry,
            spatial,
            arrow_pool,
            vfx_pool,
            events,
            score,
            overlap_buffer,
            arrow,
            dt,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn step_arrow(
    world: &mut World,
    registry: &mut EnemyRegistry,
    spatial: &dyn SpatialQuery,
    arrow_pool: &mut EntityPool,
    vfx_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    overlap_buffer: &mut Vec<Entity>,
    arrow: Entity,
    dt: f64,
) {
    let (position, arrived, damage, damage_type, knockback) = {
        let Ok(mut state) = world.get::<&mut ArrowState>(arrow) else {
            return;
        };
        if state.impacted {
            return;
        }
        state.elapsed_secs += dt;
        let t = state.progress();
        (
            state.position_at(t),
            t >= 1.0,
            state.damage,
            state.damage_type,
            state.knockback,
        )
    };

    if let Ok(mut pos) = world.get::<&mut Position>(arrow) {
        *pos = position;
    }

    if arrived {
        explode(
            world, registry, spatial, arrow_pool, vfx_pool, events, score, overlap_buffer, arrow,
            position,
        );
        return;
    }

    // In-flight hit test.
    spatial.query(world, position, ARROW_HIT_RADIUS, LayerMask::UNITS, overlap_buffer);

    let mut exhausted = false;
    for i in 0..overlap_buffer.len() {
        let unit = overlap_buffer[i];
        if world.get::<&UnitHealth>(unit).is_err() {
            continue;
        }

        // Dedup across the whole flight, then count the pierce.
        let fresh = {
            let Ok(mut state) = world.get::<&mut ArrowState>(arrow) else {
                return;
            };
            if state.hit_units.insert(unit) {
                state.pierce_count += 1;
                if state.pierce_count >= state.max_pierce {
                    exhausted = true;
                }
                true
            } else {
                false
            }
        };
        if !fresh {
            continue;
        }

        let unit_pos = world.get::<&Position>(unit).map(|p| *p).unwrap_or(position);
        let direction = position.direction_to(&unit_pos);
        combat::apply_damage(
            world, registry, vfx_pool, events, score, unit, damage, damage_type, direction,
            knockback,
        );

        if exhausted {
            break;
        }
    }

    if exhausted {
        explode(
            world, registry, spatial, arrow_pool, vfx_pool, events, score, overlap_buffer, arrow,
            position,
        );
    }
}

/// Terminal detonation: impact visual, area damage, release to pool.
/// Blast damage does not consult the flight's dedup set, so a pierced
/// unit standing at the impact point is hit again.
#[allow(clippy::too_many_arguments)]
fn explode(
    world: &mut World,
    registry: &mut EnemyRegistry,
    spatial: &dyn SpatialQuery,
    arrow_pool: &mut EntityPool,
    vfx_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    overlap_buffer: &mut Vec<Entity>,
    arrow: Entity,
    position: Position,
) {
    let (damage, damage_type, knockback, impact_radius) = {
        let Ok(mut state) = world.get::<&mut ArrowState>(arrow) else {
            return;
        };
        if state.impacted {
            return;
        }
        state.impacted = true;
        (
            state.damage,
            state.damage_type,
            state.knockback,
            state.impact_radius,
        )
    };

    events.push(GameEvent::ArrowImpact { position });
    let _ = vfx::spawn(world, vfx_pool, VfxKind::ImpactDust, position);

    spatial.query(world, position, impact_radius, LayerMask::UNITS, overlap_buffer);
    for i in 0..overlap_buffer.len() {
        let unit = overlap_buffer[i];
        if world.get::<&UnitHealth>(unit).is_err() {
            continue;
        }
        let unit_pos = world.get::<&Position>(unit).map(|p| *p).unwrap_or(position);
        let direction = position.direction_to(&unit_pos);
        combat::apply_damage(
            world, registry, vfx_pool, events, score, unit, damage, damage_type, direction,
            knockback,
        );
    }

    if !arrow_pool.release(world, arrow) {
        let _ = world.despawn(arrow);
    }
}
