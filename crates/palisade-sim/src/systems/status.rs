//! Status effect system — advances each unit's timed effects by one
//! tick and applies their outputs.
//!
//! Burn damage flows through the pure-damage path (no knockback); the
//! freeze multiplier is written into the movement component every tick,
//! so an expired or cancelled freeze restores full speed on the next
//! advance.

use hecs::{Entity, World};

use palisade_core::components::{Active, Movement};
use palisade_core::events::GameEvent;
use palisade_effects::StatusEffects;

use crate::engine::ScoreState;
use crate::pool::EntityPool;
use crate::registry::EnemyRegistry;
use crate::systems::combat;

pub fn run(
    world: &mut World,
    registry: &mut EnemyRegistry,
    vfx_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    dt: f64,
) {
    // Collect updates in a buffer to avoid borrow issues with hecs
    let mut updates: Vec<(Entity, i32, f64)> = Vec::new();

    for (entity, effects) in world.query_mut::<&mut StatusEffects>().with::<&Active>() {
        let update = effects.advance(dt);
        updates.push((entity, update.pure_damage, update.speed_multiplier));
    }

    for (entity, pure_damage, speed_multiplier) in updates {
        if let Ok(mut movement) = world.get::<&mut Movement>(entity) {
            movement.speed_multiplier = speed_multiplier;
        }
        if pure_damage > 0 {
            combat::apply_pure_damage(world, registry, vfx_pool, events, score, entity, pure_damage);
        }
    }
}
