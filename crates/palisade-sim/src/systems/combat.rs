//! Damage application and the unit death transition.
//!
//! Every entry point is a no-op once a unit is `Dead`; the death
//! transition itself fires exactly once per activation.

use hecs::{Entity, World};

use palisade_core::components::{Collider, Corpse, Movement, UnitHealth};
use palisade_core::constants::{CORPSE_LINGER_SECS, KNOCKBACK_DURATION_SECS};
use palisade_core::enums::{DamageType, UnitState, VfxKind};
use palisade_core::events::GameEvent;
use palisade_core::types::{Position, Velocity};
use palisade_effects::StatusEffects;

use crate::engine::ScoreState;
use crate::pool::EntityPool;
use crate::registry::EnemyRegistry;
use crate::systems::vfx;

/// Direct damage: subtracts health, forwards a knockback impulse to the
/// movement collaborator (skipped when absent), applies the status
/// effect matching the damage flavor, and runs the death transition
/// when health drops to zero or below.
#[allow(clippy::too_many_arguments)]
pub fn apply_damage(
    world: &mut World,
    registry: &mut EnemyRegistry,
    vfx_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    unit: Entity,
    amount: i32,
    damage_type: DamageType,
    hit_direction: Velocity,
    knockback: f64,
) {
    let dead = {
        let Ok(mut health) = world.get::<&mut UnitHealth>(unit) else {
            return;
        };
        if health.state == UnitState::Dead {
            return;
        }
        health.current_health -= amount;
        health.current_health <= 0
    };

    if let Ok(mut movement) = world.get::<&mut Movement>(unit) {
        movement.knockback_velocity = hit_direction.scaled(knockback);
        movement.knockback_remaining_secs = KNOCKBACK_DURATION_SECS;
    }

    if damage_type != DamageType::Normal {
        let applied = match world.get::<&mut StatusEffects>(unit) {
            Ok(mut effects) => effects.apply_on_hit(damage_type),
            Err(_) => false,
        };
        if applied {
            let position = unit_position(world, unit);
            events.push(match damage_type {
                DamageType::Fire => GameEvent::BurnApplied { position },
                _ => GameEvent::FreezeApplied { position },
            });
        }
    }

    if dead {
        die(world, registry, vfx_pool, events, score, unit);
    }
}

/// Damage-over-time path: identical to `apply_damage` but bypasses
/// knockback and status application, so burn ticks never displace the
/// unit.
pub fn apply_pure_damage(
    world: &mut World,
    registry: &mut EnemyRegistry,
    vfx_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    unit: Entity,
    amount: i32,
) {
    let dead = {
        let Ok(mut health) = world.get::<&mut UnitHealth>(unit) else {
            return;
        };
        if health.state == UnitState::Dead {
            return;
        }
        health.current_health -= amount;
        health.current_health <= 0
    };

    if dead {
        die(world, registry, vfx_pool, events, score, unit);
    }
}

/// Overwrite the unit's state. No-op once `Dead` — the terminal state
/// can only be left through pool reactivation.
pub fn set_state(world: &mut World, unit: Entity, new_state: UnitState) {
    if let Ok(mut health) = world.get::<&mut UnitHealth>(unit) {
        if health.state != UnitState::Dead {
            health.state = new_state;
        }
    }
}

/// The death transition. Side effects fire exactly once, in order:
/// unregister, terminal state, collision off, corpse countdown toward
/// the owning pool, death event and visual.
fn die(
    world: &mut World,
    registry: &mut EnemyRegistry,
    vfx_pool: &mut EntityPool,
    events: &mut Vec<GameEvent>,
    score: &mut ScoreState,
    unit: Entity,
) {
    {
        let Ok(health) = world.get::<&UnitHealth>(unit) else {
            return;
        };
        if health.state == UnitState::Dead {
            return;
        }
    }

    registry.unregister(unit);

    if let Ok(mut health) = world.get::<&mut UnitHealth>(unit) {
        health.state = UnitState::Dead;
    }

    if let Ok(mut collider) = world.get::<&mut Collider>(unit) {
        collider.enabled = false;
    }

    let _ = world.insert_one(
        unit,
        Corpse {
            remaining_secs: CORPSE_LINGER_SECS,
        },
    );

    score.enemies_killed += 1;

    let position = unit_position(world, unit);
    events.push(GameEvent::EnemyDied { position });
    let _ = vfx::spawn(world, vfx_pool, VfxKind::BloodSplash, position);
}

fn unit_position(world: &World, unit: Entity) -> Position {
    world.get::<&Position>(unit).map(|p| *p).unwrap_or_default()
}
