//! Snapshot system: queries the ECS world and builds a complete
//! GameStateSnapshot.
//!
//! This system is read-only — it never modifies the world.

use hecs::World;

use palisade_core::components::{Active, Movement, UnitHealth};
use palisade_core::enums::GamePhase;
use palisade_core::events::GameEvent;
use palisade_core::state::*;
use palisade_core::types::{Position, SimTime};
use palisade_effects::StatusEffects;

use crate::engine::ScoreState;
use crate::weapons::{ArrowState, Tower};

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    events: Vec<GameEvent>,
    score: &ScoreState,
    registry_version: u64,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        enemies: build_enemies(world),
        towers: build_towers(world),
        arrows: build_arrows(world),
        events,
        score: ScoreView {
            enemies_killed: score.enemies_killed,
            enemies_leaked: score.enemies_leaked,
            enemies_total: score.enemies_total,
            arrows_fired: score.arrows_fired,
        },
        registry_version,
    }
}

/// Build EnemyView list from all live (pool-owned-by-gameplay) units.
fn build_enemies(world: &World) -> Vec<EnemyView> {
    world
        .query::<(&Position, &UnitHealth, &Movement, &StatusEffects)>()
        .with::<&Active>()
        .iter()
        .map(|(_, (position, health, movement, effects))| EnemyView {
            position: *position,
            current_health: health.current_health,
            max_health: health.max_health,
            state: health.state,
            speed_multiplier: movement.speed_multiplier,
            burning: effects.burning(),
            frozen: effects.frozen(),
        })
        .collect()
}

fn build_towers(world: &World) -> Vec<TowerView> {
    world
        .query::<(&Position, &Tower)>()
        .iter()
        .map(|(_, (position, tower))| TowerView {
            position: *position,
            range: tower.range,
            damage_type: tower.damage_type,
            cooldown_secs: tower.cooldown_secs.max(0.0),
            has_target: tower.target.is_some(),
        })
        .collect()
}

fn build_arrows(world: &World) -> Vec<ArrowView> {
    world
        .query::<(&Position, &ArrowState)>()
        .with::<&Active>()
        .iter()
        .map(|(_, (position, state))| ArrowView {
            position: *position,
            progress: state.progress(),
        })
        .collect()
}
