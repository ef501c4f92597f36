//! Game state snapshot — the complete visible state emitted each tick.

use serde::{Deserialize, Serialize};

use crate::enums::{DamageType, GamePhase, UnitState};
use crate::events::GameEvent;
use crate::types::{Position, SimTime};

/// Complete game state produced by the engine after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    pub arrows: Vec<ArrowView>,
    pub events: Vec<GameEvent>,
    pub score: ScoreView,
    /// Registry change counter; consumers compare against a cached
    /// value to detect membership changes without deep comparison.
    pub registry_version: u64,
}

/// A visible enemy unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyView {
    pub position: Position,
    pub current_health: i32,
    pub max_health: i32,
    pub state: UnitState,
    pub speed_multiplier: f64,
    pub burning: bool,
    pub frozen: bool,
}

/// A tower and its firing status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TowerView {
    pub position: Position,
    pub range: f64,
    pub damage_type: DamageType,
    pub cooldown_secs: f64,
    pub has_target: bool,
}

/// An arrow in flight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArrowView {
    pub position: Position,
    /// Flight progress in [0, 1].
    pub progress: f64,
}

/// Running score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub enemies_killed: u32,
    pub enemies_leaked: u32,
    pub enemies_total: u32,
    pub arrows_fired: u32,
}
