//! Events emitted by the simulation for presentation and scoring.

use serde::{Deserialize, Serialize};

use crate::types::Position;

/// One-shot facts about the current tick, drained into each snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A wave began spawning.
    WaveStarted { wave: usize },
    /// An enemy was activated from the pool.
    EnemySpawned { position: Position },
    /// An enemy died to damage.
    EnemyDied { position: Position },
    /// An enemy reached the end of its path.
    EnemyLeaked { position: Position },
    /// A tower launched an arrow.
    ArrowFired { from: Position, target: Position },
    /// An arrow detonated.
    ArrowImpact { position: Position },
    /// A burn was (re)applied to a unit.
    BurnApplied { position: Position },
    /// A freeze was (re)applied to a unit.
    FreezeApplied { position: Position },
    /// Every scheduled enemy has been resolved.
    MissionComplete { killed: u32, leaked: u32 },
}
