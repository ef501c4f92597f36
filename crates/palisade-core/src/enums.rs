//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Per-unit lifecycle state.
///
/// `Dead` is terminal: once entered, no damage, state change, or
/// re-registration is possible until the unit is reset for pool reuse.
/// The freeze slow is a movement multiplier, not a state of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    /// Alive and following its path.
    #[default]
    Moving,
    /// Alive but held in place (scripted holds).
    Holding,
    /// Terminal. Entered exactly once per activation.
    Dead,
}

/// Damage flavor carried by an arrow. Fire and Ice hits additionally
/// apply the matching status effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Normal,
    Fire,
    Ice,
}

/// Visual effect archetype for pooled one-shot effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VfxKind {
    /// Dust burst at an arrow impact point.
    ImpactDust,
    /// Blood splash at a unit death position.
    BloodSplash,
}

/// Game phase (top-level engine state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Setup,
    Active,
    Paused,
    /// All waves spawned and every enemy resolved (killed or leaked).
    Complete,
}
