//! ECS components for simulation entities.
//!
//! Components are plain data structs with no methods beyond small
//! constructors. Game logic lives in systems, not components.
//! Components that hold entity handles live in the sim crate instead.

use serde::{Deserialize, Serialize};

use crate::enums::{UnitState, VfxKind};
use crate::types::Velocity;

/// Collision layer bitmask, matched against a query mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Combat units (enemies).
    pub const UNITS: LayerMask = LayerMask(1);
    /// Everything.
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn intersects(&self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// Per-unit health and lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitHealth {
    pub max_health: i32,
    pub current_health: i32,
    pub state: UnitState,
}

impl UnitHealth {
    pub fn new(max_health: i32) -> Self {
        Self {
            max_health,
            current_health: max_health,
            state: UnitState::Moving,
        }
    }
}

/// Path-following movement state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    /// Base speed (units/s).
    pub speed: f64,
    /// External multiplier (1.0 = unmodified; freeze lowers it).
    pub speed_multiplier: f64,
    /// Which authored path this unit walks.
    pub path_index: usize,
    /// Index of the next waypoint on that path.
    pub waypoint_index: usize,
    /// Active knockback impulse, applied while the timer runs.
    pub knockback_velocity: Velocity,
    /// Remaining knockback time (seconds).
    pub knockback_remaining_secs: f64,
}

impl Movement {
    pub fn new(speed: f64, path_index: usize) -> Self {
        Self {
            speed,
            speed_multiplier: 1.0,
            path_index,
            waypoint_index: 0,
            knockback_velocity: Velocity::default(),
            knockback_remaining_secs: 0.0,
        }
    }
}

/// Combat-relevant collision surface consumed by the spatial query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub radius: f64,
    /// Disabled colliders are invisible to overlap queries.
    pub enabled: bool,
    pub layer: LayerMask,
}

/// Death-visual countdown. Attached when a unit dies; when it expires
/// the unit returns to its owning pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Corpse {
    pub remaining_secs: f64,
}

/// A pooled one-shot visual effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisualEffect {
    pub kind: VfxKind,
    /// Seconds until the instance auto-returns to its pool.
    pub remaining_secs: f64,
}

/// Marks an entity as an enemy unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy;

/// Present while the entity is owned by gameplay; removed while it is
/// parked in a pool. Systems only touch Active entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Active;
