//! Weapon data models — components that hold entity handles, so they
//! live in the sim crate rather than palisade-core.

use std::collections::HashSet;

use hecs::Entity;

use palisade_core::constants::*;
use palisade_core::enums::DamageType;
use palisade_core::types::Position;

/// A tower: acquires the nearest registered enemy and fires on a
/// cooldown. The cached target is re-resolved when the registry version
/// moves or the retarget interval elapses.
#[derive(Debug, Clone)]
pub struct Tower {
    pub range: f64,
    /// Shots per second.
    pub fire_rate: f64,
    pub damage_type: DamageType,
    pub aim_scatter: f64,
    /// Seconds until the next shot is allowed.
    pub cooldown_secs: f64,
    /// Seconds until the next forced target refresh.
    pub retarget_timer_secs: f64,
    /// Cached target from the last resolution.
    pub target: Option<Entity>,
    /// Registry version observed at the last resolution.
    pub seen_version: u64,
}

impl Tower {
    pub fn new(damage_type: DamageType) -> Self {
        Self {
            range: TOWER_RANGE,
            fire_rate: TOWER_FIRE_RATE,
            damage_type,
            aim_scatter: TOWER_AIM_SCATTER,
            cooldown_secs: 0.0,
            retarget_timer_secs: 0.0,
            target: None,
            seen_version: 0,
        }
    }
}

/// An arrow in flight along a parametric arc.
#[derive(Debug, Clone)]
pub struct ArrowState {
    pub start: Position,
    pub target: Position,
    pub travel_time_secs: f64,
    pub arc_height: f64,
    pub elapsed_secs: f64,
    pub damage: i32,
    pub damage_type: DamageType,
    pub knockback: f64,
    pub max_pierce: u32,
    pub pierce_count: u32,
    pub impact_radius: f64,
    pub impacted: bool,
    /// Units already hit during this flight; an arrow never hits the
    /// same unit twice.
    pub hit_units: HashSet<Entity>,
}

impl ArrowState {
    pub fn new() -> Self {
        Self {
            start: Position::default(),
            target: Position::default(),
            travel_time_secs: ARROW_TRAVEL_TIME_SECS,
            arc_height: ARROW_ARC_HEIGHT,
            elapsed_secs: 0.0,
            damage: ARROW_DAMAGE,
            damage_type: DamageType::Normal,
            knockback: ARROW_KNOCKBACK,
            max_pierce: ARROW_MAX_PIERCE,
            pierce_count: 0,
            impact_radius: ARROW_IMPACT_RADIUS,
            impacted: false,
            hit_units: HashSet::new(),
        }
    }

    /// Reset flight state for a fresh launch.
    pub fn launch(&mut self, start: Position, target: Position, damage_type: DamageType) {
        self.start = start;
        self.target = target;
        self.damage_type = damage_type;
        self.elapsed_secs = 0.0;
        self.pierce_count = 0;
        self.impacted = false;
        self.hit_units.clear();
    }

    /// Flight progress in [0, 1].
    pub fn progress(&self) -> f64 {
        (self.elapsed_secs / self.travel_time_secs).min(1.0)
    }

    /// Position along the arc at progress `t`: linear interpolation
    /// between start and target with a sine arc added to y.
    pub fn position_at(&self, t: f64) -> Position {
        let mut position = self.start.lerp(&self.target, t);
        position.y += (t * std::f64::consts::PI).sin() * self.arc_height;
        position
    }
}

impl Default for ArrowState {
    fn default() -> Self {
        Self::new()
    }
}
