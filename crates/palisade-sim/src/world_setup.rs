//! Entity spawn factories and mission layout.
//!
//! Creates towers and pooled enemy/arrow/effect instances with
//! appropriate component bundles, and defines the authored waypoint
//! paths enemies walk.

use hecs::{Entity, World};

use palisade_core::components::{Collider, Enemy, LayerMask, Movement, UnitHealth, VisualEffect};
use palisade_core::constants::*;
use palisade_core::enums::{DamageType, VfxKind};
use palisade_core::types::Position;
use palisade_effects::StatusEffects;

use crate::weapons::{ArrowState, Tower};

/// The authored waypoint paths for a mission, fixed at setup.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    paths: Vec<Vec<Position>>,
}

impl PathSet {
    pub fn new(paths: Vec<Vec<Position>>) -> Self {
        Self { paths }
    }

    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// First waypoint of a path (the spawn anchor).
    pub fn start(&self, path_index: usize) -> Position {
        self.paths
            .get(path_index)
            .and_then(|path| path.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn waypoint(&self, path_index: usize, waypoint_index: usize) -> Option<Position> {
        self.paths
            .get(path_index)
            .and_then(|path| path.get(waypoint_index))
            .copied()
    }

    /// Number of waypoints on a path.
    pub fn waypoint_count(&self, path_index: usize) -> usize {
        self.paths.get(path_index).map_or(0, Vec::len)
    }
}

/// Two lanes crossing the tower line from west to east.
pub fn default_paths() -> PathSet {
    PathSet::new(vec![
        vec![
            Position::new(-14.0, 1.0),
            Position::new(-6.0, 3.0),
            Position::new(2.0, 1.5),
            Position::new(8.0, -1.0),
            Position::new(14.0, 0.0),
        ],
        vec![
            Position::new(-14.0, -2.0),
            Position::new(-7.0, -3.5),
            Position::new(0.0, -1.5),
            Position::new(7.0, 1.0),
            Position::new(14.0, 0.5),
        ],
    ])
}

/// Place the default tower line: one of each damage flavor.
pub fn setup_mission(world: &mut World) {
    spawn_tower(world, Position::new(-5.0, -0.5), DamageType::Normal);
    spawn_tower(world, Position::new(0.5, 0.0), DamageType::Fire);
    spawn_tower(world, Position::new(6.0, 0.5), DamageType::Ice);
}

pub fn spawn_tower(world: &mut World, position: Position, damage_type: DamageType) -> Entity {
    world.spawn((position, Tower::new(damage_type)))
}

/// Pool factory for enemy units. The instance spawns dormant (no
/// `Active` marker); activation resets it and registers it.
pub fn create_enemy(world: &mut World) -> Entity {
    world.spawn((
        Enemy,
        Position::default(),
        UnitHealth::new(ENEMY_MAX_HEALTH),
        Movement::new(ENEMY_SPEED, 0),
        Collider {
            radius: UNIT_COLLIDER_RADIUS,
            enabled: true,
            layer: LayerMask::UNITS,
        },
        StatusEffects::default(),
    ))
}

/// Pool factory for arrows.
pub fn create_arrow(world: &mut World) -> Entity {
    world.spawn((Position::default(), ArrowState::new()))
}

/// Pool factory for one-shot visual effects.
pub fn create_vfx(world: &mut World) -> Entity {
    world.spawn((
        Position::default(),
        VisualEffect {
            kind: VfxKind::ImpactDust,
            remaining_secs: 0.0,
        },
    ))
}
