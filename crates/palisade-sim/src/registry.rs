//! Registry of living enemy units.
//!
//! An explicit context object owned by the engine and handed to the
//! systems that need it — never a process-wide static, so independent
//! simulations can coexist in one test process. Holds an
//! insertion-ordered list for deterministic scan order, a parallel set
//! for O(1) duplicate rejection, and a version counter that lets
//! consumers detect membership changes without deep comparison.

use std::collections::HashSet;

use hecs::{Entity, World};

use palisade_core::components::UnitHealth;
use palisade_core::enums::UnitState;
use palisade_core::types::Position;

#[derive(Debug, Default)]
pub struct EnemyRegistry {
    /// Insertion-ordered live units. Removal is a linear scan; enemy
    /// counts are bounded by the pool cap, so this is a known scaling
    /// limit rather than a hotspot.
    entries: Vec<Entity>,
    /// Mirror of `entries` for O(1) membership checks.
    members: HashSet<Entity>,
    /// Bumped once per structural change (register, unregister,
    /// eviction pass, clear).
    version: u64,
}

impl EnemyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit. No-op if it is already registered.
    pub fn register(&mut self, unit: Entity) {
        if !self.members.insert(unit) {
            return;
        }
        self.entries.push(unit);
        self.version += 1;
    }

    /// Remove a unit. No-op if it is not registered.
    pub fn unregister(&mut self, unit: Entity) {
        if !self.members.remove(&unit) {
            return;
        }
        if let Some(index) = self.entries.iter().position(|e| *e == unit) {
            let _ = self.entries.remove(index);
        }
        self.version += 1;
    }

    /// Empty the registry. Bumps the version once if anything was held.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.members.clear();
        self.version += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, unit: Entity) -> bool {
        self.members.contains(&unit)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Find the nearest living unit within `range` of `origin`.
    ///
    /// Entries whose entity no longer resolves to a unit (despawned, or
    /// stripped of its health component) are evicted during the scan;
    /// the version is bumped once afterward if any eviction happened.
    /// Units in the `Dead` state are skipped but stay registered —
    /// death is not invalidation.
    ///
    /// The scan runs newest-registered-first with a strict `<`
    /// comparison, so on an exact squared-distance tie the
    /// last-registered unit wins.
    pub fn try_nearest(&mut self, world: &World, origin: Position, range: f64) -> Option<Entity> {
        let range_sq = range * range;
        let mut nearest = None;
        let mut nearest_dist_sq = f64::MAX;
        let mut evicted = false;

        let mut i = self.entries.len();
        while i > 0 {
            i -= 1;
            let unit = self.entries[i];

            let resolved = match (
                world.get::<&UnitHealth>(unit),
                world.get::<&Position>(unit),
            ) {
                (Ok(health), Ok(position)) => Some((health.state, *position)),
                _ => None,
            };
            let Some((state, position)) = resolved else {
                let _ = self.entries.remove(i);
                let _ = self.members.remove(&unit);
                evicted = true;
                continue;
            };

            if state == UnitState::Dead {
                continue;
            }

            let dist_sq = origin.distance_squared_to(&position);
            if dist_sq > range_sq || dist_sq >= nearest_dist_sq {
                continue;
            }

            nearest_dist_sq = dist_sq;
            nearest = Some(unit);
        }

        if evicted {
            self.version += 1;
        }

        nearest
    }
}
