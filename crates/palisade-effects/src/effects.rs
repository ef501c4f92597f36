//! Per-unit timed status effects.
//!
//! Each effect kind is an independent timed process: at most one burn
//! and one freeze can run at a time, and re-applying a kind cancels the
//! in-flight process and restarts it — effects never stack or queue.
//! The records are plain data so they can be snapshotted and advanced
//! deterministically by the simulation tick.

use serde::{Deserialize, Serialize};

use palisade_core::constants::{
    BURN_DURATION_SECS, BURN_TICK_DAMAGE, BURN_TICK_INTERVAL_SECS, FREEZE_DURATION_SECS,
    FREEZE_SLOW_MULTIPLIER,
};
use palisade_core::enums::DamageType;

/// A running burn: periodic pure damage until the duration elapses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BurnEffect {
    duration_secs: f64,
    elapsed_secs: f64,
    tick_damage: i32,
    tick_interval_secs: f64,
    /// Elapsed time at which the next damage tick fires. Starts at 0
    /// so the first tick lands on the first advance after application.
    next_tick_at: f64,
}

/// A running freeze: movement multiplier held until the duration elapses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FreezeEffect {
    remaining_secs: f64,
    slow_multiplier: f64,
}

/// Result of advancing a unit's effects by one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectUpdate {
    /// Damage to apply through the pure-damage path (no knockback).
    pub pure_damage: i32,
    /// Movement multiplier after this tick (1.0 when no freeze runs).
    pub speed_multiplier: f64,
    /// The burn finished this tick.
    pub burn_expired: bool,
    /// The freeze finished this tick; the multiplier is back at 1.0.
    pub freeze_expired: bool,
}

/// The per-unit effect engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    burn: Option<BurnEffect>,
    freeze: Option<FreezeEffect>,
}

impl StatusEffects {
    /// Start (or restart) a burn. An in-flight burn is cancelled and
    /// replaced; its remaining ticks are lost.
    pub fn apply_burn(&mut self, duration_secs: f64, tick_damage: i32, tick_interval_secs: f64) {
        self.burn = Some(BurnEffect {
            duration_secs,
            elapsed_secs: 0.0,
            tick_damage,
            tick_interval_secs: tick_interval_secs.max(f64::EPSILON),
            next_tick_at: 0.0,
        });
    }

    /// Start (or restart) a freeze. The multiplier takes effect
    /// immediately; replacing a freeze restarts its timer.
    pub fn apply_freeze(&mut self, duration_secs: f64, slow_multiplier: f64) {
        self.freeze = Some(FreezeEffect {
            remaining_secs: duration_secs,
            slow_multiplier,
        });
    }

    /// Apply the effect matching a damage flavor with default tuning.
    /// Returns true if an effect was applied.
    pub fn apply_on_hit(&mut self, damage_type: DamageType) -> bool {
        match damage_type {
            DamageType::Fire => {
                self.apply_burn(BURN_DURATION_SECS, BURN_TICK_DAMAGE, BURN_TICK_INTERVAL_SECS);
                true
            }
            DamageType::Ice => {
                self.apply_freeze(FREEZE_DURATION_SECS, FREEZE_SLOW_MULTIPLIER);
                true
            }
            DamageType::Normal => false,
        }
    }

    /// Cancel both processes immediately. After this call the movement
    /// multiplier reads 1.0; a pooled unit never reactivates with a
    /// stale slow applied.
    pub fn stop_all(&mut self) {
        self.burn = None;
        self.freeze = None;
    }

    pub fn burning(&self) -> bool {
        self.burn.is_some()
    }

    pub fn frozen(&self) -> bool {
        self.freeze.is_some()
    }

    /// Current movement multiplier (1.0 when no freeze runs).
    pub fn speed_multiplier(&self) -> f64 {
        self.freeze.as_ref().map_or(1.0, |f| f.slow_multiplier)
    }

    /// Advance both processes by `dt` seconds.
    ///
    /// Burn deals `tick_damage` at elapsed times 0, interval,
    /// 2·interval, … strictly below the duration, then expires; freeze
    /// holds its multiplier and restores 1.0 on expiry.
    pub fn advance(&mut self, dt: f64) -> EffectUpdate {
        let mut update = EffectUpdate {
            speed_multiplier: self.speed_multiplier(),
            ..EffectUpdate::default()
        };

        if let Some(burn) = &mut self.burn {
            burn.elapsed_secs += dt;
            while burn.next_tick_at < burn.duration_secs && burn.elapsed_secs >= burn.next_tick_at {
                update.pure_damage += burn.tick_damage;
                burn.next_tick_at += burn.tick_interval_secs;
            }
            if burn.elapsed_secs >= burn.duration_secs {
                self.burn = None;
                update.burn_expired = true;
            }
        }

        if let Some(freeze) = &mut self.freeze {
            freeze.remaining_secs -= dt;
            if freeze.remaining_secs <= 0.0 {
                self.freeze = None;
                update.freeze_expired = true;
                update.speed_multiplier = 1.0;
            }
        }

        update
    }
}
