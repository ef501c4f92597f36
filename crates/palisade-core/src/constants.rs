//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Enemies ---

/// Hit points a freshly activated enemy starts with.
pub const ENEMY_MAX_HEALTH: i32 = 3;

/// Base walking speed (units/s).
pub const ENEMY_SPEED: f64 = 2.0;

/// Collision radius of a unit.
pub const UNIT_COLLIDER_RADIUS: f64 = 0.25;

/// Squared distance at which a waypoint counts as reached.
pub const WAYPOINT_ARRIVAL_DISTANCE_SQ: f64 = 0.01;

/// Lateral offset range applied to a spawn position (± this value).
pub const SPAWN_JITTER: f64 = 1.5;

/// Duration of a knockback impulse (seconds).
pub const KNOCKBACK_DURATION_SECS: f64 = 0.1;

/// Neighbor-separation probe radius.
pub const SEPARATION_RADIUS: f64 = 0.35;

/// Strength of the separation nudge.
pub const SEPARATION_FORCE: f64 = 2.0;

/// Seconds a dead unit lingers before returning to its pool.
pub const CORPSE_LINGER_SECS: f64 = 2.5;

// --- Arrows ---

/// Seconds an arrow takes from launch to its target point.
pub const ARROW_TRAVEL_TIME_SECS: f64 = 0.6;

/// Peak height of the flight arc.
pub const ARROW_ARC_HEIGHT: f64 = 2.0;

/// Distinct units one arrow may hit before it stops.
pub const ARROW_MAX_PIERCE: u32 = 3;

/// In-flight hit test radius.
pub const ARROW_HIT_RADIUS: f64 = 0.3;

/// Blast radius of the terminal impact.
pub const ARROW_IMPACT_RADIUS: f64 = 1.5;

/// Damage per arrow hit.
pub const ARROW_DAMAGE: i32 = 1;

/// Knockback force of a direct arrow hit.
pub const ARROW_KNOCKBACK: f64 = 0.3;

// --- Towers ---

/// Targeting range (units).
pub const TOWER_RANGE: f64 = 5.0;

/// Shots per second.
pub const TOWER_FIRE_RATE: f64 = 1.0;

/// Seconds between forced target refreshes. Between refreshes the
/// cached target is reused unless the registry version moved.
pub const TOWER_RETARGET_INTERVAL_SECS: f64 = 0.15;

/// Radius of the random aim scatter around the target position.
pub const TOWER_AIM_SCATTER: f64 = 0.5;

// --- Status effects ---

/// Burn duration (seconds).
pub const BURN_DURATION_SECS: f64 = 3.0;

/// Damage per burn tick (applied through the pure-damage path).
pub const BURN_TICK_DAMAGE: i32 = 1;

/// Seconds between burn ticks.
pub const BURN_TICK_INTERVAL_SECS: f64 = 0.5;

/// Freeze duration (seconds).
pub const FREEZE_DURATION_SECS: f64 = 2.0;

/// Movement multiplier while frozen.
pub const FREEZE_SLOW_MULTIPLIER: f64 = 0.4;

// --- Pools ---

/// Enemy instances created eagerly at mission start.
pub const ENEMY_POOL_PREWARM: usize = 16;

/// Hard cap on enemy instances (active + free).
pub const ENEMY_POOL_MAX: usize = 128;

/// Arrow instances created eagerly at mission start.
pub const ARROW_POOL_PREWARM: usize = 16;

/// Visual-effect instances created eagerly at mission start.
pub const VFX_POOL_PREWARM: usize = 8;

/// Auto-return delay when an effect kind reports no authored duration
/// longer than this.
pub const VFX_FALLBACK_LIFETIME_SECS: f64 = 2.0;

// --- Waves ---

/// Ticks between consecutive spawns inside one wave.
pub const WAVE_SPACING_TICKS: u64 = 30;

/// Ticks between wave start times in the default mission.
pub const WAVE_INTERVAL_TICKS: u64 = 300;
