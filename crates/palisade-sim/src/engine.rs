//! Simulation engine — the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, the enemy registry, the
//! object pools, processes player commands, runs all systems, and
//! produces `GameStateSnapshot`s. Completely headless, enabling
//! deterministic testing.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use palisade_core::commands::PlayerCommand;
use palisade_core::constants::{
    ARROW_POOL_PREWARM, DT, ENEMY_POOL_MAX, ENEMY_POOL_PREWARM, VFX_POOL_PREWARM,
};
use palisade_core::enums::GamePhase;
use palisade_core::events::GameEvent;
use palisade_core::state::GameStateSnapshot;
use palisade_core::types::SimTime;

use crate::pool::{EntityPool, PoolConfig};
use crate::registry::EnemyRegistry;
use crate::spatial::OverlapScan;
use crate::systems;
use crate::systems::spawning::WaveSchedule;
use crate::world_setup::{self, PathSet};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    /// Enemy pool policy (bounded by default).
    pub enemy_pool: PoolConfig,
    /// Arrow pool policy (unbounded by default).
    pub arrow_pool: PoolConfig,
    /// Visual-effect pool policy (unbounded by default).
    pub vfx_pool: PoolConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            enemy_pool: PoolConfig {
                prewarm: ENEMY_POOL_PREWARM,
                max_size: Some(ENEMY_POOL_MAX),
            },
            arrow_pool: PoolConfig {
                prewarm: ARROW_POOL_PREWARM,
                max_size: None,
            },
            vfx_pool: PoolConfig {
                prewarm: VFX_POOL_PREWARM,
                max_size: None,
            },
        }
    }
}

/// Running score tracked by the engine.
#[derive(Debug, Clone, Default)]
pub struct ScoreState {
    pub enemies_killed: u32,
    pub enemies_leaked: u32,
    pub enemies_total: u32,
    pub arrows_fired: u32,
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    config: SimConfig,
    world: World,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    events: Vec<GameEvent>,

    registry: EnemyRegistry,
    enemy_pool: EntityPool,
    arrow_pool: EntityPool,
    vfx_pool: EntityPool,
    spatial: OverlapScan,
    paths: PathSet,
    schedule: WaveSchedule,
    score: ScoreState,

    // Scratch buffers reused across ticks to avoid per-tick allocation.
    scratch: Vec<Entity>,
    overlap_buffer: Vec<Entity>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        let time_scale = config.time_scale;
        let seed = config.seed;
        Self {
            config,
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale,
            rng: ChaCha8Rng::seed_from_u64(seed),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            registry: EnemyRegistry::new(),
            enemy_pool: EntityPool::new(None),
            arrow_pool: EntityPool::new(None),
            vfx_pool: EntityPool::new(None),
            spatial: OverlapScan,
            paths: PathSet::default(),
            schedule: WaveSchedule::default(),
            score: ScoreState::default(),
            scratch: Vec::new(),
            overlap_buffer: Vec::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            events,
            &self.score,
            self.registry.version(),
        )
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get a read-only reference to the enemy registry.
    pub fn registry(&self) -> &EnemyRegistry {
        &self.registry
    }

    /// Get a read-only reference to the score state.
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    /// Get a read-only reference to the enemy pool.
    #[cfg(test)]
    pub fn enemy_pool(&self) -> &EntityPool {
        &self.enemy_pool
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartMission => {
                if matches!(self.phase, GamePhase::Setup | GamePhase::Complete) {
                    self.start_mission();
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 4.0);
            }
        }
    }

    /// Reset world, registry, pools, schedule, and score for a fresh
    /// mission, then go active.
    fn start_mission(&mut self) {
        self.world = World::new();
        self.registry.clear();
        self.events.clear();

        self.enemy_pool = EntityPool::new(self.config.enemy_pool.max_size);
        self.enemy_pool.prewarm(
            &mut self.world,
            self.config.enemy_pool.prewarm,
            world_setup::create_enemy,
        );
        self.arrow_pool = EntityPool::new(self.config.arrow_pool.max_size);
        self.arrow_pool.prewarm(
            &mut self.world,
            self.config.arrow_pool.prewarm,
            world_setup::create_arrow,
        );
        self.vfx_pool = EntityPool::new(self.config.vfx_pool.max_size);
        self.vfx_pool.prewarm(
            &mut self.world,
            self.config.vfx_pool.prewarm,
            world_setup::create_vfx,
        );

        self.paths = world_setup::default_paths();
        world_setup::setup_mission(&mut self.world);

        self.schedule = WaveSchedule::default_mission();
        self.score = ScoreState {
            enemies_total: self.schedule.total_enemies(),
            ..ScoreState::default()
        };

        self.phase = GamePhase::Active;
        self.time = SimTime::default();
    }

    /// Run all systems in order. Registry mutations inside each system
    /// are visible to every later system in the same tick.
    fn run_systems(&mut self) {
        // 1. Wave spawning (registrations land before any query below)
        systems::spawning::run(
            &mut self.world,
            &mut self.registry,
            &self.paths,
            &mut self.enemy_pool,
            &mut self.schedule,
            &mut self.rng,
            &mut self.events,
            self.time.tick,
        );
        // 2. Status effects (burn ticks, freeze expiry)
        systems::status::run(
            &mut self.world,
            &mut self.registry,
            &mut self.vfx_pool,
            &mut self.events,
            &mut self.score,
            DT,
        );
        // 3. Movement (knockback, waypoints, goal leaks)
        systems::movement::run(
            &mut self.world,
            &mut self.registry,
            &self.paths,
            &self.spatial,
            &mut self.enemy_pool,
            &mut self.events,
            &mut self.score,
            &mut self.overlap_buffer,
            DT,
        );
        // 4. Towers (target caching, arrow launches)
        systems::towers::run(
            &mut self.world,
            &mut self.registry,
            &mut self.arrow_pool,
            &mut self.rng,
            &mut self.events,
            &mut self.score,
            DT,
        );
        // 5. Arrows (flight, pierce, blast)
        systems::arrows::run(
            &mut self.world,
            &mut self.registry,
            &self.spatial,
            &mut self.arrow_pool,
            &mut self.vfx_pool,
            &mut self.events,
            &mut self.score,
            &mut self.scratch,
            &mut self.overlap_buffer,
            DT,
        );
        // 6. Corpse lifecycle (return to pool after the visual delay)
        systems::lifecycle::run(
            &mut self.world,
            &mut self.registry,
            &mut self.enemy_pool,
            &mut self.scratch,
            DT,
        );
        // 7. Visual effect auto-return
        systems::vfx::run(&mut self.world, &mut self.vfx_pool, &mut self.scratch, DT);

        // Mission completion: every scheduled enemy resolved.
        if self.score.enemies_total > 0
            && self.score.enemies_killed + self.score.enemies_leaked >= self.score.enemies_total
        {
            self.phase = GamePhase::Complete;
            self.events.push(GameEvent::MissionComplete {
                killed: self.score.enemies_killed,
                leaked: self.score.enemies_leaked,
            });
        }
    }
}
