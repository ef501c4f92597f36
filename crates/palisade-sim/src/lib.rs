//! Simulation engine for PALISADE.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces GameStateSnapshots for the embedding layer.

pub mod engine;
pub mod pool;
pub mod registry;
pub mod spatial;
pub mod systems;
pub mod weapons;
pub mod world_setup;

pub use palisade_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
