//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for
//! read-only). They do not own state — all state lives in components
//! or in the context objects the engine passes in.

pub mod arrows;
pub mod combat;
pub mod lifecycle;
pub mod movement;
pub mod snapshot;
pub mod spawning;
pub mod status;
pub mod towers;
pub mod vfx;
