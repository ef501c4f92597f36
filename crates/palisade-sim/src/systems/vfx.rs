//! Pooled one-shot visual effects with fallback-lifetime auto-return.
//!
//! The release delay is the longer of the kind's authored playback
//! duration and a configured fallback constant, so an instance whose
//! natural completion signal never fires cannot leak out of the pool.

use hecs::{Entity, World};

use palisade_core::components::{Active, VisualEffect};
use palisade_core::constants::VFX_FALLBACK_LIFETIME_SECS;
use palisade_core::enums::VfxKind;
use palisade_core::types::Position;

use crate::pool::EntityPool;
use crate::world_setup;

/// Authored playback duration per effect kind (seconds).
fn authored_duration(kind: VfxKind) -> f64 {
    match kind {
        VfxKind::ImpactDust => 0.45,
        VfxKind::BloodSplash => 2.6,
    }
}

/// Acquire an effect instance at `position` and arm its auto-return.
pub fn spawn(
    world: &mut World,
    vfx_pool: &mut EntityPool,
    kind: VfxKind,
    position: Position,
) -> Option<Entity> {
    let entity = vfx_pool.acquire(world, world_setup::create_vfx)?;

    let lifetime = authored_duration(kind).max(VFX_FALLBACK_LIFETIME_SECS);
    if let Ok(mut effect) = world.get::<&mut VisualEffect>(entity) {
        effect.kind = kind;
        effect.remaining_secs = lifetime;
    }
    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        *pos = position;
    }

    Some(entity)
}

/// Count down every live effect and release the expired ones.
pub fn run(world: &mut World, vfx_pool: &mut EntityPool, scratch: &mut Vec<Entity>, dt: f64) {
    scratch.clear();
    for (entity, effect) in world.query_mut::<&mut VisualEffect>().with::<&Active>() {
        effect.remaining_secs -= dt;
        if effect.remaining_secs <= 0.0 {
            scratch.push(entity);
        }
    }

    for i in 0..scratch.len() {
        let _ = vfx_pool.release(world, scratch[i]);
    }
}
