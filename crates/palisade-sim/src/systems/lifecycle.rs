//! Corpse lifecycle: dead units linger for a fixed visual delay, then
//! return to the enemy pool for reuse.

use hecs::{Entity, World};

use palisade_core::components::{Active, Corpse};

use crate::pool::EntityPool;
use crate::registry::EnemyRegistry;
use crate::systems::spawning;

pub fn run(
    world: &mut World,
    registry: &mut EnemyRegistry,
    enemy_pool: &mut EntityPool,
    scratch: &mut Vec<Entity>,
    dt: f64,
) {
    scratch.clear();
    for (entity, corpse) in world.query_mut::<&mut Corpse>().with::<&Active>() {
        corpse.remaining_secs -= dt;
        if corpse.remaining_secs <= 0.0 {
            scratch.push(entity);
        }
    }

    for i in 0..scratch.len() {
        spawning::deactivate_enemy(world, registry, enemy_pool, scratch[i]);
    }
}
