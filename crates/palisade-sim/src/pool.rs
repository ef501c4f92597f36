//! Reusable-instance pools for enemies, arrows, and visual effects.
//!
//! A pooled entity is either active (owned by gameplay, carries the
//! `Active` marker) or free (parked, marker removed) — never both. The
//! free list is a LIFO stack, so an instance released and immediately
//! re-acquired is the same instance.

use std::collections::HashSet;

use hecs::{Entity, World};

use palisade_core::components::Active;

/// Growth policy for one pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Instances created eagerly at mission start.
    pub prewarm: usize,
    /// Creation bound on active + free instances; `None` grows
    /// unbounded.
    pub max_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            prewarm: 0,
            max_size: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct EntityPool {
    free: Vec<Entity>,
    active: HashSet<Entity>,
    created: usize,
    max_size: Option<usize>,
}

impl EntityPool {
    pub fn new(max_size: Option<usize>) -> Self {
        Self {
            free: Vec::new(),
            active: HashSet::new(),
            created: 0,
            max_size,
        }
    }

    /// Eagerly create up to `count` free instances, respecting the bound.
    pub fn prewarm(
        &mut self,
        world: &mut World,
        count: usize,
        mut create: impl FnMut(&mut World) -> Entity,
    ) {
        for _ in 0..count {
            if self.at_capacity() {
                break;
            }
            let entity = create(world);
            self.created += 1;
            self.free.push(entity);
        }
    }

    /// Hand out an instance: pop the free list, or create a new one up
    /// to the bound. Returns `None` when a bounded pool is exhausted —
    /// an expected outcome the caller handles, not a fault.
    pub fn acquire(
        &mut self,
        world: &mut World,
        create: impl FnOnce(&mut World) -> Entity,
    ) -> Option<Entity> {
        let entity = loop {
            match self.free.pop() {
                Some(entity) if world.contains(entity) => break entity,
                Some(_) => {
                    // Entity destroyed behind the pool's back; drop the
                    // stale entry and free its slot in the bound.
                    self.created = self.created.saturating_sub(1);
                }
                None => {
                    if self.at_capacity() {
                        return None;
                    }
                    let entity = create(world);
                    self.created += 1;
                    break entity;
                }
            }
        };

        let _ = self.active.insert(entity);
        let _ = world.insert_one(entity, Active);
        Some(entity)
    }

    /// Park an instance back on the free list. Guarded no-op unless the
    /// instance is currently tracked as active, so a double release
    /// cannot corrupt the free list.
    pub fn release(&mut self, world: &mut World, entity: Entity) -> bool {
        if !self.active.remove(&entity) {
            return false;
        }
        let _ = world.remove_one::<Active>(entity);
        self.free.push(entity);
        true
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    fn at_capacity(&self) -> bool {
        self.max_size.is_some_and(|max| self.created >= max)
    }
}
