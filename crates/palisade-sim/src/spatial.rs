//! Spatial overlap queries.
//!
//! The simulation does not own a spatial index; it consumes overlap
//! queries through this seam so an embedding engine can supply its own
//! (variable-cost, resource-bounded) implementation. `OverlapScan` is
//! the reference implementation: a linear sweep over enabled colliders.

use hecs::{Entity, World};

use palisade_core::components::{Active, Collider, LayerMask};
use palisade_core::types::Position;

/// Overlap query over combat-relevant entities.
pub trait SpatialQuery {
    /// Collect entities whose collider overlaps the circle at `center`
    /// with `radius`, filtered by layer mask, into `out` (cleared first).
    fn query(
        &self,
        world: &World,
        center: Position,
        radius: f64,
        mask: LayerMask,
        out: &mut Vec<Entity>,
    );
}

/// Linear scan over all active, enabled colliders.
#[derive(Debug, Default)]
pub struct OverlapScan;

impl SpatialQuery for OverlapScan {
    fn query(
        &self,
        world: &World,
        center: Position,
        radius: f64,
        mask: LayerMask,
        out: &mut Vec<Entity>,
    ) {
        out.clear();

        for (entity, (collider, position)) in
            world.query::<(&Collider, &Position)>().with::<&Active>().iter()
        {
            if !collider.enabled || !mask.intersects(collider.layer) {
                continue;
            }
            let reach = radius + collider.radius;
            if center.distance_squared_to(position) <= reach * reach {
                out.push(entity);
            }
        }
    }
}
