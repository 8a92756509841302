//! Expanding one district outward without claiming anyone else's ground.
//!
//! ## **Procedure**
//!
//! For a district `g`, buffer distance `b`, landmass `L`:
//!
//! 1. **Expand**: `e = simplify(buffer(g, b), b / 2)`
//! 2. **Stay off unclaimed land**: `e = e − ((L ∩ box(g)) − g)`. Land inside
//!    the district's own bounding box that the district did not already
//!    cover belongs to someone else (or to no district at all) and must not
//!    be claimed. Water is fair game.
//! 3. **Repair**: `e = buffer(e, 0)`
//! 4. **Find conflicts**: every other district whose frozen box overlaps
//!    `box(e)`, that is not a genuine overlap of `g`, and that `e` covers
//!    with positive area.
//! 5. **Subtract** each conflict in handle order.
//! 6. **Repair** once more.
//!
//! Every boolean step tolerates one engine refusal by repairing `e` and
//! retrying; a second refusal is a data-integrity failure because skipping
//! the step would leave an overlap behind.

use crate::aabb::optional_bounds_overlap;
use crate::errors::{IntegrityError, TopologyError};
use crate::feature::{Collection, FeatureId};
use crate::float_types::Real;
use crate::overlap::OverlapMask;
use crate::region::Region;
use crate::traits::RegionOps;
use geo::Rect;

/// Everything the engine reads while buffering one feature of a pass.
pub struct BufferContext<'a> {
    pub collection: &'a Collection,
    /// Boxes of every feature as they were when the pass started.
    pub frozen_bounds: &'a [Option<Rect<Real>>],
    pub land: &'a Region,
    pub distance: Real,
}

/// Outcome of buffering one feature.
#[derive(Clone, Debug)]
pub struct Buffered {
    pub geometry: Region,
    /// Neighbours subtracted from the expansion, in subtraction order.
    pub conflicts: Vec<FeatureId>,
    /// Genuine overlaps left untouched.
    pub preserved: usize,
}

/// The part of the landmass inside `geom`'s bounding box.
pub fn relevant_chunk_of_land(land: &Region, geom: &Region) -> Result<Region, TopologyError> {
    land.try_repair_once(|l| l.intersection(&geom.bounding_box_region()))
}

pub fn buffer_feature(
    ctx: &BufferContext<'_>,
    id: FeatureId,
    mask: &OverlapMask,
) -> Result<Buffered, IntegrityError> {
    let collection = ctx.collection;
    let geom = collection.geometry(id);
    let distance = ctx.distance;

    let expanded = geom
        .try_repair_once(|g| g.buffer(distance))
        .map_err(collection.repair_exhausted(id, "expand"))?
        .simplify(distance / 2.0);

    let unclaimed = relevant_chunk_of_land(ctx.land, geom)
        .and_then(|chunk| chunk.try_repair_once(|c| c.difference(geom)))
        .map_err(collection.repair_exhausted(id, "unclaimed land"))?;
    let expanded = expanded
        .try_repair_once(|e| e.difference(&unclaimed))
        .and_then(|e| e.repair())
        .map_err(collection.repair_exhausted(id, "land clip"))?;
    expanded.validate().map_err(|source| IntegrityError::InvalidResult {
        feature: collection.feature(id).key.to_string(),
        source,
    })?;

    let expanded_bounds = expanded.bounding_box();
    let mut conflicts = Vec::new();
    let mut preserved = 0;
    for other in collection.ids() {
        if other == id {
            continue;
        }
        let frozen = ctx.frozen_bounds[other.index()].as_ref();
        if !optional_bounds_overlap(expanded_bounds.as_ref(), frozen) {
            continue;
        }
        if mask.is_genuine(other) {
            preserved += 1;
            continue;
        }
        let neighbour = collection.geometry(other);
        if !expanded.safe_intersects(neighbour, true) {
            continue;
        }
        let covers = expanded
            .try_repair_once(|e| e.overlaps_with_area(neighbour))
            .map_err(collection.repair_exhausted(id, "conflict test"))?;
        if covers {
            conflicts.push(other);
        }
    }

    let mut resolved = expanded;
    for &other in &conflicts {
        let neighbour = collection.geometry(other);
        resolved = resolved
            .try_repair_once(|e| e.difference(neighbour))
            .map_err(collection.repair_exhausted(id, "subtract neighbour"))?;
    }

    let geometry = resolved
        .repair()
        .map_err(collection.repair_exhausted(id, "final repair"))?;
    tracing::debug!(
        feature = %collection.feature(id).key,
        conflicts = conflicts.len(),
        preserved,
        vertices = geometry.vertex_count(),
        "buffered feature"
    );
    Ok(Buffered { geometry, conflicts, preserved })
}
