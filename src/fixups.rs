//! Hand-maintained corrections applied to a collection before buffering.
//!
//! A few historical districts are digitised past their state's border, or
//! overlap a sibling district where they should not. Each entry in the table
//! names the district term it corrects and is skipped when the congress being
//! processed does not contain that term.

use crate::errors::{IntegrityError, PipelineError, TopologyError};
use crate::feature::{Collection, DistrictKey, FeatureId};
use crate::float_types::MINIMUM_CLIP_RATIO;
use crate::region::Region;
use crate::traits::RegionOps;

/// Source of per-state reference outlines for [`Fixup::ClipToBoundary`].
pub trait ReferenceBoundaries {
    fn boundary(&self, state: &str) -> Result<Region, PipelineError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fixup {
    /// Replace the district with its intersection with the state outline.
    ClipToBoundary {
        state: &'static str,
        district: &'static str,
        start: &'static str,
        end: &'static str,
    },
    /// Remove from `trim` the area it shares with `keep`.
    ResolveOverlap {
        state: &'static str,
        keep: &'static str,
        trim: &'static str,
        start: &'static str,
        end: &'static str,
    },
}

pub const DEFAULT_FIXUPS: &[Fixup] = &[
    Fixup::ClipToBoundary { state: "Rhode Island", district: "1", start: "28", end: "42" },
    Fixup::ClipToBoundary { state: "Georgia", district: "9", start: "89", end: "92" },
    Fixup::ResolveOverlap { state: "New York", keep: "15", trim: "16", start: "53", end: "57" },
    Fixup::ResolveOverlap { state: "Tennessee", keep: "6", trim: "7", start: "95", end: "97" },
];

impl Fixup {
    /// Applies the correction. `Ok(false)` when the targeted term is absent.
    pub fn apply(
        &self,
        collection: &mut Collection,
        boundaries: &dyn ReferenceBoundaries,
    ) -> Result<bool, PipelineError> {
        match *self {
            Fixup::ClipToBoundary { state, district, start, end } => {
                let key = DistrictKey::new(state, district, start, end);
                let Some(id) = collection.find_unique(&key)? else {
                    return Ok(false);
                };
                let boundary = boundaries.boundary(state)?;
                clip_to_boundary(collection, id, &boundary)?;
                Ok(true)
            },
            Fixup::ResolveOverlap { state, keep, trim, start, end } => {
                let keep_id = collection.find_unique(&DistrictKey::new(state, keep, start, end))?;
                let trim_id = collection.find_unique(&DistrictKey::new(state, trim, start, end))?;
                let (Some(keep_id), Some(trim_id)) = (keep_id, trim_id) else {
                    return Ok(false);
                };
                resolve_overlap(collection, keep_id, trim_id)?;
                Ok(true)
            },
        }
    }
}

/// Applies every entry of `table` in order, returning how many took effect.
pub fn apply_fixups(
    collection: &mut Collection,
    table: &[Fixup],
    boundaries: &dyn ReferenceBoundaries,
) -> Result<usize, PipelineError> {
    let mut applied = 0;
    for fixup in table {
        if fixup.apply(collection, boundaries)? {
            tracing::info!(congress = collection.congress, ?fixup, "applied manual fixup");
            applied += 1;
        }
    }
    Ok(applied)
}

fn valid_or_repaired(region: Region) -> Result<Region, TopologyError> {
    if region.is_valid() { Ok(region) } else { region.repair() }
}

/// `geometry := geometry ∩ boundary`, keeping strictly between 90% and 100%
/// of the original area.
pub fn clip_to_boundary(
    collection: &mut Collection,
    id: FeatureId,
    boundary: &Region,
) -> Result<(), IntegrityError> {
    let original = collection.geometry(id);
    let clipped = original
        .try_repair_once(|g| g.intersection(boundary))
        .and_then(valid_or_repaired)
        .map_err(collection.repair_exhausted(id, "clip"))?;

    let kept = clipped.area();
    let before = original.area();
    if !(kept > MINIMUM_CLIP_RATIO * before && kept < before) {
        return Err(IntegrityError::ClipRatio {
            feature: collection.feature(id).key.to_string(),
            kept,
            original: before,
        });
    }
    collection.set_geometry(id, clipped);
    Ok(())
}

/// `trim := trim − (keep ∩ trim)`: the disputed area goes to `keep`.
pub fn resolve_overlap(
    collection: &mut Collection,
    keep: FeatureId,
    trim: FeatureId,
) -> Result<(), IntegrityError> {
    let kept = collection.geometry(keep);
    let trimmed = collection.geometry(trim);
    let overlap = kept
        .try_repair_once(|g| g.intersection(trimmed))
        .map_err(collection.repair_exhausted(trim, "overlap"))?;
    let remainder = trimmed
        .try_repair_once(|g| g.difference(&overlap))
        .and_then(valid_or_repaired)
        .map_err(collection.repair_exhausted(trim, "overlap"))?;
    collection.set_geometry(trim, remainder);
    Ok(())
}
