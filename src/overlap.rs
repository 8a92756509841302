//! Telling genuine district overlaps apart from touching neighbours.
//!
//! Some district terms legitimately share territory: an at-large seat drawn
//! over the same state as a numbered district, for instance. Those pairs must
//! keep their shared area through buffering. Every other pair of districts
//! merely touches, or overlaps by digitisation noise.
//!
//! The overlap of a pair is measured as
//! ```text
//! ratio = area(a ∩ b) / min(area(a), area(b))
//! ```
//! on the ellipsoid, in square metres. In the historical data this ratio is
//! bimodal: either well under 1% (slivers) or well over 50% (coextensive
//! districts). A ratio in between means something is wrong with the data or
//! the thresholds, so it is reported instead of guessed at.

use crate::errors::IntegrityError;
use crate::feature::{Collection, FeatureId};
use crate::float_types::{GENUINE_OVERLAP_RATIO, MINIMUM_CLASSIFIED_RATIO, Real};
use crate::region::Region;
use crate::traits::RegionOps;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapThresholds {
    /// Ratios above this are genuine overlaps.
    pub genuine: Real,
    /// Every genuine overlap must exceed this.
    pub minimum_classified: Real,
}

impl Default for OverlapThresholds {
    fn default() -> Self {
        OverlapThresholds {
            genuine: GENUINE_OVERLAP_RATIO,
            minimum_classified: MINIMUM_CLASSIFIED_RATIO,
        }
    }
}

/// Result of classifying one target against its collection.
#[derive(Clone, Debug, Default)]
pub struct OverlapMask {
    genuine: Vec<bool>,
    ratios: Vec<Option<Real>>,
}

impl OverlapMask {
    pub fn none(len: usize) -> Self {
        OverlapMask {
            genuine: vec![false; len],
            ratios: vec![None; len],
        }
    }

    #[inline]
    pub fn is_genuine(&self, id: FeatureId) -> bool {
        self.genuine[id.index()]
    }

    /// Overlap ratio, for pairs whose geometries intersect.
    pub fn ratio(&self, id: FeatureId) -> Option<Real> {
        self.ratios[id.index()]
    }

    pub fn genuine_ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.genuine
            .iter()
            .enumerate()
            .filter(|&(_, &g)| g)
            .map(|(i, _)| FeatureId(i))
    }
}

/// Intersects predicate against every other feature. Pairs the engine
/// refuses are counted as intersecting so a real conflict is never dropped.
#[cfg(not(feature = "parallel"))]
fn intersecting(collection: &Collection, target: FeatureId, geom: &Region) -> Vec<FeatureId> {
    collection
        .ids()
        .filter(|&id| id != target && geom.safe_intersects(collection.geometry(id), true))
        .collect()
}

#[cfg(feature = "parallel")]
fn intersecting(collection: &Collection, target: FeatureId, geom: &Region) -> Vec<FeatureId> {
    let ids: Vec<FeatureId> = collection.ids().collect();
    ids.into_par_iter()
        .filter(|&id| id != target && geom.safe_intersects(collection.geometry(id), true))
        .collect()
}

/// Marks which features of `collection` genuinely overlap `geom`, the
/// current geometry of `target`. The target itself is never marked.
pub fn classify_overlaps(
    collection: &Collection,
    target: FeatureId,
    geom: &Region,
    thresholds: &OverlapThresholds,
) -> Result<OverlapMask, IntegrityError> {
    let mut mask = OverlapMask::none(collection.len());
    let candidates = intersecting(collection, target, geom);
    if candidates.is_empty() {
        return Ok(mask);
    }

    let target_area = geom.equal_area();
    let mut classified = Vec::new();
    for id in candidates {
        let other = collection.geometry(id);
        let shared = geom
            .try_repair_once(|g| g.intersection(other))
            .map_err(collection.repair_exhausted(target, "overlap classification"))?;
        let smaller = other.equal_area().min(target_area);
        let ratio = if smaller > 0.0 { shared.equal_area() / smaller } else { 0.0 };

        mask.ratios[id.index()] = Some(ratio);
        if ratio > thresholds.genuine {
            mask.genuine[id.index()] = true;
            classified.push(ratio);
        }
    }

    let lowest = classified.iter().copied().fold(Real::INFINITY, Real::min);
    if lowest <= thresholds.minimum_classified {
        return Err(IntegrityError::AmbiguousOverlap {
            feature: collection.feature(target).key.to_string(),
            ratios: classified,
            minimum: thresholds.minimum_classified,
        });
    }

    tracing::trace!(
        feature = %collection.feature(target).key,
        genuine = classified.len(),
        "classified overlaps"
    );
    Ok(mask)
}
