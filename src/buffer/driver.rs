use super::engine::{BufferContext, buffer_feature};
use super::progress::ProgressObserver;
use crate::errors::{BufferError, IntegrityError};
use crate::feature::{Collection, FeatureId};
use crate::float_types::{DEFAULT_AREA_TOLERANCE, DEFAULT_BUFFER, Real};
use crate::overlap::{OverlapThresholds, classify_overlaps};
use crate::region::Region;
use crate::traits::RegionOps;
use geo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSettings {
    /// Outward buffer in coordinate units (degrees).
    pub distance: Real,
    /// Largest relative area loss tolerated when a feature is buffered.
    pub area_tolerance: Real,
    pub thresholds: OverlapThresholds,
}

impl Default for BufferSettings {
    fn default() -> Self {
        BufferSettings {
            distance: DEFAULT_BUFFER,
            area_tolerance: DEFAULT_AREA_TOLERANCE,
            thresholds: OverlapThresholds::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub id: FeatureId,
    pub label: String,
    pub area_before: Real,
    pub area_after: Real,
    pub conflicts: usize,
    pub preserved: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BufferReport {
    pub congress: u32,
    pub features: Vec<FeatureReport>,
    pub untouched: usize,
}

/// Buffers every feature of `collection` in handle order, except those in
/// `unmanipulated`.
///
/// Each feature is buffered against the collection as it stands when its
/// turn comes: features earlier in the order already hold their buffered
/// geometry, later ones their original one. Bounding boxes are frozen at the
/// start of the pass. A feature's result is committed only if it is valid and
/// kept at least `1 − area_tolerance` of the original area. After the pass
/// every geometry is repaired once more.
///
/// The first failure aborts the whole collection.
pub fn buffer_all(
    collection: &mut Collection,
    land: &Region,
    settings: &BufferSettings,
    unmanipulated: &BTreeSet<FeatureId>,
    observer: &dyn ProgressObserver,
) -> Result<BufferReport, BufferError> {
    let ids: Vec<FeatureId> = collection.ids().collect();
    let frozen_bounds: Vec<Option<Rect<Real>>> =
        collection.iter().map(|f| f.geometry.bounding_box()).collect();

    let mut report = BufferReport {
        congress: collection.congress,
        ..BufferReport::default()
    };
    observer.start(ids.len());
    for (position, &id) in ids.iter().enumerate() {
        if unmanipulated.contains(&id) {
            report.untouched += 1;
            continue;
        }
        let label = collection.label(id);
        observer.feature(position, &label);

        let original = collection.geometry(id);
        let mask = classify_overlaps(collection, id, original, &settings.thresholds)?;
        let context = BufferContext {
            collection: &*collection,
            frozen_bounds: &frozen_bounds,
            land,
            distance: settings.distance,
        };
        let buffered = buffer_feature(&context, id, &mask)?;

        let feature = || collection.feature(id).key.to_string();
        buffered
            .geometry
            .validate()
            .map_err(|source| IntegrityError::InvalidResult { feature: feature(), source })?;
        let area_before = original.area();
        let area_after = buffered.geometry.area();
        if area_after < (1.0 - settings.area_tolerance) * area_before {
            return Err(IntegrityError::AreaShrank {
                feature: feature(),
                before: area_before,
                after: area_after,
            }
            .into());
        }

        report.features.push(FeatureReport {
            id,
            label,
            area_before,
            area_after,
            conflicts: buffered.conflicts.len(),
            preserved: buffered.preserved,
        });
        collection.set_geometry(id, buffered.geometry);
    }
    observer.finish();

    for &id in &ids {
        let repaired = collection.geometry(id).repair()?;
        collection.set_geometry(id, repaired);
    }
    Ok(report)
}
