//! District records and the per-congress collection that owns them.

use crate::errors::{IntegrityError, TopologyError};
use crate::float_types::Real;
use crate::region::Region;
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one district term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistrictKey {
    pub state_name: String,
    pub district: String,
    pub congress_start: String,
    pub congress_end: String,
}

impl DistrictKey {
    pub fn new(state_name: &str, district: &str, congress_start: &str, congress_end: &str) -> Self {
        DistrictKey {
            state_name: state_name.to_string(),
            district: district.to_string(),
            congress_start: congress_start.to_string(),
            congress_end: congress_end.to_string(),
        }
    }

    /// `"<state> <district>"`, the label shown while buffering.
    pub fn label(&self) -> String {
        format!("{} {}", self.state_name, self.district)
    }
}

impl fmt::Display for DistrictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}-{})",
            self.state_name, self.district, self.congress_start, self.congress_end
        )
    }
}

/// A record as it comes out of a feature source; the geometry may be absent.
#[derive(Clone, Debug)]
pub struct FeatureRecord {
    pub key: DistrictKey,
    pub geometry: Option<MultiPolygon<Real>>,
}

/// Stable handle of a feature inside its [`Collection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub usize);

impl FeatureId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub key: DistrictKey,
    pub geometry: Region,
}

/// All district terms of one congress.
///
/// Records without geometry are dropped when the collection is built; the
/// rest are numbered `0..len()` in source order and keep that handle for the
/// lifetime of the collection. Features are never inserted or removed
/// afterwards, only their geometry is replaced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Collection {
    pub congress: u32,
    features: Vec<Feature>,
}

impl Collection {
    pub fn from_records(congress: u32, records: Vec<FeatureRecord>) -> Self {
        let total = records.len();
        let features: Vec<Feature> = records
            .into_iter()
            .filter_map(|record| record.geometry.map(|geometry| (record.key, geometry)))
            .enumerate()
            .map(|(index, (key, geometry))| Feature {
                id: FeatureId(index),
                key,
                geometry: Region::new(geometry),
            })
            .collect();
        if features.len() < total {
            tracing::debug!(
                congress,
                dropped = total - features.len(),
                "dropped records without geometry"
            );
        }
        Collection { congress, features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.features.iter().map(|f| f.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn feature(&self, id: FeatureId) -> &Feature {
        &self.features[id.index()]
    }

    pub fn geometry(&self, id: FeatureId) -> &Region {
        &self.features[id.index()].geometry
    }

    pub fn set_geometry(&mut self, id: FeatureId, geometry: Region) {
        self.features[id.index()].geometry = geometry;
    }

    pub fn label(&self, id: FeatureId) -> String {
        self.features[id.index()].key.label()
    }

    /// Converts a second engine refusal on `id` into a data-integrity failure.
    pub fn repair_exhausted(
        &self,
        id: FeatureId,
        step: &'static str,
    ) -> impl FnOnce(TopologyError) -> IntegrityError + use<> {
        let feature = self.feature(id).key.to_string();
        move |source| IntegrityError::RepairExhausted { feature, step, source }
    }

    /// The single feature matching `key`, `None` if there is none.
    pub fn find_unique(&self, key: &DistrictKey) -> Result<Option<FeatureId>, IntegrityError> {
        let mut matches = self.features.iter().filter(|f| &f.key == key).map(|f| f.id);
        let first = matches.next();
        let rest = matches.count();
        if rest > 0 {
            return Err(IntegrityError::MultipleMatches {
                key: key.to_string(),
                count: rest + 1,
            });
        }
        Ok(first)
    }
}
