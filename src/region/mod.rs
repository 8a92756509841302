//! `Region` struct and implementations of the `RegionOps` trait for `Region`

use crate::errors::{TopologyError, ValidationError};
use crate::float_types::Real;
use crate::traits::RegionOps;
use geo::orient::{Direction, Orient};
use geo::{
    Area, BooleanOps, BoundingRect, GeodesicArea, Intersects, LineString, MultiPolygon, Polygon,
    Rect, Simplify,
};
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::OnceLock;

pub mod offset;
pub mod shapes;
pub mod validation;

/// A planar region: zero or more polygons with holes, in longitude/latitude.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "MultiPolygon<Real>", into = "MultiPolygon<Real>")]
pub struct Region {
    polygons: MultiPolygon<Real>,

    /// Lazily calculated box that spans `polygons`; `None` when empty.
    bounding_box: OnceLock<Option<Rect<Real>>>,

    /// Lazily calculated validity.
    validity: OnceLock<Result<(), ValidationError>>,
}

impl Region {
    /// Wrap `polygons`, orienting exteriors counter-clockwise and holes clockwise.
    pub fn new(polygons: MultiPolygon<Real>) -> Self {
        Region {
            polygons: polygons.orient(Direction::Default),
            bounding_box: OnceLock::new(),
            validity: OnceLock::new(),
        }
    }

    pub fn from_polygon(polygon: Polygon<Real>) -> Self {
        Region::new(MultiPolygon::new(vec![polygon]))
    }

    pub const fn multi_polygon(&self) -> &MultiPolygon<Real> {
        &self.polygons
    }

    pub fn into_multi_polygon(self) -> MultiPolygon<Real> {
        self.polygons
    }

    pub fn vertex_count(&self) -> usize {
        use geo::CoordsIter;
        self.polygons.coords_count()
    }

    fn check_operands(
        &self,
        other: &Region,
        op: &'static str,
    ) -> Result<(), TopologyError> {
        self.validate()
            .and_then(|()| other.validate())
            .map_err(|source| TopologyError::InvalidOperand { op, source })
    }
}

impl From<MultiPolygon<Real>> for Region {
    fn from(polygons: MultiPolygon<Real>) -> Self {
        Region::new(polygons)
    }
}

impl From<Region> for MultiPolygon<Real> {
    fn from(region: Region) -> Self {
        region.polygons
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.polygons == other.polygons
    }
}

/// Run one call into the polygon engines, turning an abort into a
/// [`TopologyError`]. Both `geo-buf` and the overlay engine assert on
/// inputs they cannot handle.
pub(crate) fn engine_guard<T>(
    op: &'static str,
    f: impl FnOnce() -> T,
) -> Result<T, TopologyError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        TopologyError::EngineAbort { op, message }
    })
}

/// Rings with fewer than four coordinates are dropped; a polygon whose shell
/// collapses disappears entirely.
fn drop_collapsed_rings(multi: MultiPolygon<Real>) -> MultiPolygon<Real> {
    let keep = |ring: &LineString<Real>| ring.0.len() >= 4;
    MultiPolygon::new(
        multi
            .into_iter()
            .filter(|polygon| keep(polygon.exterior()))
            .map(|polygon| {
                let (exterior, interiors) = polygon.into_inner();
                Polygon::new(exterior, interiors.into_iter().filter(keep).collect())
            })
            .collect(),
    )
}

impl RegionOps for Region {
    fn empty() -> Self {
        Region::new(MultiPolygon::new(Vec::new()))
    }

    fn is_empty(&self) -> bool {
        self.polygons.0.iter().all(|p| p.exterior().0.is_empty())
    }

    fn intersects(&self, other: &Region) -> Result<bool, TopologyError> {
        if self.is_empty() || other.is_empty() {
            return Ok(false);
        }
        self.check_operands(other, "intersects")?;
        engine_guard("intersects", || self.polygons.intersects(&other.polygons))
    }

    fn union(&self, other: &Region) -> Result<Region, TopologyError> {
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }
        self.check_operands(other, "union")?;
        engine_guard("union", || self.polygons.union(&other.polygons)).map(Region::new)
    }

    fn difference(&self, other: &Region) -> Result<Region, TopologyError> {
        if self.is_empty() || other.is_empty() {
            return Ok(self.clone());
        }
        self.check_operands(other, "difference")?;
        engine_guard("difference", || self.polygons.difference(&other.polygons))
            .map(Region::new)
    }

    fn intersection(&self, other: &Region) -> Result<Region, TopologyError> {
        if self.is_empty() || other.is_empty() {
            return Ok(Region::empty());
        }
        self.check_operands(other, "intersection")?;
        engine_guard("intersection", || self.polygons.intersection(&other.polygons))
            .map(Region::new)
    }

    fn buffer(&self, distance: Real) -> Result<Region, TopologyError> {
        self.offset(distance)
    }

    fn simplify(&self, tolerance: Real) -> Region {
        Region::new(drop_collapsed_rings(self.polygons.simplify(&tolerance)))
    }

    fn area(&self) -> Real {
        self.polygons.unsigned_area()
    }

    fn equal_area(&self) -> Real {
        self.polygons.geodesic_area_unsigned()
    }

    fn bounding_box(&self) -> Option<Rect<Real>> {
        *self.bounding_box.get_or_init(|| self.polygons.bounding_rect())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.validity
            .get_or_init(|| validation::validate_multi_polygon(&self.polygons))
            .clone()
    }
}
