use crate::errors::{TopologyError, ValidationError};
use crate::float_types::Real;
use geo::Rect;

/// Boolean operations, buffering and measurement on planar regions.
///
/// Every operation that can be refused by the polygon engine returns a
/// [`TopologyError`] instead of panicking, so callers decide between
/// repairing, falling back, or escalating.
pub trait RegionOps: Sized + Clone {
    fn empty() -> Self;
    fn is_empty(&self) -> bool;
    fn intersects(&self, other: &Self) -> Result<bool, TopologyError>;
    fn union(&self, other: &Self) -> Result<Self, TopologyError>;
    fn difference(&self, other: &Self) -> Result<Self, TopologyError>;
    fn intersection(&self, other: &Self) -> Result<Self, TopologyError>;
    /// Outward (positive) or inward (negative) offset. A zero distance
    /// rebuilds the region through the overlay engine instead, resolving
    /// self-intersections.
    fn buffer(&self, distance: Real) -> Result<Self, TopologyError>;
    fn simplify(&self, tolerance: Real) -> Self;
    /// Planar area in coordinate units.
    fn area(&self) -> Real;
    /// Area in square metres on the WGS84 ellipsoid.
    fn equal_area(&self) -> Real;
    fn bounding_box(&self) -> Option<Rect<Real>>;
    fn validate(&self) -> Result<(), ValidationError>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Zero-width buffer repair.
    fn repair(&self) -> Result<Self, TopologyError> {
        self.buffer(0.0)
    }

    /// `intersects`, answering `fallback` when the engine refuses the pair.
    fn safe_intersects(&self, other: &Self, fallback: bool) -> bool {
        self.intersects(other).unwrap_or(fallback)
    }

    /// Intersection with positive area.
    fn overlaps_with_area(&self, other: &Self) -> Result<bool, TopologyError> {
        Ok(self.intersection(other)?.area() > crate::float_types::tolerance())
    }

    /// Runs `op` on `self`; when the engine refuses, repairs `self` once and
    /// runs `op` on the repaired region. A second refusal is returned as is.
    fn try_repair_once<T, F>(&self, op: F) -> Result<T, TopologyError>
    where
        F: Fn(&Self) -> Result<T, TopologyError>,
    {
        match op(self) {
            Ok(value) => Ok(value),
            Err(first) => {
                tracing::warn!(error = %first, "geometry engine refused operand, repairing and retrying");
                let repaired = self.repair()?;
                op(&repaired)
            },
        }
    }
}
