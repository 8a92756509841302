//! **Region Offsetting (Buffering)**
//!
//! For a region P and disk D of radius r the outward offset is the Minkowski
//! sum
//! ```text
//! P ⊕ D = {p + d | p ∈ P, d ∈ D}
//! ```
//! Straight edges move parallel by r, convex vertices sweep a circular arc of
//! radius r. Offsetting is done by `geo-buf`'s straight-skeleton
//! implementation with rounded joins.
//!
//! A zero distance does not go through `geo-buf`. It is the classic
//! "zero-width buffer" repair: the region is rebuilt through the overlay
//! engine, which re-traces its outline and so removes self-intersections and
//! degenerate rings.
//!
//! A region with pinched rings (a ring passing through one vertex twice) is
//! split into simple loops first and offset loop by loop. For a polygon with
//! outer loops `S`, hole loops `H` and islands `I` inside its holes:
//! ```text
//! offset(P, r) = (∪ offset(S, r) − ∪ offset(H, −r)) ∪ ∪ offset(I, r)
//! ```
//! so `geo-buf` only ever sees simple rings.

use super::validation::{is_pinched, split_pinches};
use super::{Region, engine_guard};
use crate::errors::TopologyError;
use crate::float_types::Real;
use crate::traits::RegionOps;
use geo::{Area, BooleanOps, LineString, MultiPolygon, Polygon};
use geo_buf::buffer_multi_polygon_rounded;

impl Region {
    pub(super) fn offset(&self, distance: Real) -> Result<Region, TopologyError> {
        if self.is_empty() {
            return Ok(Region::empty());
        }
        if distance == 0.0 {
            return self.rebuild();
        }

        self.validate()
            .map_err(|source| TopologyError::InvalidOperand { op: "buffer", source })?;
        let pinched = self
            .polygons
            .iter()
            .any(|p| is_pinched(p.exterior()) || p.interiors().iter().any(is_pinched));
        if pinched {
            return self.offset_by_loops(distance);
        }
        let offset = engine_guard("buffer", || {
            buffer_multi_polygon_rounded(self.multi_polygon(), distance)
        })?;
        Ok(Region::new(offset))
    }

    fn offset_by_loops(&self, distance: Real) -> Result<Region, TopologyError> {
        let mut result = Region::empty();
        for polygon in self.polygons.iter() {
            let mut outer = Region::empty();
            let mut holes = Region::empty();
            let mut islands = Region::empty();
            for ring in split_pinches(polygon.exterior()) {
                let Some((piece, solid)) = loop_piece(ring) else {
                    continue;
                };
                if solid {
                    outer = outer.union(&piece.offset(distance)?)?;
                } else {
                    holes = holes.union(&piece.offset(-distance)?)?;
                }
            }
            for ring in polygon.interiors().iter().flat_map(split_pinches) {
                let Some((piece, solid)) = loop_piece(ring) else {
                    continue;
                };
                if solid {
                    islands = islands.union(&piece.offset(distance)?)?;
                } else {
                    holes = holes.union(&piece.offset(-distance)?)?;
                }
            }
            result = result.union(&outer.difference(&holes)?)?.union(&islands)?;
        }
        Ok(result)
    }

    /// Self-union through the overlay engine.
    fn rebuild(&self) -> Result<Region, TopologyError> {
        let nothing = MultiPolygon::<Real>::new(Vec::new());
        let rebuilt = engine_guard("repair", || self.multi_polygon().union(&nothing))?;
        Ok(Region::new(rebuilt))
    }
}

/// A simple loop as a region of its own, and whether it ran
/// counter-clockwise in the ring it came from. Flat loops are `None`.
fn loop_piece(ring: LineString<Real>) -> Option<(Region, bool)> {
    let polygon = Polygon::new(ring, vec![]);
    let signed = polygon.signed_area();
    (signed != 0.0).then(|| (Region::from_polygon(polygon), signed > 0.0))
}
