use super::Region;
use crate::aabb::box_polygon;
use crate::float_types::Real;
use crate::traits::RegionOps;
use geo::{Rect, coord};

impl Region {
    /// Axis-aligned rectangle spanning `(x0, y0)`–`(x1, y1)`.
    pub fn rectangle(x0: Real, y0: Real, x1: Real, y1: Real) -> Region {
        Region::from_rect(&Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }))
    }

    pub fn from_rect(rect: &Rect<Real>) -> Region {
        Region::from_polygon(box_polygon(rect))
    }

    /// The box spanning this region, or an empty region.
    pub fn bounding_box_region(&self) -> Region {
        self.bounding_box()
            .map(|rect| Region::from_rect(&rect))
            .unwrap_or_else(Region::empty)
    }
}
