use crate::float_types::Real;
use geo::{Polygon, Rect};

/// Two boxes overlap unless one lies strictly left, right, above or below
/// the other. Touching edges and corners count as overlap.
#[inline]
pub fn bounds_overlap(a: &Rect<Real>, b: &Rect<Real>) -> bool {
    let x_overlaps = !(a.max().x < b.min().x || b.max().x < a.min().x);
    let y_overlaps = !(a.max().y < b.min().y || b.max().y < a.min().y);
    x_overlaps && y_overlaps
}

/// Same as [`bounds_overlap`], with an absent (empty geometry) box never overlapping.
#[inline]
pub fn optional_bounds_overlap(a: Option<&Rect<Real>>, b: Option<&Rect<Real>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => bounds_overlap(a, b),
        _ => false,
    }
}

#[inline]
pub fn box_polygon(rect: &Rect<Real>) -> Polygon<Real> {
    rect.to_polygon()
}
