//! Simple-feature validity for district polygons.
//!
//! A region is valid when every ring is closed, has at least three distinct
//! vertices, holds only finite coordinates and does not cross itself, and
//! every hole lies inside its shell. A ring may touch itself at a shared
//! vertex without crossing: the overlay engine writes a hole that meets its
//! shell at one point as such a pinched ring. Overlap *between* the
//! polygons of one multipolygon is not checked: the overlay engine never
//! produces it and source data is repaired before buffering.

use crate::errors::ValidationError;
use crate::float_types::Real;
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Contains, Coord, Line, LineString, MultiPolygon, Polygon};
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

pub fn validate_multi_polygon(multi: &MultiPolygon<Real>) -> Result<(), ValidationError> {
    multi.iter().try_for_each(validate_polygon)
}

pub fn validate_polygon(polygon: &Polygon<Real>) -> Result<(), ValidationError> {
    validate_ring(polygon.exterior())?;
    if polygon.interiors().is_empty() {
        return Ok(());
    }

    let shell = Polygon::new(polygon.exterior().clone(), vec![]);
    for hole in polygon.interiors() {
        validate_ring(hole)?;
        if hole.0.is_empty() {
            continue;
        }
        if !shell.contains(&Polygon::new(hole.clone(), vec![])) {
            return Err(ValidationError::HoleOutsideShell(hole.0[0]));
        }
    }
    Ok(())
}

/// Empty rings are accepted: they stand for an empty polygon.
pub fn validate_ring(ring: &LineString<Real>) -> Result<(), ValidationError> {
    let coords = &ring.0;
    let (Some(&first), Some(&last)) = (coords.first(), coords.last()) else {
        return Ok(());
    };

    if let Some(bad) = coords.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(ValidationError::InvalidCoordinate(*bad));
    }
    if first != last {
        return Err(ValidationError::RingNotClosed { first, last });
    }

    let vertices = without_repeats(coords);
    if vertices.len() < 4 {
        return Err(ValidationError::TooFewPoints(first));
    }

    match find_self_intersection(&vertices) {
        Some(at) => Err(ValidationError::RingSelfIntersection(at)),
        None => Ok(()),
    }
}

fn without_repeats(coords: &[Coord<Real>]) -> Vec<Coord<Real>> {
    let mut vertices: Vec<Coord<Real>> = Vec::with_capacity(coords.len());
    for &c in coords {
        if vertices.last() != Some(&c) {
            vertices.push(c);
        }
    }
    vertices
}

#[inline]
fn vertex_key(c: Coord<Real>) -> (u64, u64) {
    (c.x.to_bits(), c.y.to_bits())
}

/// Whether the ring passes through some vertex more than once.
pub fn is_pinched(ring: &LineString<Real>) -> bool {
    let vertices = without_repeats(&ring.0);
    let Some((_, open)) = vertices.split_last() else {
        return false;
    };
    let mut seen = HashSet::with_capacity(open.len());
    !open.iter().all(|&c| seen.insert(vertex_key(c)))
}

/// Splits a closed ring at every vertex it passes through more than once,
/// giving simple closed loops in traversal direction. Loops that collapse
/// to fewer than three distinct vertices are dropped.
pub fn split_pinches(ring: &LineString<Real>) -> Vec<LineString<Real>> {
    let vertices = without_repeats(&ring.0);
    let Some((_, open)) = vertices.split_last() else {
        return Vec::new();
    };

    let mut loops = Vec::new();
    let mut path: Vec<Coord<Real>> = Vec::with_capacity(open.len() + 1);
    let mut on_path: HashMap<(u64, u64), usize> = HashMap::new();
    for &c in open {
        match on_path.get(&vertex_key(c)) {
            Some(&start) => {
                let mut lobe = Vec::with_capacity(path.len() - start + 1);
                lobe.push(c);
                lobe.extend(path.drain(start + 1..));
                for v in &lobe[1..] {
                    on_path.remove(&vertex_key(*v));
                }
                lobe.push(c);
                if lobe.len() >= 4 {
                    loops.push(LineString::new(lobe));
                }
            },
            None => {
                on_path.insert(vertex_key(c), path.len());
                path.push(c);
            },
        }
    }
    if let Some(&first) = path.first() {
        path.push(first);
        if path.len() >= 4 {
            loops.push(LineString::new(path));
        }
    }
    loops
}

/// The vertices before and after `at` along the ring, where `at` is an end
/// of segment `k`. `None` when `at` lies inside the segment.
fn pass_through(
    vertices: &[Coord<Real>],
    k: usize,
    at: Coord<Real>,
) -> Option<(Coord<Real>, Coord<Real>)> {
    let n = vertices.len() - 1;
    if vertices[k + 1] == at {
        Some((vertices[k], vertices[(k + 1) % n + 1]))
    } else if vertices[k] == at {
        Some((vertices[(k + n - 1) % n], vertices[k + 1]))
    } else {
        None
    }
}

/// Two passes of a ring through the same vertex cross when the second one
/// enters on one side of the first and leaves on the other.
fn passes_cross(
    at: Coord<Real>,
    first: (Coord<Real>, Coord<Real>),
    second: (Coord<Real>, Coord<Real>),
) -> bool {
    let angle = |c: Coord<Real>| (c.y - at.y).atan2(c.x - at.x);
    let turn = |from: Real, to: Real| (to - from).rem_euclid(TAU);
    let start = angle(first.0);
    let span = turn(start, angle(first.1));
    let between = |c: Coord<Real>| {
        let t = turn(start, angle(c));
        t > 0.0 && t < span
    };
    between(second.0) != between(second.1)
}

#[inline]
fn min_x(line: &Line<Real>) -> Real {
    line.start.x.min(line.end.x)
}

#[inline]
fn max_x(line: &Line<Real>) -> Real {
    line.start.x.max(line.end.x)
}

/// Sweep over segments sorted by their left end. `vertices` is a closed ring
/// without consecutive duplicates.
fn find_self_intersection(vertices: &[Coord<Real>]) -> Option<Coord<Real>> {
    let segments: Vec<Line<Real>> = vertices.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let n = segments.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| min_x(&segments[a]).total_cmp(&min_x(&segments[b])));

    for (position, &i) in order.iter().enumerate() {
        let reach = max_x(&segments[i]);
        for &j in &order[position + 1..] {
            if min_x(&segments[j]) > reach {
                break;
            }
            let gap = i.abs_diff(j);
            let adjacent = gap == 1 || gap == n - 1;
            let at = match line_intersection(segments[i], segments[j]) {
                None => continue,
                Some(LineIntersection::SinglePoint { intersection, .. }) => intersection,
                // segments may share an endpoint, never a stretch
                Some(LineIntersection::Collinear { intersection }) => {
                    if intersection.start != intersection.end {
                        return Some(intersection.start);
                    }
                    intersection.start
                },
            };
            if adjacent {
                continue;
            }
            let touch = pass_through(vertices, i, at)
                .zip(pass_through(vertices, j, at))
                .is_some_and(|(a, b)| !passes_cross(at, a, b));
            if !touch {
                return Some(at);
            }
        }
    }
    None
}
