//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use unclipped_districts::{
    Collection, DistrictKey, FeatureId, Region, RegionOps,
    feature::FeatureRecord,
    float_types::Real,
};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Slack for areas that went through the overlay engine, which snaps
/// coordinates to an integer grid.
pub const AREA_EPS: Real = 1e-5;

pub fn record(state: &str, district: &str, congress: &str, region: Region) -> FeatureRecord {
    FeatureRecord {
        key: DistrictKey::new(state, district, congress, congress),
        geometry: Some(region.into_multi_polygon()),
    }
}

/// Collection of `congress` with one district per region, numbered from 1.
pub fn collection(congress: u32, state: &str, regions: Vec<Region>) -> Collection {
    let congress_text = congress.to_string();
    Collection::from_records(
        congress,
        regions
            .into_iter()
            .enumerate()
            .map(|(i, region)| record(state, &(i + 1).to_string(), &congress_text, region))
            .collect(),
    )
}

/// Unit-height rectangles side by side, starting at x = 0.
pub fn row(widths: &[Real]) -> Vec<Region> {
    let mut x = 0.0;
    widths
        .iter()
        .map(|width| {
            let region = Region::rectangle(x, 0.0, x + width, 1.0);
            x += width;
            region
        })
        .collect()
}

pub fn overlap_area(a: &Region, b: &Region) -> Real {
    a.intersection(b).expect("intersection of valid regions").area()
}

/// Largest overlap area between any two distinct features.
pub fn worst_pairwise_overlap(collection: &Collection) -> Real {
    let ids: Vec<FeatureId> = collection.ids().collect();
    let mut worst: Real = 0.0;
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            worst = worst.max(overlap_area(collection.geometry(a), collection.geometry(b)));
        }
    }
    worst
}
