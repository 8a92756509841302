mod support;

use std::collections::BTreeSet;
use support::*;
use unclipped_districts::buffer::{BufferSettings, NoopProgress, buffer_all};
use unclipped_districts::errors::{BufferError, IntegrityError};
use unclipped_districts::{FeatureId, Region, RegionOps};
use geo::{LineString, Polygon};

fn buffer(collection: &mut unclipped_districts::Collection, land: &Region) -> unclipped_districts::buffer::BufferReport {
    buffer_all(
        collection,
        land,
        &BufferSettings::default(),
        &BTreeSet::new(),
        &NoopProgress,
    )
    .expect("buffering succeeds")
}

#[test]
fn adjacent_districts_grow_without_overlapping() {
    let originals = row(&[1.0, 1.0]);
    let land = Region::rectangle(0.0, 0.0, 2.0, 1.0);
    let mut data = collection(12, "Ohio", originals.clone());

    let report = buffer(&mut data, &land);

    assert_eq!(report.features.len(), 2);
    for (id, original) in data.ids().zip(&originals) {
        let grown = data.geometry(id);
        assert!(grown.is_valid());
        assert!(grown.area() > original.area());
        assert!(approx_eq(overlap_area(grown, original), original.area(), AREA_EPS));
    }
    assert!(worst_pairwise_overlap(&data) < AREA_EPS);
    // the first district met the second one's original shape
    assert_eq!(report.features[0].conflicts, 1);
}

#[test]
fn districts_stay_inside_a_surrounding_landmass() {
    let originals = row(&[1.0, 1.0]);
    let land = Region::rectangle(-1.0, -1.0, 3.0, 2.0);
    let mut data = collection(12, "Ohio", originals.clone());

    buffer(&mut data, &land);

    for (id, original) in data.ids().zip(&originals) {
        let grown = data.geometry(id);
        assert!(grown.area() > original.area());
        assert!(grown.difference(&land).unwrap().area() < AREA_EPS);
    }
    assert!(worst_pairwise_overlap(&data) < AREA_EPS);
}

#[test]
fn districts_do_not_claim_unassigned_land() {
    // an L-shaped district whose bounding box also holds land nobody represents
    let district = Region::rectangle(0.0, 0.0, 2.0, 2.0)
        .difference(&Region::rectangle(1.0, 1.0, 2.0, 2.0))
        .unwrap();
    let notch = Region::rectangle(1.0, 1.0, 2.0, 2.0);
    let land = Region::rectangle(0.0, 0.0, 2.0, 2.0);
    let mut data = collection(30, "Maine", vec![district.clone()]);

    buffer(&mut data, &land);

    let grown = data.geometry(FeatureId(0));
    assert!(grown.area() > district.area());
    assert!(overlap_area(grown, &notch) < AREA_EPS);
}

#[test]
fn district_with_a_pinched_bay_is_buffered() {
    // a bay whose mouth narrows to a single point on the coast
    let ring = LineString::from(vec![
        (0.0, 0.0),
        (1.0, 0.0),
        (0.5, 0.5),
        (1.0, 1.0),
        (1.5, 0.5),
        (1.0, 0.0),
        (2.0, 0.0),
        (2.0, 2.0),
        (0.0, 2.0),
        (0.0, 0.0),
    ]);
    let district = Region::from_polygon(Polygon::new(ring, vec![]));
    let mut data = collection(40, "Maine", vec![district.clone()]);

    let report = buffer(&mut data, &district);

    assert_eq!(report.features.len(), 1);
    let grown = data.geometry(FeatureId(0));
    assert!(grown.is_valid());
    assert!(grown.area() > district.area());
    assert!(approx_eq(overlap_area(grown, &district), district.area(), AREA_EPS));
}

#[test]
fn noise_overlap_that_costs_too_much_area_aborts() {
    // the district is boxed in on every side, so it cannot make up for the
    // sliver it loses to its right-hand neighbour
    let boxed = Region::rectangle(0.0, 0.0, 1.0, 1.0);
    let neighbours = vec![
        Region::rectangle(0.995, 0.0, 1.995, 1.0),
        Region::rectangle(-1.0, -1.0, 0.0, 2.0),
        Region::rectangle(0.0, 1.0, 2.0, 2.0),
        Region::rectangle(0.0, -1.0, 2.0, 0.0),
    ];
    let mut regions = vec![boxed];
    regions.extend(neighbours);
    let mut data = collection(21, "Vermont", regions);
    let land = Region::rectangle(-1.0, -1.0, 2.0, 2.0);

    let error = buffer_all(&mut data, &land, &BufferSettings::default(), &BTreeSet::new(), &NoopProgress)
        .unwrap_err();

    match error {
        BufferError::Integrity(IntegrityError::AreaShrank { feature, before, after }) => {
            assert!(feature.starts_with("Vermont 1"));
            assert!(after < 0.999 * before);
        },
        other => panic!("expected AreaShrank, got {other:?}"),
    }
}

#[test]
fn coextensive_districts_keep_their_shared_area() {
    let at_large = Region::rectangle(0.0, 0.0, 2.0, 2.0);
    let numbered = Region::rectangle(0.0, 0.0, 1.0, 1.0);
    let land = at_large.clone();
    let mut data = collection(43, "Tennessee", vec![at_large, numbered.clone()]);

    let report = buffer(&mut data, &land);

    assert_eq!(report.features[0].preserved, 1);
    assert_eq!(report.features[0].conflicts, 0);
    let shared = overlap_area(data.geometry(FeatureId(0)), data.geometry(FeatureId(1)));
    assert!(shared >= numbered.area() - AREA_EPS);
}

#[test]
fn identical_districts_both_keep_the_whole_overlap() {
    let shape = Region::rectangle(0.0, 0.0, 1.0, 1.0);
    let land = Region::rectangle(0.0, 0.0, 1.0, 1.0);
    let mut data = collection(43, "Tennessee", vec![shape.clone(), shape.clone()]);

    let report = buffer(&mut data, &land);

    assert!(report.features.iter().all(|f| f.preserved == 1 && f.conflicts == 0));
    let shared = overlap_area(data.geometry(FeatureId(0)), data.geometry(FeatureId(1)));
    assert!(shared >= shape.area() - AREA_EPS);
}

#[test]
fn unmanipulated_features_are_left_alone() {
    let originals = row(&[1.0, 1.0, 1.0]);
    let land = Region::rectangle(0.0, 0.0, 3.0, 1.0);
    let mut data = collection(7, "Iowa", originals.clone());
    let frozen = BTreeSet::from([FeatureId(1)]);

    let report = buffer_all(&mut data, &land, &BufferSettings::default(), &frozen, &NoopProgress)
        .unwrap();

    assert_eq!(report.untouched, 1);
    assert_eq!(report.features.len(), 2);
    assert!(approx_eq(data.geometry(FeatureId(1)).area(), 1.0, AREA_EPS));
    assert!(worst_pairwise_overlap(&data) < AREA_EPS);
}

#[test]
fn ambiguous_overlap_aborts_the_collection() {
    let mut data = collection(
        50,
        "Texas",
        vec![
            Region::rectangle(0.0, 0.0, 1.0, 1.0),
            Region::rectangle(0.6, 0.0, 1.6, 1.0),
        ],
    );
    let land = Region::rectangle(0.0, 0.0, 1.6, 1.0);
    let error = buffer_all(&mut data, &land, &BufferSettings::default(), &BTreeSet::new(), &NoopProgress)
        .unwrap_err();
    assert!(matches!(
        error,
        BufferError::Integrity(IntegrityError::AmbiguousOverlap { .. })
    ));
}

#[test]
fn empty_collection_is_a_no_op() {
    let mut data = collection(1, "Ohio", Vec::new());
    let report = buffer(&mut data, &Region::rectangle(0.0, 0.0, 1.0, 1.0));
    assert!(report.features.is_empty());
    assert!(data.is_empty());
}
