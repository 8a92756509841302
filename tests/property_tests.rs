mod support;

use proptest::prelude::*;
use std::collections::BTreeSet;
use support::*;
use unclipped_districts::buffer::{BufferSettings, NoopProgress, buffer_all};
use unclipped_districts::{Region, RegionOps};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// A row of touching districts on a strip of land: after buffering every
    /// district is valid, has not shrunk, still covers its original shape,
    /// and no two districts overlap.
    #[test]
    fn buffering_a_row_never_creates_overlap(widths in prop::collection::vec(0.25f64..2.0, 1..5)) {
        let originals = row(&widths);
        let total: f64 = widths.iter().sum();
        let land = Region::rectangle(0.0, 0.0, total, 1.0);
        let mut data = collection(60, "Kansas", originals.clone());

        buffer_all(&mut data, &land, &BufferSettings::default(), &BTreeSet::new(), &NoopProgress)
            .unwrap();

        for (id, original) in data.ids().zip(&originals) {
            let grown = data.geometry(id);
            prop_assert!(grown.is_valid());
            prop_assert!(grown.area() >= 0.999 * original.area());
            prop_assert!(approx_eq(overlap_area(grown, original), original.area(), AREA_EPS));
        }
        prop_assert!(worst_pairwise_overlap(&data) < AREA_EPS);
    }

    /// Buffering a lone district only ever adds area.
    #[test]
    fn lone_district_grows(x0 in -20.0f64..20.0, y0 in -20.0f64..20.0, w in 0.1f64..3.0, h in 0.1f64..3.0) {
        let district = Region::rectangle(x0, y0, x0 + w, y0 + h);
        let mut data = collection(80, "Nevada", vec![district.clone()]);

        buffer_all(&mut data, &district, &BufferSettings::default(), &BTreeSet::new(), &NoopProgress)
            .unwrap();

        let grown = data.geometry(unclipped_districts::FeatureId(0));
        prop_assert!(grown.area() > district.area());
        prop_assert!(approx_eq(overlap_area(grown, &district), district.area(), 1e-4 * district.area()));
    }
}
