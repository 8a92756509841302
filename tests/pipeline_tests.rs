mod support;

use std::cell::RefCell;
use std::collections::HashMap;
use support::*;
use unclipped_districts::buffer::{BufferSettings, NoopProgress};
use unclipped_districts::errors::{IntegrityError, PipelineError};
use unclipped_districts::feature::{Collection, FeatureRecord};
use unclipped_districts::fixups::{DEFAULT_FIXUPS, ReferenceBoundaries};
use unclipped_districts::io::IoError;
use unclipped_districts::io::geojson::GeoJsonZipSink;
use unclipped_districts::landmass::{LandmassProvider, StaticLandmass};
use unclipped_districts::pipeline::{ArtifactSink, FeatureSource, Pipeline};
use unclipped_districts::store::{MemoryResultStore, ResultStore};
use unclipped_districts::{Region, RegionOps};

/// Serves fixed records and counts how often each congress is loaded.
struct FakeSource {
    congresses: HashMap<u32, Vec<FeatureRecord>>,
    loads: RefCell<Vec<u32>>,
}

impl FakeSource {
    fn new() -> Self {
        let districts = |congress: u32| {
            let text = congress.to_string();
            row(&[1.0, 0.5, 1.5])
                .into_iter()
                .enumerate()
                .map(|(i, region)| record("Ohio", &(i + 1).to_string(), &text, region))
                .collect::<Vec<_>>()
        };
        // a quarter overlap nobody can classify
        let broken = vec![
            record("Texas", "1", "2", Region::rectangle(0.0, 0.0, 1.0, 1.0)),
            record("Texas", "2", "2", Region::rectangle(0.75, 0.0, 1.75, 1.0)),
        ];
        FakeSource {
            congresses: HashMap::from([(1, districts(1)), (2, broken), (3, districts(3))]),
            loads: RefCell::new(Vec::new()),
        }
    }

    fn loads_of(&self, congress: u32) -> usize {
        self.loads.borrow().iter().filter(|&&c| c == congress).count()
    }
}

impl FeatureSource for FakeSource {
    fn load(&self, congress: u32) -> Result<Vec<FeatureRecord>, IoError> {
        self.loads.borrow_mut().push(congress);
        self.congresses
            .get(&congress)
            .cloned()
            .ok_or_else(|| IoError::MalformedInput(format!("no congress {congress}")))
    }
}

struct NoOutlines;

impl ReferenceBoundaries for NoOutlines {
    fn boundary(&self, state: &str) -> Result<Region, PipelineError> {
        Err(PipelineError::Store(format!("unexpected outline request for {state}")))
    }
}

struct BrokenLandmass;

impl LandmassProvider for BrokenLandmass {
    fn landmass(&self) -> Result<&Region, PipelineError> {
        Err(IntegrityError::LandmassFeatureCount(2).into())
    }
}

/// Claims every artifact is missing, as if another writer finished one
/// between the check and the write.
struct LateArrival<'a>(&'a GeoJsonZipSink);

impl ArtifactSink for LateArrival<'_> {
    fn exists(&self, _congress: u32) -> bool {
        false
    }

    fn write(&self, collection: &Collection) -> Result<(), IoError> {
        self.0.write(collection)
    }

    fn discard(&self, congress: u32) -> Result<(), IoError> {
        self.0.discard(congress)
    }
}

fn land() -> StaticLandmass {
    StaticLandmass(Region::rectangle(0.0, 0.0, 3.0, 1.0))
}

fn pipeline<'a>(
    source: &'a FakeSource,
    landmass: &'a dyn LandmassProvider,
    sink: &'a dyn ArtifactSink,
    store: &'a dyn ResultStore,
) -> Pipeline<'a> {
    Pipeline {
        source,
        landmass,
        boundaries: &NoOutlines,
        sink,
        store,
        fixups: DEFAULT_FIXUPS,
        settings: BufferSettings::default(),
        observer: &NoopProgress,
    }
}

#[test]
fn failures_are_isolated_and_reruns_skip_finished_congresses() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::new();
    let landmass = land();
    let sink = GeoJsonZipSink::new(dir.path());
    let store = MemoryResultStore::default();
    let run = pipeline(&source, &landmass, &sink, &store);

    let first = run.run(1..=3).unwrap();
    assert_eq!(first.written, vec![1, 3]);
    assert_eq!(first.failed.len(), 1);
    assert_eq!(first.failed[0].0, 2);
    assert!(first.failed[0].1.contains("Texas"));
    assert!(!first.is_success());
    assert!(!sink.exists(2));

    let second = run.run(1..=3).unwrap();
    assert_eq!(second.skipped, vec![1, 3]);
    assert!(second.written.is_empty());
    assert_eq!(second.failed.len(), 1);
    assert_eq!(source.loads_of(1), 1);
    assert_eq!(source.loads_of(2), 2);
}

#[test]
fn written_collections_hold_buffered_districts() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::new();
    let landmass = land();
    let sink = GeoJsonZipSink::new(dir.path());
    let store = MemoryResultStore::default();

    pipeline(&source, &landmass, &sink, &store).run(1..=1).unwrap();

    let records = sink.read(1).unwrap();
    assert_eq!(records.len(), 3);
    let regions: Vec<Region> = records
        .into_iter()
        .map(|record| Region::new(record.geometry.unwrap()))
        .collect();
    let originals = row(&[1.0, 0.5, 1.5]);
    for (grown, original) in regions.iter().zip(&originals) {
        assert!(grown.area() > original.area());
    }
    for i in 0..regions.len() {
        for j in i + 1..regions.len() {
            assert!(overlap_area(&regions[i], &regions[j]) < AREA_EPS);
        }
    }
}

#[test]
fn memoised_results_reproduce_identical_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::new();
    let landmass = land();
    let sink = GeoJsonZipSink::new(dir.path());
    let store = MemoryResultStore::default();
    let run = pipeline(&source, &landmass, &sink, &store);

    run.run(3..=3).unwrap();
    let before = std::fs::read(sink.path_for(3)).unwrap();
    sink.discard(3).unwrap();
    run.run(3..=3).unwrap();
    let after = std::fs::read(sink.path_for(3)).unwrap();

    assert_eq!(before, after);
    assert_eq!(source.loads_of(3), 1);
}

#[test]
fn unusable_landmass_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::new();
    let sink = GeoJsonZipSink::new(dir.path());
    let store = MemoryResultStore::default();

    let error = pipeline(&source, &BrokenLandmass, &sink, &store)
        .run(1..=3)
        .unwrap_err();

    assert!(matches!(
        error,
        PipelineError::Integrity(IntegrityError::LandmassFeatureCount(2))
    ));
    assert!(source.loads.borrow().is_empty());
}

#[test]
fn artifact_written_by_someone_else_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::new();
    let landmass = land();
    let sink = GeoJsonZipSink::new(dir.path());
    let store = MemoryResultStore::default();
    std::fs::write(sink.path_for(1), b"finished elsewhere").unwrap();

    let summary = pipeline(&source, &landmass, &LateArrival(&sink), &store)
        .run(1..=1)
        .unwrap();

    assert_eq!(summary.skipped, vec![1]);
    assert!(summary.is_success());
    assert_eq!(std::fs::read(sink.path_for(1)).unwrap(), b"finished elsewhere");
}
