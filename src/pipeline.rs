//! Producing the unclipped collection of every congress in a range.
//!
//! For each congress the pipeline
//! 1. skips it when the sink already holds its artifact,
//! 2. loads the district records from the [`FeatureSource`],
//! 3. applies the manual [fixups](crate::fixups),
//! 4. buffers the collection against the landmass,
//! 5. hands the result to the [`ArtifactSink`].
//!
//! Steps 2 to 4 are memoised in the [`ResultStore`]. A failing congress is
//! logged, whatever its own failed write left behind is discarded, and the
//! run moves on to the next one. Only an unusable landmass stops the whole
//! run.

use crate::buffer::{BufferSettings, ProgressObserver, buffer_all};
use crate::errors::PipelineError;
use crate::feature::{Collection, FeatureRecord};
use crate::fixups::{Fixup, ReferenceBoundaries, apply_fixups};
use crate::io::IoError;
use crate::landmass::LandmassProvider;
use crate::store::{CacheKey, ResultStore, memoize};
use std::collections::BTreeSet;
use std::error::Error;
use std::ops::RangeInclusive;

/// Version tag of stored unclipped collections. Bump it whenever the
/// buffering or the fixup table changes what a congress produces.
pub const UNCLIPPED_CONGRESS_VERSION: u32 = 3;

/// Loads the raw district records of one congress.
pub trait FeatureSource {
    fn load(&self, congress: u32) -> Result<Vec<FeatureRecord>, IoError>;
}

/// Destination of finished collections, one artifact per congress.
pub trait ArtifactSink {
    fn exists(&self, congress: u32) -> bool;
    /// Must not replace an existing artifact; refuses with
    /// [`IoError::ArtifactExists`] instead.
    fn write(&self, collection: &Collection) -> Result<(), IoError>;
    /// Removes whatever a failed `write` left behind. Absent artifacts are fine.
    fn discard(&self, congress: u32) -> Result<(), IoError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<u32>,
    pub skipped: Vec<u32>,
    /// Congress number and the rendered error chain.
    pub failed: Vec<(u32, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// `error: cause: cause…`
pub fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // transparent wrappers repeat their inner message
        if !rendered.ends_with(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }
    rendered
}

fn failure(congress: u32, error: &dyn Error) -> String {
    let chain = error_chain(error);
    tracing::error!(congress, error = %chain, "failed to produce congress");
    chain
}

pub struct Pipeline<'a> {
    pub source: &'a dyn FeatureSource,
    pub landmass: &'a dyn LandmassProvider,
    pub boundaries: &'a dyn ReferenceBoundaries,
    pub sink: &'a dyn ArtifactSink,
    pub store: &'a dyn ResultStore,
    pub fixups: &'a [Fixup],
    pub settings: BufferSettings,
    pub observer: &'a dyn ProgressObserver,
}

impl Pipeline<'_> {
    /// The buffered collection of `congress`, from the store when present.
    pub fn unclipped_congress(&self, congress: u32) -> Result<Collection, PipelineError> {
        let key = CacheKey::new(
            "unclipped_congress",
            UNCLIPPED_CONGRESS_VERSION,
            (congress, &self.settings),
        )?;
        memoize(self.store, &key, || self.compute(congress))
    }

    fn compute(&self, congress: u32) -> Result<Collection, PipelineError> {
        let land = self.landmass.landmass()?;
        let records = self.source.load(congress)?;
        let mut collection = Collection::from_records(congress, records);
        apply_fixups(&mut collection, self.fixups, self.boundaries)?;
        let report = buffer_all(
            &mut collection,
            land,
            &self.settings,
            &BTreeSet::new(),
            self.observer,
        )?;
        tracing::info!(
            congress,
            features = collection.len(),
            conflicts = report.features.iter().map(|f| f.conflicts).sum::<usize>(),
            "buffered congress"
        );
        Ok(collection)
    }

    pub fn run(&self, congresses: RangeInclusive<u32>) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        for congress in congresses {
            if self.sink.exists(congress) {
                tracing::debug!(congress, "artifact exists, skipping");
                summary.skipped.push(congress);
                continue;
            }
            // checked up front so a broken landmass ends the run
            self.landmass.landmass()?;

            let collection = match self.unclipped_congress(congress) {
                Ok(collection) => collection,
                Err(error) => {
                    // nothing was written for this congress yet
                    summary.failed.push((congress, failure(congress, &error)));
                    continue;
                },
            };
            match self.sink.write(&collection) {
                Ok(()) => summary.written.push(congress),
                Err(IoError::ArtifactExists(path)) => {
                    // someone else finished it first; theirs stays
                    tracing::warn!(
                        congress,
                        path = %path.display(),
                        "artifact appeared while running, skipping"
                    );
                    summary.skipped.push(congress);
                },
                Err(error) => {
                    if let Err(discard) = self.sink.discard(congress) {
                        tracing::warn!(congress, error = %discard, "could not discard partial artifact");
                    }
                    summary.failed.push((congress, failure(congress, &error)));
                },
            }
        }
        tracing::info!(
            written = summary.written.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "run finished"
        );
        Ok(summary)
    }
}
