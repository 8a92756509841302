//! Validation, topology, and data-integrity errors

use crate::float_types::Real;
use geo::Coord;

/// All the possible validation issues we might encounter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (HoleOutsideShell) A hole is *not* contained by its outer shell
    #[error("(HoleOutsideShell) A hole is *not* contained by its outer shell at: ({}, {})", .0.x, .0.y)]
    HoleOutsideShell(Coord<Real>),
    /// (RingSelfIntersection) A linear ring has a self‐intersection
    #[error("(RingSelfIntersection) A linear ring has a self-intersection at: ({}, {})", .0.x, .0.y)]
    RingSelfIntersection(Coord<Real>),
    /// (TooFewPoints) A ring has fewer than the minimal #points
    #[error("(TooFewPoints) A ring has fewer than the minimal #points at: ({}, {})", .0.x, .0.y)]
    TooFewPoints(Coord<Real>),
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({}, {}) has a NaN or infinite", .0.x, .0.y)]
    InvalidCoordinate(Coord<Real>),
    /// (RingNotClosed) The ring’s first/last points differ
    #[error("(RingNotClosed) The ring's first ({}, {}) and last ({}, {}) points differ", .first.x, .first.y, .last.x, .last.y)]
    RingNotClosed { first: Coord<Real>, last: Coord<Real> },
}

/// A failure of the polygon engine itself: the operands were not valid
/// simple regions, or the engine gave up on them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("{op}: operand is not a valid region: {source}")]
    InvalidOperand {
        op: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("{op}: geometry engine aborted: {message}")]
    EngineAbort { op: &'static str, message: String },
}

/// Data-integrity failures. None of these is recoverable: they mean either the
/// source data needs human review or the buffering procedure has a bug.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrityError {
    #[error("{count} features match {key}, expected at most one")]
    MultipleMatches { key: String, count: usize },
    #[error("clipping {feature} kept {kept} of {original}, outside (0.90, 1.0) of the original area")]
    ClipRatio {
        feature: String,
        kept: Real,
        original: Real,
    },
    #[error("{feature} has overlap ratios {ratios:?}, expected every genuine overlap above {minimum}")]
    AmbiguousOverlap {
        feature: String,
        ratios: Vec<Real>,
        minimum: Real,
    },
    #[error("buffering {feature} shrank it from {before} to {after}")]
    AreaShrank {
        feature: String,
        before: Real,
        after: Real,
    },
    #[error("buffering {feature} produced an invalid geometry: {source}")]
    InvalidResult {
        feature: String,
        #[source]
        source: ValidationError,
    },
    #[error("{feature}: {step} still failed after repair: {source}")]
    RepairExhausted {
        feature: String,
        step: &'static str,
        #[source]
        source: TopologyError,
    },
    #[error("landmass file must hold exactly one feature, found {0}")]
    LandmassFeatureCount(usize),
    #[error("reference boundary for {0} must hold exactly one feature, found {1}")]
    BoundaryFeatureCount(String, usize),
}

/// Failure while buffering one feature or one collection.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Anything that can stop one congress from being produced.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Io(#[from] crate::io::IoError),
    #[error("result store: {0}")]
    Store(String),
}

impl From<BufferError> for PipelineError {
    fn from(value: BufferError) -> Self {
        match value {
            BufferError::Integrity(error) => Self::Integrity(error),
            BufferError::Topology(error) => Self::Topology(error),
        }
    }
}
