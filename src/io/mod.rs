#[cfg(feature = "shapefile-io")]
pub mod shapefile;

#[cfg(feature = "fetch")]
pub mod archive;

pub mod geojson;

/// Generic I/O and format‑conversion errors.
///
/// Some I/O features are behind cargo feature‑flags.
/// When a feature is disabled the corresponding variant does not exist.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("std::io::Error: {0}")]
    StdIo(#[from] std::io::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input is malformed: {0}")]
    MalformedInput(String),

    /// Another writer put an artifact in place first.
    #[error("Artifact already exists: {}", .0.display())]
    ArtifactExists(std::path::PathBuf),

    #[cfg(feature = "shapefile-io")]
    /// Error bubbled up from the `shapefile` crate while reading.
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] ::shapefile::Error),

    #[cfg(feature = "fetch")]
    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),
}
