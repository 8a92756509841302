//! Run configuration, read from an optional TOML file.
//!
//! ```toml
//! output_dir = "unclipped_congresses"
//! cache_dir = "cache"
//! landmass = "north-america/usa.shp"
//! first = 1
//! last = 114
//!
//! [buffer]
//! distance = 0.008333333333333333
//! area_tolerance = 0.001
//!
//! [buffer.thresholds]
//! genuine = 0.01
//! minimum_classified = 0.5
//! ```
//!
//! Every key is optional.

use crate::buffer::BufferSettings;
use crate::float_types::Real;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Where the numbered district archives are published.
pub const DEFAULT_URL_TEMPLATE: &str = "https://cdmaps.polisci.ucla.edu/shp/districts{count:03}.zip";

/// The last congress the district archives cover.
pub const LAST_CONGRESS: u32 = 114;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Where `{NNN}.geojson.zip` artifacts are written.
    pub output_dir: PathBuf,
    /// Result store directory; `None` disables memoisation.
    pub cache_dir: Option<PathBuf>,
    /// Single-feature landmass shapefile.
    pub landmass: PathBuf,
    /// Root of the `<State>/<State>.shp` outlines used by clip fixups.
    /// Defaults to the directory of the executable.
    pub boundaries: Option<PathBuf>,
    /// Archive URL, `{count:03}` standing for the congress number.
    pub url_template: String,
    pub first: u32,
    pub last: u32,
    pub buffer: BufferSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            output_dir: PathBuf::from("unclipped_congresses"),
            cache_dir: Some(PathBuf::from("cache")),
            landmass: PathBuf::from("north-america/usa.shp"),
            boundaries: None,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            first: 1,
            last: LAST_CONGRESS,
            buffer: BufferSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    pub fn congresses(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));
        if self.first == 0 || self.first > self.last {
            return invalid(format!("congress range {}..={} is empty or starts at 0", self.first, self.last));
        }
        let positive = |value: Real| value.is_finite() && value > 0.0;
        if !positive(self.buffer.distance) {
            return invalid(format!("buffer distance {} must be positive", self.buffer.distance));
        }
        if !(0.0..1.0).contains(&self.buffer.area_tolerance) {
            return invalid(format!("area tolerance {} must be in [0, 1)", self.buffer.area_tolerance));
        }
        let thresholds = self.buffer.thresholds;
        if !positive(thresholds.genuine) || thresholds.genuine >= thresholds.minimum_classified {
            return invalid(format!(
                "genuine overlap ratio {} must be positive and below {}",
                thresholds.genuine, thresholds.minimum_classified
            ));
        }
        if !self.url_template.contains("{count") {
            return invalid(format!("url template {} has no {{count:03}}", self.url_template));
        }
        Ok(())
    }
}
