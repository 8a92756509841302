//! Downloading the numbered district archives.

use super::IoError;
use crate::feature::FeatureRecord;
use crate::pipeline::FeatureSource;
use std::io::Cursor;
use std::time::Duration;

pub use crate::config::DEFAULT_URL_TEMPLATE;

/// `{count:03}` in `template` replaced by the zero-padded congress number.
pub fn archive_url(template: &str, congress: u32) -> String {
    template
        .replace("{count:03}", &format!("{congress:03}"))
        .replace("{count}", &congress.to_string())
}

/// Relative path of the district shapefile inside an unpacked archive.
pub fn shapefile_member(congress: u32) -> String {
    format!("districtShapes/districts{congress:03}.shp")
}

/// Fetches `districts{NNN}.zip`, unpacks it into a temporary directory and
/// reads the district shapefile. The directory is removed when reading ends,
/// successful or not. Failures are not retried.
pub struct RemoteArchiveSource {
    pub url_template: String,
    client: reqwest::blocking::Client,
}

impl RemoteArchiveSource {
    pub fn new(url_template: impl Into<String>) -> Result<Self, IoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(RemoteArchiveSource {
            url_template: url_template.into(),
            client,
        })
    }

    fn download(&self, congress: u32) -> Result<Vec<u8>, IoError> {
        let url = archive_url(&self.url_template, congress);
        tracing::info!(congress, %url, "downloading district archive");
        let response = self.client.get(&url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

/// Unpacks `bytes` and reads the shapefile of `congress` out of it.
pub fn read_archive(bytes: &[u8], congress: u32) -> Result<Vec<FeatureRecord>, IoError> {
    let dir = tempfile::tempdir()?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    archive.extract(dir.path())?;
    let path = dir.path().join(shapefile_member(congress));
    if !path.exists() {
        return Err(IoError::MalformedInput(format!(
            "archive for congress {congress} has no {}",
            shapefile_member(congress)
        )));
    }
    super::shapefile::read_records(&path)
}

impl FeatureSource for RemoteArchiveSource {
    fn load(&self, congress: u32) -> Result<Vec<FeatureRecord>, IoError> {
        let bytes = self.download(congress)?;
        read_archive(&bytes, congress)
    }
}
