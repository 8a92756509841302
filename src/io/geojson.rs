//! Writing finished collections as zipped GeoJSON.
//!
//! Each congress becomes `{NNN}.geojson.zip` holding a single
//! `{NNN}.geojson` FeatureCollection. Every feature carries the district
//! identity as `STATENAME`, `DISTRICT`, `STARTCONG` and `ENDCONG`, the same
//! attribute names the source shapefiles use.

use super::IoError;
use crate::feature::{Collection, DistrictKey, FeatureRecord};
use crate::float_types::Real;
use crate::pipeline::ArtifactSink;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Value, json};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// File name of the artifact for `congress`.
pub fn artifact_name(congress: u32) -> String {
    format!("{congress:03}.geojson.zip")
}

fn ring_coordinates(ring: &LineString<Real>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_coordinates(polygon: &Polygon<Real>) -> Value {
    let mut rings = vec![ring_coordinates(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring_coordinates));
    Value::Array(rings)
}

/// The collection as a GeoJSON FeatureCollection.
pub fn collection_to_geojson(collection: &Collection) -> Value {
    let features: Vec<Value> = collection
        .iter()
        .map(|feature| {
            let polygons = feature.geometry.multi_polygon();
            json!({
                "type": "Feature",
                "properties": {
                    "STATENAME": feature.key.state_name,
                    "DISTRICT": feature.key.district,
                    "STARTCONG": feature.key.congress_start,
                    "ENDCONG": feature.key.congress_end,
                },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": polygons.iter().map(polygon_coordinates).collect::<Vec<_>>(),
                },
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

fn malformed(what: &str) -> IoError {
    IoError::MalformedInput(format!("GeoJSON: {what}"))
}

fn parse_ring(value: &Value) -> Result<LineString<Real>, IoError> {
    let points = value.as_array().ok_or_else(|| malformed("ring is not an array"))?;
    points
        .iter()
        .map(|point| match point.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(malformed("coordinate is not numeric")),
            },
            _ => Err(malformed("position needs two numbers")),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn parse_polygon(value: &Value) -> Result<Polygon<Real>, IoError> {
    let rings = value.as_array().ok_or_else(|| malformed("polygon is not an array"))?;
    let mut rings = rings.iter().map(parse_ring);
    let exterior = rings.next().ok_or_else(|| malformed("polygon has no rings"))??;
    Ok(Polygon::new(exterior, rings.collect::<Result<_, _>>()?))
}

fn property(properties: &Value, name: &str) -> Result<String, IoError> {
    properties
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed(&format!("missing property {name}")))
}

/// Reads a FeatureCollection written by [`collection_to_geojson`].
pub fn geojson_to_records(value: &Value) -> Result<Vec<FeatureRecord>, IoError> {
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("no features array"))?;
    features
        .iter()
        .map(|feature| {
            let properties = &feature["properties"];
            let key = DistrictKey {
                state_name: property(properties, "STATENAME")?,
                district: property(properties, "DISTRICT")?,
                congress_start: property(properties, "STARTCONG")?,
                congress_end: property(properties, "ENDCONG")?,
            };
            let geometry = match feature.get("geometry") {
                None | Some(Value::Null) => None,
                Some(geometry) => {
                    let polygons = geometry["coordinates"]
                        .as_array()
                        .ok_or_else(|| malformed("geometry has no coordinates"))?;
                    Some(MultiPolygon::new(
                        polygons.iter().map(parse_polygon).collect::<Result<_, _>>()?,
                    ))
                },
            };
            Ok(FeatureRecord { key, geometry })
        })
        .collect()
}

/// Writes one artifact per congress into `dir`.
#[derive(Clone, Debug)]
pub struct GeoJsonZipSink {
    pub dir: PathBuf,
}

impl GeoJsonZipSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        GeoJsonZipSink { dir: dir.into() }
    }

    pub fn path_for(&self, congress: u32) -> PathBuf {
        self.dir.join(artifact_name(congress))
    }

    /// Reads an artifact back.
    pub fn read(&self, congress: u32) -> Result<Vec<FeatureRecord>, IoError> {
        read_artifact(&self.path_for(congress), congress)
    }
}

/// The zipped GeoJSON document for `collection`. Entries carry a fixed
/// timestamp, so equal collections give equal bytes.
pub fn encode_artifact(collection: &Collection) -> Result<Vec<u8>, IoError> {
    let document = serde_json::to_vec(&collection_to_geojson(collection))?;
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer.start_file(format!("{:03}.geojson", collection.congress), options)?;
    writer.write_all(&document)?;
    Ok(writer.finish()?.into_inner())
}

pub fn read_artifact(path: &Path, congress: u32) -> Result<Vec<FeatureRecord>, IoError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut entry = archive.by_name(&format!("{congress:03}.geojson"))?;
    let mut document = String::new();
    entry.read_to_string(&mut document)?;
    geojson_to_records(&serde_json::from_str(&document)?)
}

impl ArtifactSink for GeoJsonZipSink {
    fn exists(&self, congress: u32) -> bool {
        self.path_for(congress).exists()
    }

    /// Writes to a temporary file in `dir` first and moves it into place
    /// only if no artifact exists yet.
    fn write(&self, collection: &Collection) -> Result<(), IoError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = encode_artifact(collection)?;
        let target = self.path_for(collection.congress);
        let mut staging = tempfile::NamedTempFile::new_in(&self.dir)?;
        staging.write_all(&bytes)?;
        staging.persist_noclobber(&target).map_err(|error| {
            if error.error.kind() == std::io::ErrorKind::AlreadyExists {
                IoError::ArtifactExists(target.clone())
            } else {
                IoError::StdIo(error.error)
            }
        })?;
        tracing::info!(
            congress = collection.congress,
            path = %self.path_for(collection.congress).display(),
            "wrote artifact"
        );
        Ok(())
    }

    fn discard(&self, congress: u32) -> Result<(), IoError> {
        match fs::remove_file(self.path_for(congress)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::traits::RegionOps;

    fn sample(congress: u32) -> Collection {
        Collection::from_records(
            congress,
            vec![FeatureRecord {
                key: DistrictKey::new("Ohio", "1", "1", "2"),
                geometry: Some(Region::rectangle(0.0, 0.0, 1.0, 2.0).into_multi_polygon()),
            }],
        )
    }

    #[test]
    fn identical_collections_give_identical_bytes() {
        assert_eq!(encode_artifact(&sample(5)).unwrap(), encode_artifact(&sample(5)).unwrap());
    }

    #[test]
    fn written_artifact_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let sink = GeoJsonZipSink::new(dir.path().join("out"));
        assert!(!sink.exists(12));
        sink.write(&sample(12)).unwrap();
        assert!(sink.exists(12));
        assert!(dir.path().join("out/012.geojson.zip").exists());

        let records = sink.read(12).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, DistrictKey::new("Ohio", "1", "1", "2"));
        let region = Region::new(records[0].geometry.clone().unwrap());
        assert!((region.area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn existing_artifact_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let sink = GeoJsonZipSink::new(dir.path());
        fs::write(sink.path_for(3), b"keep me").unwrap();
        assert!(matches!(sink.write(&sample(3)), Err(IoError::ArtifactExists(_))));
        assert_eq!(fs::read(sink.path_for(3)).unwrap(), b"keep me");
    }

    #[test]
    fn discarding_a_missing_artifact_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let sink = GeoJsonZipSink::new(dir.path());
        sink.discard(99).unwrap();
    }
}
