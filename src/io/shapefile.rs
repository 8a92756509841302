//! Reading district tables, landmass and state outlines from ESRI shapefiles.

use super::IoError;
use crate::errors::{IntegrityError, PipelineError};
use crate::feature::{DistrictKey, FeatureRecord};
use crate::fixups::ReferenceBoundaries;
use crate::float_types::Real;
use crate::region::Region;
use ::shapefile::dbase::{FieldValue, Record};
use ::shapefile::{Reader, Shape};
use geo::{Geometry, MultiPolygon};
use std::path::{Path, PathBuf};

/// Reads every record of a district shapefile. Null shapes become records
/// without geometry.
pub fn read_records(path: &Path) -> Result<Vec<FeatureRecord>, IoError> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();
    for entry in reader.iter_shapes_and_records() {
        let (shape, record) = entry?;
        let key = DistrictKey {
            state_name: text_field(&record, "STATENAME")?,
            district: text_field(&record, "DISTRICT")?,
            congress_start: text_field(&record, "STARTCONG")?,
            congress_end: text_field(&record, "ENDCONG")?,
        };
        records.push(FeatureRecord { key, geometry: shape_to_multi_polygon(shape)? });
    }
    tracing::debug!(path = %path.display(), records = records.len(), "read district shapefile");
    Ok(records)
}

/// Reads the polygon geometry of every record, skipping null shapes.
pub fn read_polygons(path: &Path) -> Result<Vec<MultiPolygon<Real>>, IoError> {
    let mut reader = Reader::from_path(path)?;
    let mut polygons = Vec::new();
    for entry in reader.iter_shapes_and_records() {
        let (shape, _) = entry?;
        polygons.extend(shape_to_multi_polygon(shape)?);
    }
    Ok(polygons)
}

fn shape_to_multi_polygon(shape: Shape) -> Result<Option<MultiPolygon<Real>>, IoError> {
    if matches!(shape, Shape::NullShape) {
        return Ok(None);
    }
    let geometry = Geometry::<Real>::try_from(shape)
        .map_err(|message| IoError::MalformedInput(message.to_string()))?;
    match geometry {
        Geometry::MultiPolygon(multi) => Ok(Some(multi)),
        Geometry::Polygon(polygon) => Ok(Some(MultiPolygon::new(vec![polygon]))),
        other => Err(IoError::MalformedInput(format!(
            "expected polygon shapes, found {other:?}"
        ))),
    }
}

/// A dBase field as text. Numeric fields holding whole numbers are printed
/// without a fractional part, so `1.0` reads as `"1"`.
fn text_field(record: &Record, name: &str) -> Result<String, IoError> {
    let value = record
        .get(name)
        .ok_or_else(|| IoError::MalformedInput(format!("missing field {name}")))?;
    let text = match value {
        FieldValue::Character(text) => text.clone().unwrap_or_default(),
        FieldValue::Numeric(number) => number.map(format_number).unwrap_or_default(),
        FieldValue::Float(number) => number.map(|n| format_number(n as f64)).unwrap_or_default(),
        FieldValue::Double(number) => format_number(*number),
        FieldValue::Integer(number) => number.to_string(),
        other => {
            return Err(IoError::MalformedInput(format!(
                "field {name} has unsupported type: {other:?}"
            )));
        },
    };
    Ok(text.trim().to_string())
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// State outlines stored as `<root>/<State>/<State>.shp`, one feature each.
#[derive(Clone, Debug)]
pub struct ShapefileBoundaries {
    pub root: PathBuf,
}

impl ShapefileBoundaries {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ShapefileBoundaries { root: root.into() }
    }

    pub fn path_for(&self, state: &str) -> PathBuf {
        self.root.join(state).join(format!("{state}.shp"))
    }
}

impl ReferenceBoundaries for ShapefileBoundaries {
    fn boundary(&self, state: &str) -> Result<Region, PipelineError> {
        let mut polygons = read_polygons(&self.path_for(state))?;
        if polygons.len() != 1 {
            return Err(IntegrityError::BoundaryFeatureCount(state.to_string(), polygons.len()).into());
        }
        Ok(Region::new(polygons.remove(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_print_without_fraction() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(114.0), "114");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn polygon_shapes_convert_and_null_shapes_are_absent() {
        use ::shapefile::{Point, Polygon, PolygonRing};
        use geo::Area;

        let square = Polygon::new(PolygonRing::Outer(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ]));
        let multi = shape_to_multi_polygon(Shape::Polygon(square)).unwrap().unwrap();
        assert!((multi.unsigned_area() - 1.0).abs() < 1e-12);
        assert!(shape_to_multi_polygon(Shape::NullShape).unwrap().is_none());
    }

    #[test]
    fn point_shapes_are_malformed_input() {
        let error = shape_to_multi_polygon(Shape::Point(::shapefile::Point::new(1.0, 2.0))).unwrap_err();
        assert!(matches!(error, IoError::MalformedInput(_)));
    }

    #[test]
    fn boundary_paths_nest_by_state() {
        let boundaries = ShapefileBoundaries::new("/data");
        assert_eq!(
            boundaries.path_for("Rhode Island"),
            PathBuf::from("/data/Rhode Island/Rhode Island.shp")
        );
    }

    #[test]
    fn missing_boundary_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let boundaries = ShapefileBoundaries::new(dir.path());
        let error = boundaries.boundary("Georgia").unwrap_err();
        assert!(matches!(error, PipelineError::Io(_)));
    }
}
