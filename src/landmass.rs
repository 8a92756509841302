//! The land polygon districts must not expand onto.

use crate::errors::PipelineError;
use crate::region::Region;

#[cfg(feature = "shapefile-io")]
use crate::errors::IntegrityError;
#[cfg(feature = "shapefile-io")]
use std::{path::PathBuf, sync::OnceLock};

pub use crate::buffer::engine::relevant_chunk_of_land as relevant_chunk;

/// Supplies the single landmass region shared by every congress of a run.
pub trait LandmassProvider {
    fn landmass(&self) -> Result<&Region, PipelineError>;
}

/// A landmass held in memory.
#[derive(Clone, Debug)]
pub struct StaticLandmass(pub Region);

impl LandmassProvider for StaticLandmass {
    fn landmass(&self) -> Result<&Region, PipelineError> {
        Ok(&self.0)
    }
}

/// A landmass read once from a single-feature shapefile and kept for the
/// lifetime of the provider.
#[cfg(feature = "shapefile-io")]
#[derive(Debug)]
pub struct ShapefileLandmass {
    path: PathBuf,
    cell: OnceLock<Region>,
}

#[cfg(feature = "shapefile-io")]
impl ShapefileLandmass {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ShapefileLandmass {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }
}

#[cfg(feature = "shapefile-io")]
impl LandmassProvider for ShapefileLandmass {
    fn landmass(&self) -> Result<&Region, PipelineError> {
        if let Some(region) = self.cell.get() {
            return Ok(region);
        }
        let mut polygons = crate::io::shapefile::read_polygons(&self.path)?;
        if polygons.len() != 1 {
            return Err(IntegrityError::LandmassFeatureCount(polygons.len()).into());
        }
        let region = Region::new(polygons.remove(0));
        tracing::info!(path = %self.path.display(), "loaded landmass");
        Ok(self.cell.get_or_init(|| region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RegionOps;

    #[test]
    fn static_landmass_hands_out_its_region() {
        let provider = StaticLandmass(Region::rectangle(0.0, 0.0, 10.0, 10.0));
        assert!((provider.landmass().unwrap().area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn relevant_chunk_is_land_inside_the_box() {
        let land = Region::rectangle(0.0, 0.0, 10.0, 10.0);
        let district = Region::rectangle(8.0, 8.0, 12.0, 12.0);
        let chunk = relevant_chunk(&land, &district).unwrap();
        assert!((chunk.area() - 4.0).abs() < 1e-6);
    }
}
