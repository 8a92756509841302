//! Reconstructs **unclipped** historical congressional district boundaries.
//!
//! Historical district shapefiles are clipped to the coastline, so a coastal
//! district ends where the water begins. This crate buffers every district of
//! a congress outward into the water by a small distance, never onto land
//! that belonged to no district, and never into a neighbour, while keeping
//! the legitimate overlaps (at-large seats drawn over numbered districts)
//! the source data contains.
//!
//! The work is split the same way the data flows:
//! - [`region`]: planar regions and the [`RegionOps`](traits::RegionOps) they support
//! - [`feature`]: the districts of one congress, addressed by stable handles
//! - [`fixups`]: hand-maintained corrections applied before buffering
//! - [`overlap`]: separating genuine overlaps from touching neighbours
//! - [`buffer`]: the buffering engine and the driver over a whole collection
//! - [`pipeline`]: loading, buffering, memoising and writing a range of congresses
//!
//! # Features
//! #### Default
//! - **shapefile-io**: read district, landmass and state outline shapefiles
//! - **fetch**: download the numbered district archives over HTTP
//!
//! #### Optional
//! - **parallel**: use rayon for the overlap classifier's intersection tests

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod aabb;
pub mod buffer;
pub mod config;
pub mod errors;
pub mod feature;
pub mod fixups;
pub mod float_types;
pub mod io;
pub mod landmass;
pub mod overlap;
pub mod pipeline;
pub mod region;
pub mod store;
pub mod traits;

pub use feature::{Collection, DistrictKey, FeatureId};
pub use region::Region;
pub use traits::RegionOps;
