//! Buffering districts outward into water and unassigned land.

pub mod driver;
pub mod engine;
pub mod progress;

pub use driver::{BufferReport, BufferSettings, FeatureReport, buffer_all};
pub use engine::{BufferContext, Buffered, buffer_feature, relevant_chunk_of_land};
pub use progress::{NoopProgress, ProgressObserver, TracingProgress};
