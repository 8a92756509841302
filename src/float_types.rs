// Our Real scalar type. District coordinates are longitude/latitude degrees.
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized tolerance used for "is this area zero" comparisons.
/// Can be overridden at build time with the env var `UNCLIP_TOLERANCE`
/// (e.g. `UNCLIP_TOLERANCE=1e-12 cargo build`).
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    1e-12
}

/// Returns the current area tolerance.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("UNCLIP_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Default outward buffer: 1/120 of a degree, roughly half a mile at mid-latitudes.
pub const DEFAULT_BUFFER: Real = 1.0 / 120.0;

/// Allowed relative shrinkage when a district is buffered.
pub const DEFAULT_AREA_TOLERANCE: Real = 0.001;

/// Intersection-over-min-area above which two districts genuinely overlap.
pub const GENUINE_OVERLAP_RATIO: Real = 1e-2;

/// Every genuine overlap must be at least this substantial.
pub const MINIMUM_CLASSIFIED_RATIO: Real = 0.5;

/// Clip fixups must keep strictly more than this share of the original area.
pub const MINIMUM_CLIP_RATIO: Real = 0.90;
