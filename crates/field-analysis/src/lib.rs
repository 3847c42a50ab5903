//! Geometry extraction from materialized magnitude grids.
//!
//! Two analysis passes over full-resolution grids:
//! - Isoline extraction: contour polylines at a fixed value interval,
//!   topologically correct across the antimeridian
//! - Extrema detection: pressure-style highs/lows with geodesic greedy
//!   suppression, plus a flat transfer layout for the worker boundary
//!
//! Both passes touch every pixel of a potentially megapixel grid; hosts
//! with an interactive thread should run them through `analysis-worker`.

pub mod blur;
pub mod clip;
pub mod config;
pub mod error;
pub mod extrema;
pub mod isolines;

pub use blur::box_blur_interior;
pub use clip::{clip_polyline, ClipRect};
pub use config::{ExtremaConfig, IsolineConfig};
pub use error::{AnalysisError, Result};
pub use extrema::{detect_extrema, haversine_km, ExtremaSet, Extremum};
pub use isolines::{extract_isolines, is_major_level, Isoline};
