//! Common types shared across the weather-fields crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod raster;

pub use bbox::BoundingBox;
pub use error::{FieldError, FieldResult};
pub use grid::MagnitudeGrid;
pub use raster::{FieldBuffer, FieldKind, RasterField};
