//! Geographic bounding box type and operations.

use serde::{Deserialize, Serialize};

/// Tolerance for deciding that a longitude span covers the full globe.
const CYCLIC_EPSILON: f64 = 1e-6;

/// A geographic bounding box in WGS84 degrees.
///
/// Matches a raster's declared extent: `min_lon < max_lon` and
/// `min_lat < max_lat`. The longitude span may cover exactly 360°
/// (a globe-wrapping grid) or less (a regional grid).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Construct from a `[min_lon, min_lat, max_lon, max_lat]` array.
    pub fn from_array(bounds: [f64; 4]) -> Self {
        Self::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }

    /// Get the width in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Get the height in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// True when the longitude span covers the full globe, so the last
    /// column is adjacent to the first across the antimeridian.
    pub fn is_cyclic(&self) -> bool {
        (self.width() - 360.0).abs() < CYCLIC_EPSILON
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        // Global coverage
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }
}
