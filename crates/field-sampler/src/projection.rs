//! Equirectangular geographic <-> pixel mapping.
//!
//! A field's declared bounds define a single linear transform per axis;
//! origin is the top-left corner with y growing downward. Input longitudes
//! are wrapped into the field's longitude window before projecting so that
//! queries near the antimeridian resolve consistently regardless of the
//! raw input range.

use fields_common::BoundingBox;

/// Normalize a longitude into `[-180, 180)`.
#[inline]
pub fn wrap_longitude(lon: f64) -> f64 {
    wrap_longitude_from(lon, -180.0)
}

/// Normalize a longitude into `[min, min + 360)`.
#[inline]
pub fn wrap_longitude_from(lon: f64, min: f64) -> f64 {
    (lon - min).rem_euclid(360.0) + min
}

/// Linear equirectangular mapping between geographic positions and raster
/// pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FieldProjection {
    bounds: BoundingBox,
    lon_res: f64,
    lat_res: f64,
}

impl FieldProjection {
    /// Build the transform for a raster of `width x height` pixels covering
    /// `bounds`.
    pub fn new(bounds: BoundingBox, width: usize, height: usize) -> Self {
        Self {
            bounds,
            lon_res: bounds.width() / width as f64,
            lat_res: bounds.height() / height as f64,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Project a geographic position to pixel coordinates. The longitude is
    /// wrapped into the field's window first.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lon = wrap_longitude_from(lon, self.bounds.min_lon);
        let x = (lon - self.bounds.min_lon) / self.lon_res;
        let y = (self.bounds.max_lat - lat) / self.lat_res;
        (x, y)
    }

    /// Map pixel coordinates back to a geographic position.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = self.bounds.min_lon + x * self.lon_res;
        let lat = self.bounds.max_lat - y * self.lat_res;
        (lon, lat)
    }
}
