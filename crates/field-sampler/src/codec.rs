//! Pixel decoding for raster snapshots.
//!
//! A pixel arrives as up to four f32 channels, either raw bytes promoted to
//! f32 (byte-encoded snapshots, where an unscale range maps 0..255 back to
//! physical units and the alpha channel flags no-data) or native float
//! values (where NaN flags no-data). Everything here is a pure function of
//! the pixel and the unscale range.

use fields_common::FieldKind;

/// A raw pixel as up to four f32 channels. Unused channels read 0.
pub type Pixel = [f32; 4];

/// No-data test for a pixel.
///
/// Byte-encoded snapshots flag valid pixels with a saturated alpha channel;
/// the `>=` accepts values fractionally above 255 that lossy re-decode
/// pipelines produce. Native float snapshots use NaN in the first channel.
#[inline]
pub fn has_pixel_value(pixel: &Pixel, unscale: Option<[f32; 2]>) -> bool {
    match unscale {
        Some(_) => pixel[3] >= 255.0,
        None => !pixel[0].is_nan(),
    }
}

/// Map a byte channel back to physical units: `min + (max-min) * v / 255`.
#[inline]
pub fn unscale_value(value: f32, unscale: [f32; 2]) -> f32 {
    let [min, max] = unscale;
    min + (max - min) * value / 255.0
}

/// Decode the scalar component of a pixel.
#[inline]
pub fn pixel_scalar(pixel: &Pixel, unscale: Option<[f32; 2]>) -> f32 {
    match unscale {
        Some(range) => unscale_value(pixel[0], range),
        None => pixel[0],
    }
}

/// Decode the (u, v) components of a vector pixel.
#[inline]
pub fn pixel_vector(pixel: &Pixel, unscale: Option<[f32; 2]>) -> [f32; 2] {
    match unscale {
        Some(range) => [
            unscale_value(pixel[0], range),
            unscale_value(pixel[1], range),
        ],
        None => [pixel[0], pixel[1]],
    }
}

/// Decode the magnitude of a pixel: the scalar value, or `hypot(u, v)` for
/// vector fields.
#[inline]
pub fn pixel_magnitude(pixel: &Pixel, kind: FieldKind, unscale: Option<[f32; 2]>) -> f32 {
    match kind {
        FieldKind::Scalar => pixel_scalar(pixel, unscale),
        FieldKind::Vector => {
            let [u, v] = pixel_vector(pixel, unscale);
            u.hypot(v)
        }
    }
}

/// Decode the meteorological direction of a pixel in degrees.
///
/// NaN for scalar fields; vector fields report the bearing the quantity
/// blows *from*, clockwise from north.
#[inline]
pub fn pixel_direction(pixel: &Pixel, kind: FieldKind, unscale: Option<[f32; 2]>) -> f32 {
    match kind {
        FieldKind::Scalar => f32::NAN,
        FieldKind::Vector => {
            let [u, v] = pixel_vector(pixel, unscale);
            vector_direction(u, v)
        }
    }
}

/// Meteorological "from" bearing of a (u, v) vector in degrees.
///
/// A pure westerly (u=1, v=0) reads 270 — wind from the west.
#[inline]
pub fn vector_direction(u: f32, v: f32) -> f32 {
    ((360.0 - (v.atan2(u).to_degrees() + 180.0)) - 270.0).rem_euclid(360.0)
}
