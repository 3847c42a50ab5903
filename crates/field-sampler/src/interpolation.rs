//! Resampling kernels for raster snapshots.
//!
//! All kernels operate on a [`TexelView`], which presents a snapshot at an
//! optionally reduced resolution (see [`TexelView::new`]). Coordinates are
//! continuous texel positions with texel centers at integer coordinates;
//! edge texels clamp on both axes. Longitude wrapping is the projection's
//! responsibility, not the kernels'.

use crate::codec::Pixel;
use fields_common::RasterField;
use serde::{Deserialize, Serialize};

/// Cap on the resolution-reduction exponent so the block size fits usize.
const MAX_SMOOTHING: u32 = 16;

/// Resampling kernel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Single nearest texel.
    Nearest,
    /// Bilinear over the 4 enclosing texels.
    #[default]
    Bilinear,
    /// Catmull-Rom bicubic over the 16 enclosing texels.
    Cubic,
}

/// A raster snapshot viewed at a reduced resolution.
///
/// A smoothing level of `s` treats the raster as downscaled by `2^s` texels
/// per axis; each reduced texel reads as the plain box-average of its
/// source block (NaN poisons the average, and a byte block containing
/// no-data averages to an alpha below 255, so reduced texels straddling
/// missing data stay flagged as no-data). Level 0 is a zero-cost
/// passthrough.
pub struct TexelView<'a> {
    field: &'a RasterField,
    shift: u32,
    width: usize,
    height: usize,
}

impl<'a> TexelView<'a> {
    pub fn new(field: &'a RasterField, smoothing: u32) -> Self {
        let shift = smoothing.min(MAX_SMOOTHING);
        let step = 1usize << shift;
        Self {
            field,
            shift,
            width: field.width().div_ceil(step).max(1),
            height: field.height().div_ceil(step).max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read a texel, averaging the underlying source block when the view is
    /// reduced. Edge blocks truncated by the raster border average over the
    /// texels that exist.
    pub fn texel(&self, x: usize, y: usize) -> Pixel {
        if self.shift == 0 {
            return self.field.pixel(x, y);
        }

        let step = 1usize << self.shift;
        let x0 = x * step;
        let y0 = y * step;
        let x1 = (x0 + step).min(self.field.width());
        let y1 = (y0 + step).min(self.field.height());

        let mut sum = [0.0f32; 4];
        let mut count = 0u32;
        for sy in y0..y1 {
            for sx in x0..x1 {
                let px = self.field.pixel(sx, sy);
                for (acc, channel) in sum.iter_mut().zip(px.iter()) {
                    *acc += channel;
                }
                count += 1;
            }
        }

        let n = count as f32;
        [sum[0] / n, sum[1] / n, sum[2] / n, sum[3] / n]
    }
}

/// Nearest-neighbor kernel: the single nearest texel.
pub fn nearest_pixel(view: &TexelView, x: f64, y: f64) -> Pixel {
    let col = (x.round() as isize).clamp(0, view.width() as isize - 1) as usize;
    let row = (y.round() as isize).clamp(0, view.height() as isize - 1) as usize;
    view.texel(col, row)
}

/// Bilinear kernel over the 4 enclosing texels.
///
/// NaN in any contributing channel propagates through the arithmetic, so a
/// no-data corner poisons the interpolated pixel.
pub fn bilinear_pixel(view: &TexelView, x: f64, y: f64) -> Pixel {
    let x0 = (x.floor() as isize).clamp(0, view.width() as isize - 1) as usize;
    let y0 = (y.floor() as isize).clamp(0, view.height() as isize - 1) as usize;
    let x1 = (x0 + 1).min(view.width() - 1);
    let y1 = (y0 + 1).min(view.height() - 1);

    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let p00 = view.texel(x0, y0);
    let p10 = view.texel(x1, y0);
    let p01 = view.texel(x0, y1);
    let p11 = view.texel(x1, y1);

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        out[c] = top * (1.0 - fy) + bottom * fy;
    }
    out
}

/// Catmull-Rom bicubic kernel over the 16 enclosing texels.
///
/// Falls back to bilinear when the 4x4 window touches a NaN texel, so a
/// no-data region does not bleed ringing artifacts into valid cells.
pub fn cubic_pixel(view: &TexelView, x: f64, y: f64) -> Pixel {
    let xi = x.floor() as i64;
    let yi = y.floor() as i64;
    let fx = (x - xi as f64) as f32;
    let fy = (y - yi as f64) as f32;

    let mut window = [[[0.0f32; 4]; 4]; 4];
    for j in 0..4i64 {
        for i in 0..4i64 {
            let px = (xi + i - 1).clamp(0, view.width() as i64 - 1) as usize;
            let py = (yi + j - 1).clamp(0, view.height() as i64 - 1) as usize;
            let texel = view.texel(px, py);
            if texel[0].is_nan() {
                return bilinear_pixel(view, x, y);
            }
            window[j as usize][i as usize] = texel;
        }
    }

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let mut rows = [0.0f32; 4];
        for j in 0..4 {
            rows[j] = cubic_1d(
                window[j][0][c],
                window[j][1][c],
                window[j][2][c],
                window[j][3][c],
                fx,
            );
        }
        out[c] = cubic_1d(rows[0], rows[1], rows[2], rows[3], fy);
    }
    out
}

/// 1D cubic interpolation using a Catmull-Rom spline.
fn cubic_1d(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}
