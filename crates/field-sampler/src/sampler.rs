//! Temporal/spatial sampling over one or two raster snapshots.
//!
//! A [`SamplerSource`] bundles the current snapshot, the optional next
//! time step, and the sampling parameters (blend weight, unscale range,
//! clamp bounds, smoothing, kernel). Sampling decodes each snapshot
//! independently and blends the *decoded* physical values; raw encoded
//! bytes are never mixed across time steps.

use crate::codec::{has_pixel_value, pixel_scalar, pixel_vector, Pixel};
use crate::interpolation::{
    bilinear_pixel, cubic_pixel, nearest_pixel, InterpolationMethod, TexelView,
};
use fields_common::{FieldError, FieldKind, FieldResult, MagnitudeGrid, RasterField};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sampling parameters for a [`SamplerSource`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplerOptions {
    /// Temporal blend weight in [0, 1]; 0 samples the current snapshot only.
    pub weight: f32,
    /// Linear byte-to-physical range for byte-encoded snapshots; None means
    /// the data is already physical float.
    pub unscale: Option<[f32; 2]>,
    /// Reject samples below this bound (only applied when finite).
    pub min_value: Option<f32>,
    /// Reject samples above this bound (only applied when finite).
    pub max_value: Option<f32>,
    /// Resolution-reduction exponent: the raster is sampled as if
    /// downscaled by `2^smoothing` texels per axis.
    pub smoothing: u32,
    /// Resampling kernel for point queries.
    pub interpolation: InterpolationMethod,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            weight: 0.0,
            unscale: None,
            min_value: None,
            max_value: None,
            smoothing: 0,
            interpolation: InterpolationMethod::default(),
        }
    }
}

/// One or two time-indexed snapshots plus sampling parameters.
///
/// Construction validates the snapshot/parameter combination and fails
/// fast on unsupported encodings or mismatched snapshots; sampling itself
/// never errors, it reports no-data as NaN.
#[derive(Debug, Clone)]
pub struct SamplerSource {
    current: RasterField,
    next: Option<RasterField>,
    kind: FieldKind,
    weight: f32,
    unscale: Option<[f32; 2]>,
    min_value: Option<f32>,
    max_value: Option<f32>,
    smoothing: u32,
    interpolation: InterpolationMethod,
}

impl SamplerSource {
    pub fn new(
        current: RasterField,
        next: Option<RasterField>,
        kind: FieldKind,
        options: SamplerOptions,
    ) -> FieldResult<Self> {
        if !(0.0..=1.0).contains(&options.weight) {
            return Err(FieldError::invalid_parameter(
                "weight",
                format!("blend weight {} is outside [0, 1]", options.weight),
            ));
        }
        if let Some([min, max]) = options.unscale {
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(FieldError::invalid_parameter(
                    "unscale",
                    format!("unscale range [{min}, {max}] is not an increasing finite range"),
                ));
            }
        }
        match (current.is_encoded(), options.unscale.is_some()) {
            (true, false) => {
                return Err(FieldError::UnsupportedEncoding(
                    "byte-encoded snapshot requires an unscale range".to_string(),
                ));
            }
            (false, true) => {
                return Err(FieldError::UnsupportedEncoding(
                    "unscale range only applies to byte-encoded snapshots".to_string(),
                ));
            }
            _ => {}
        }
        if !current.is_encoded() {
            let expected = match kind {
                FieldKind::Scalar => 1,
                FieldKind::Vector => 2,
            };
            if current.bands() != expected {
                return Err(FieldError::unsupported_bands(
                    current.bands(),
                    format!("{kind:?} float snapshots carry {expected} band(s)"),
                ));
            }
        }
        if let Some(next) = &next {
            current.check_blendable(next)?;
        }

        Ok(Self {
            current,
            next,
            kind,
            weight: options.weight,
            unscale: options.unscale,
            min_value: options.min_value,
            max_value: options.max_value,
            smoothing: options.smoothing,
            interpolation: options.interpolation,
        })
    }

    pub fn width(&self) -> usize {
        self.current.width()
    }

    pub fn height(&self) -> usize {
        self.current.height()
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn min_value(&self) -> Option<f32> {
        self.min_value
    }

    pub fn max_value(&self) -> Option<f32> {
        self.max_value
    }

    /// Sample the current snapshot's raw pixel at normalized coordinates
    /// `u, v` in [0, 1] with the configured kernel and smoothing.
    pub fn sample_pixel(&self, u: f64, v: f64) -> Pixel {
        self.field_pixel(&self.current, u, v, self.interpolation)
    }

    fn field_pixel(
        &self,
        field: &RasterField,
        u: f64,
        v: f64,
        method: InterpolationMethod,
    ) -> Pixel {
        let view = TexelView::new(field, self.smoothing);
        let x = (u * view.width() as f64 - 0.5).clamp(0.0, (view.width() - 1) as f64);
        let y = (v * view.height() as f64 - 0.5).clamp(0.0, (view.height() - 1) as f64);
        match method {
            InterpolationMethod::Nearest => nearest_pixel(&view, x, y),
            InterpolationMethod::Bilinear => bilinear_pixel(&view, x, y),
            InterpolationMethod::Cubic => cubic_pixel(&view, x, y),
        }
    }

    fn decoded_scalar(
        &self,
        field: &RasterField,
        u: f64,
        v: f64,
        method: InterpolationMethod,
    ) -> f32 {
        let px = self.field_pixel(field, u, v, method);
        if !has_pixel_value(&px, self.unscale) {
            return f32::NAN;
        }
        pixel_scalar(&px, self.unscale)
    }

    fn decoded_vector(
        &self,
        field: &RasterField,
        u: f64,
        v: f64,
        method: InterpolationMethod,
    ) -> [f32; 2] {
        let px = self.field_pixel(field, u, v, method);
        if !has_pixel_value(&px, self.unscale) {
            return [f32::NAN, f32::NAN];
        }
        pixel_vector(&px, self.unscale)
    }

    /// Decoded and temporally blended (u, v) components at `u, v` with a
    /// specific kernel. NaN components mark no-data. Scalar fields report
    /// their value in the first component.
    pub fn vector_with(&self, u: f64, v: f64, method: InterpolationMethod) -> [f32; 2] {
        match self.kind {
            FieldKind::Scalar => [self.scalar_with(u, v, method), 0.0],
            FieldKind::Vector => {
                let a = self.decoded_vector(&self.current, u, v, method);
                match &self.next {
                    Some(next) if self.weight > 0.0 => {
                        let b = self.decoded_vector(next, u, v, method);
                        [
                            mix(a[0], b[0], self.weight),
                            mix(a[1], b[1], self.weight),
                        ]
                    }
                    _ => a,
                }
            }
        }
    }

    fn scalar_with(&self, u: f64, v: f64, method: InterpolationMethod) -> f32 {
        let a = self.decoded_scalar(&self.current, u, v, method);
        match &self.next {
            Some(next) if self.weight > 0.0 => {
                mix(a, self.decoded_scalar(next, u, v, method), self.weight)
            }
            _ => a,
        }
    }

    /// Decoded, blended magnitude at `u, v` with a specific kernel.
    pub fn magnitude_with(&self, u: f64, v: f64, method: InterpolationMethod) -> f32 {
        match self.kind {
            FieldKind::Scalar => self.scalar_with(u, v, method),
            FieldKind::Vector => {
                let [vu, vv] = self.vector_with(u, v, method);
                vu.hypot(vv)
            }
        }
    }

    /// Decoded, blended magnitude at `u, v` with the configured kernel.
    pub fn magnitude_at(&self, u: f64, v: f64) -> f32 {
        self.magnitude_with(u, v, self.interpolation)
    }

    /// Blended (u, v) components at `u, v` with the configured kernel.
    pub fn vector_at(&self, u: f64, v: f64) -> [f32; 2] {
        self.vector_with(u, v, self.interpolation)
    }

    /// Materialize one magnitude value per native-resolution pixel.
    ///
    /// The kernel is forced to nearest here: full-grid bilinear/bicubic
    /// resampling takes seconds on megapixel grids and is reserved for
    /// point queries. Smoothing and temporal blending still apply.
    pub fn materialize_magnitude(&self) -> MagnitudeGrid {
        let width = self.width();
        let height = self.height();
        let mut data = vec![f32::NAN; width * height];
        let mut nan_count = 0usize;

        for y in 0..height {
            let v = (y as f64 + 0.5) / height as f64;
            for x in 0..width {
                let u = (x as f64 + 0.5) / width as f64;
                let value = self.magnitude_with(u, v, InterpolationMethod::Nearest);
                if value.is_nan() {
                    nan_count += 1;
                }
                data[y * width + x] = value;
            }
        }

        debug!(
            width = width,
            height = height,
            smoothing = self.smoothing,
            nan_count = nan_count,
            "Materialized magnitude grid"
        );

        MagnitudeGrid {
            data,
            width,
            height,
        }
    }
}

/// Linear blend with exact endpoints: `w <= 0` returns `a` untouched and
/// `w >= 1` returns `b` untouched, so a no-data value on the unused side
/// cannot leak into the result.
#[inline]
fn mix(a: f32, b: f32, w: f32) -> f32 {
    if w <= 0.0 {
        a
    } else if w >= 1.0 {
        b
    } else {
        a * (1.0 - w) + b * w
    }
}
