//! Point queries against a sampled field.
//!
//! Combines the sampler and the projection to answer "what is the field
//! value/direction at geographic position P", with bounds, no-data, and
//! value-range rejection. Used by tooltip/picking UIs and particle
//! advection seeding.

use crate::codec::vector_direction;
use crate::projection::{wrap_longitude_from, FieldProjection};
use crate::sampler::SamplerSource;
use fields_common::{BoundingBox, FieldKind};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// The value of a field at one geographic position.
///
/// `value` is NaN exactly when the position falls outside the field
/// bounds, hits a no-data pixel, or is rejected by the configured value
/// range. `direction` is present only for valid vector samples, in
/// meteorological degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSample {
    pub value: f32,
    pub direction: Option<f32>,
}

impl PointSample {
    /// The rejected/no-data sample.
    pub fn no_data() -> Self {
        Self {
            value: f32::NAN,
            direction: None,
        }
    }

    /// True when the sample carries a usable value.
    pub fn is_valid(&self) -> bool {
        !self.value.is_nan()
    }
}

/// Sample the field at a single `[lon, lat]` position.
pub fn sample_point(
    source: &SamplerSource,
    bounds: &BoundingBox,
    position: [f64; 2],
) -> PointSample {
    let lon = wrap_longitude_from(position[0], bounds.min_lon);
    let lat = position[1];
    if !bounds.contains(lon, lat) {
        return PointSample::no_data();
    }

    let proj = FieldProjection::new(*bounds, source.width(), source.height());
    let (x, y) = proj.project(lon, lat);
    let u = x / source.width() as f64;
    let v = y / source.height() as f64;

    let [cu, cv] = source.vector_at(u, v);
    let value = match source.kind() {
        FieldKind::Scalar => cu,
        FieldKind::Vector => cu.hypot(cv),
    };
    if value.is_nan() {
        return PointSample::no_data();
    }

    // Clamp bounds reject only when configured as finite numbers.
    if let Some(min) = source.min_value() {
        if min.is_finite() && value < min {
            return PointSample::no_data();
        }
    }
    if let Some(max) = source.max_value() {
        if max.is_finite() && value > max {
            return PointSample::no_data();
        }
    }

    let direction = match source.kind() {
        FieldKind::Scalar => None,
        FieldKind::Vector => Some(vector_direction(cu, cv)),
    };
    PointSample { value, direction }
}

/// Sample the field at many positions.
///
/// Each position is independent, so the batch fans out across the rayon
/// pool; results keep the input order.
pub fn sample_points(
    source: &SamplerSource,
    bounds: &BoundingBox,
    positions: &[[f64; 2]],
) -> Vec<PointSample> {
    positions
        .par_iter()
        .map(|&position| sample_point(source, bounds, position))
        .collect()
}
