//! Field decoding and sampling.
//!
//! Turns encoded raster snapshots into point samples and full-resolution
//! magnitude grids:
//! - Pixel codec (no-data convention, linear unscale, magnitude/direction)
//! - Resampling kernels (nearest/bilinear/bicubic) with an optional
//!   resolution-reduction pre-pass
//! - Temporal blending between two time-indexed snapshots
//! - Equirectangular geographic <-> pixel projection
//! - Point sampling API with bounds/no-data/value-range rejection

pub mod codec;
pub mod interpolation;
pub mod point;
pub mod projection;
pub mod sampler;

pub use codec::{
    has_pixel_value, pixel_direction, pixel_magnitude, pixel_scalar, pixel_vector, unscale_value,
    vector_direction, Pixel,
};
pub use interpolation::{bilinear_pixel, cubic_pixel, nearest_pixel, InterpolationMethod, TexelView};
pub use point::{sample_point, sample_points, PointSample};
pub use projection::{wrap_longitude, wrap_longitude_from, FieldProjection};
pub use sampler::{SamplerOptions, SamplerSource};
