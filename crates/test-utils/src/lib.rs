//! Shared test utilities for the weather-fields workspace.

pub mod generators;

pub use generators::{
    constant_grid, encode_scalar_rgba, noisy_grid, peak_grid, ramp_grid, uniform_vector_field,
};
