//! Materialized magnitude grids.

use crate::error::{FieldError, FieldResult};

/// A full-resolution grid of decoded magnitude values.
///
/// This is the interchange format between the sampler (which materializes
/// one value per raster pixel) and the analysis passes (isoline extraction,
/// extrema detection). Values are physical units; NaN marks no-data cells.
/// Row-major order, top-to-bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeGrid {
    /// The grid values (row-major order, top-to-bottom).
    pub data: Vec<f32>,
    /// Width of the grid in cells.
    pub width: usize,
    /// Height of the grid in cells.
    pub height: usize,
}

impl MagnitudeGrid {
    /// Create a grid, validating that the buffer tiles `width x height`.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> FieldResult<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(FieldError::invalid_shape(data.len(), width, height));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Read the value at integer cell coordinates.
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    /// NaN-aware minimum and maximum, or None when every cell is no-data.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        let (min, max) = self
            .data
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });
        if min.is_finite() && max.is_finite() {
            Some((min, max))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_validation() {
        assert!(MagnitudeGrid::new(vec![0.0; 6], 3, 2).is_ok());
        assert!(MagnitudeGrid::new(vec![0.0; 5], 3, 2).is_err());
        assert!(MagnitudeGrid::new(vec![], 0, 0).is_err());
    }

    #[test]
    fn test_value_range_skips_nan() {
        let grid = MagnitudeGrid::new(vec![1.0, f32::NAN, 3.0, -2.0], 2, 2).unwrap();
        assert_eq!(grid.value_range(), Some((-2.0, 3.0)));

        let empty = MagnitudeGrid::new(vec![f32::NAN; 4], 2, 2).unwrap();
        assert_eq!(empty.value_range(), None);
    }
}
