//! Raster snapshot types.

use crate::error::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// Whether a field carries one physical component or two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single component (temperature, pressure, significant wave height).
    Scalar,
    /// Two components u/v (wind, currents); magnitude and direction derive
    /// from the pair.
    Vector,
}

/// Pixel storage for a raster snapshot.
///
/// Byte-encoded snapshots are always 4-band RGBA where the data channels
/// map linearly into a physical range and the alpha channel flags no-data.
/// Native float snapshots carry 1 (scalar) or 2 (vector) bands and use NaN
/// for no-data.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldBuffer {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl FieldBuffer {
    /// Number of stored values.
    pub fn len(&self) -> usize {
        match self {
            FieldBuffer::U8(data) => data.len(),
            FieldBuffer::F32(data) => data.len(),
        }
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An immutable raster snapshot of a physical field.
///
/// `data` holds `width * height * bands` values in row-major order,
/// top-to-bottom. Construction validates the shape; a buffer that cannot
/// tile the grid with a supported band count is a programming error in the
/// producing decoder, reported as a fail-fast [`FieldError`].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterField {
    data: FieldBuffer,
    width: usize,
    height: usize,
    bands: usize,
}

impl RasterField {
    /// Create a raster snapshot, validating the buffer shape.
    ///
    /// Supported band counts: 1 or 2 for float buffers, exactly 4 for byte
    /// buffers (RGBA encoding).
    pub fn new(data: FieldBuffer, width: usize, height: usize) -> FieldResult<Self> {
        if width == 0 || height == 0 {
            return Err(FieldError::invalid_shape(data.len(), width, height));
        }
        let pixels = width * height;
        if data.len() % pixels != 0 {
            return Err(FieldError::invalid_shape(data.len(), width, height));
        }

        let bands = data.len() / pixels;
        match (&data, bands) {
            (FieldBuffer::F32(_), 1) | (FieldBuffer::F32(_), 2) => {}
            (FieldBuffer::F32(_), n) => {
                return Err(FieldError::unsupported_bands(
                    n,
                    "float snapshots carry 1 (scalar) or 2 (vector) bands",
                ));
            }
            (FieldBuffer::U8(_), 4) => {}
            (FieldBuffer::U8(_), n) => {
                return Err(FieldError::unsupported_bands(
                    n,
                    "byte-encoded snapshots are always 4-band RGBA",
                ));
            }
        }

        Ok(Self {
            data,
            width,
            height,
            bands,
        })
    }

    /// Convenience constructor for a native float snapshot.
    pub fn from_f32(data: Vec<f32>, width: usize, height: usize) -> FieldResult<Self> {
        Self::new(FieldBuffer::F32(data), width, height)
    }

    /// Convenience constructor for a byte-encoded RGBA snapshot.
    pub fn from_u8(data: Vec<u8>, width: usize, height: usize) -> FieldResult<Self> {
        Self::new(FieldBuffer::U8(data), width, height)
    }

    pub fn data(&self) -> &FieldBuffer {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bands per pixel: 1, 2, or 4.
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// True when the snapshot is byte-encoded (needs an unscale range).
    pub fn is_encoded(&self) -> bool {
        matches!(self.data, FieldBuffer::U8(_))
    }

    /// Check that another snapshot has the same shape and encoding, so the
    /// two can be temporally blended.
    pub fn check_blendable(&self, other: &RasterField) -> FieldResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(FieldError::snapshot_mismatch(format!(
                "dimensions differ: {}x{} vs {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        if self.bands != other.bands {
            return Err(FieldError::snapshot_mismatch(format!(
                "band counts differ: {} vs {}",
                self.bands, other.bands
            )));
        }
        if self.is_encoded() != other.is_encoded() {
            return Err(FieldError::snapshot_mismatch(
                "one snapshot is byte-encoded and the other is native float",
            ));
        }
        Ok(())
    }

    /// Read the raw (undecoded) pixel at integer coordinates as up to four
    /// f32 channels. Unused channels read 0.
    ///
    /// Callers are expected to pass in-range coordinates; this is the
    /// innermost read of every sampling loop.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        debug_assert!(x < self.width && y < self.height);
        let base = (y * self.width + x) * self.bands;
        let mut px = [0.0f32; 4];
        match &self.data {
            FieldBuffer::U8(data) => {
                for (c, slot) in px.iter_mut().enumerate().take(self.bands) {
                    *slot = data[base + c] as f32;
                }
            }
            FieldBuffer::F32(data) => {
                for (c, slot) in px.iter_mut().enumerate().take(self.bands) {
                    *slot = data[base + c];
                }
            }
        }
        px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_f32_shape() {
        let field = RasterField::from_f32(vec![1.0; 12], 4, 3).unwrap();
        assert_eq!(field.bands(), 1);
        assert!(!field.is_encoded());
    }

    #[test]
    fn test_vector_f32_shape() {
        let field = RasterField::from_f32(vec![0.0; 24], 4, 3).unwrap();
        assert_eq!(field.bands(), 2);
    }

    #[test]
    fn test_rgba_u8_shape() {
        let field = RasterField::from_u8(vec![0; 48], 4, 3).unwrap();
        assert_eq!(field.bands(), 4);
        assert!(field.is_encoded());
    }

    #[test]
    fn test_invalid_shapes_fail_fast() {
        assert!(RasterField::from_f32(vec![1.0; 13], 4, 3).is_err());
        assert!(RasterField::from_f32(vec![1.0; 36], 4, 3).is_err()); // 3 bands
        assert!(RasterField::from_u8(vec![0; 12], 4, 3).is_err()); // 1 band
        assert!(RasterField::from_f32(vec![], 0, 0).is_err());
    }

    #[test]
    fn test_pixel_read() {
        let field = RasterField::from_f32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
        assert_eq!(field.pixel(0, 0)[0], 1.0);
        assert_eq!(field.pixel(2, 1)[0], 6.0);

        let vector =
            RasterField::from_f32(vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0], 2, 2).unwrap();
        assert_eq!(vector.pixel(1, 1), [4.0, 40.0, 0.0, 0.0]);
    }

    #[test]
    fn test_blendable_check() {
        let a = RasterField::from_f32(vec![0.0; 6], 3, 2).unwrap();
        let b = RasterField::from_f32(vec![0.0; 6], 3, 2).unwrap();
        let c = RasterField::from_f32(vec![0.0; 6], 2, 3).unwrap();
        let d = RasterField::from_u8(vec![0; 24], 3, 2).unwrap();

        assert!(a.check_blendable(&b).is_ok());
        assert!(a.check_blendable(&c).is_err());
        assert!(a.check_blendable(&d).is_err());
    }
}
