//! Grid smoothing shared by the analysis passes.

/// One pass of an interior-only 3x3 box blur.
///
/// Interior cells become the plain average of themselves and their eight
/// neighbors; border cells pass through unmodified. NaN anywhere in the
/// window keeps the cell NaN, so no-data regions neither shrink nor leak
/// fabricated values.
pub fn box_blur_interior(data: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut out = data.to_vec();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sum = 0.0f32;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let sx = (x as i32 + dx) as usize;
                    let sy = (y as i32 + dy) as usize;
                    sum += data[sy * width + sx];
                }
            }
            out[y * width + x] = sum / 9.0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_passes_through() {
        let data: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let blurred = box_blur_interior(&data, 4, 4);

        for x in 0..4 {
            assert_eq!(blurred[x], data[x]); // top row
            assert_eq!(blurred[12 + x], data[12 + x]); // bottom row
        }
        for y in 0..4 {
            assert_eq!(blurred[y * 4], data[y * 4]); // left column
            assert_eq!(blurred[y * 4 + 3], data[y * 4 + 3]); // right column
        }
    }

    #[test]
    fn test_interior_is_nine_cell_mean() {
        let mut data = vec![0.0f32; 9];
        data[4] = 9.0; // center of a 3x3 grid
        let blurred = box_blur_interior(&data, 3, 3);
        assert_eq!(blurred[4], 1.0);
    }

    #[test]
    fn test_nan_keeps_cell_nan() {
        let mut data = vec![1.0f32; 9];
        data[0] = f32::NAN;
        let blurred = box_blur_interior(&data, 3, 3);
        assert!(blurred[4].is_nan());
    }

    #[test]
    fn test_small_grid_is_untouched() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(box_blur_interior(&data, 2, 2), data);
    }
}
