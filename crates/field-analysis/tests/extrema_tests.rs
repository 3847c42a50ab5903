//! Tests for extrema detection.

use field_analysis::{detect_extrema, haversine_km, ExtremaConfig};
use fields_common::{BoundingBox, MagnitudeGrid};
use test_utils::{constant_grid, noisy_grid};

fn global_bounds() -> BoundingBox {
    BoundingBox::default()
}

/// A cone peaking at `(cx, cy)`: `peak - falloff * chebyshev_distance`,
/// floored at zero. Radially decreasing, so the blurred maximum stays on
/// the peak cell.
fn cone_grid(width: usize, height: usize, cx: usize, cy: usize, peak: f32, falloff: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let d = (x as i64 - cx as i64)
                .abs()
                .max((y as i64 - cy as i64).abs()) as f32;
            data.push((peak - falloff * d).max(0.0));
        }
    }
    data
}

#[test]
fn test_single_peak_4x4() {
    // All zeros except one 10.0 peak: exactly one HIGH at the peak's
    // geographic position carrying the unsmoothed value, and no LOWs.
    let mut data = vec![0.0f32; 16];
    data[5] = 10.0; // cell (1, 1)
    let grid = MagnitudeGrid::new(data, 4, 4).unwrap();
    let bounds = global_bounds();

    let set = detect_extrema(&grid, &bounds, &ExtremaConfig::new(1.0)).unwrap();
    assert_eq!(set.highs.len(), 1);
    assert!(set.lows.is_empty());

    let high = set.highs[0];
    assert_eq!(high.value, 10.0);
    // Node (1, 1) of a 4x4 global grid
    assert_eq!(high.position, [-90.0, 45.0]);
}

#[test]
fn test_flat_grid_has_no_extrema() {
    let grid = MagnitudeGrid::new(constant_grid(10, 10, 5.0), 10, 10).unwrap();
    let set = detect_extrema(&grid, &global_bounds(), &ExtremaConfig::new(100.0)).unwrap();
    assert!(set.highs.is_empty());
    assert!(set.lows.is_empty());
}

#[test]
fn test_sub_3x3_grid_has_no_extrema() {
    let grid = MagnitudeGrid::new(vec![1.0, 5.0, 2.0, 4.0], 2, 2).unwrap();
    let set = detect_extrema(&grid, &global_bounds(), &ExtremaConfig::new(1.0)).unwrap();
    assert!(set.highs.is_empty() && set.lows.is_empty());
}

#[test]
fn test_low_detection() {
    // An inverted cone: a single LOW at its bottom.
    let data: Vec<f32> = cone_grid(11, 9, 5, 4, 50.0, 10.0)
        .iter()
        .map(|v| 100.0 - v)
        .collect();
    let grid = MagnitudeGrid::new(data, 11, 9).unwrap();

    let set = detect_extrema(&grid, &global_bounds(), &ExtremaConfig::new(1.0)).unwrap();
    assert!(set.highs.is_empty());
    assert_eq!(set.lows.len(), 1);
    assert_eq!(set.lows[0].value, 50.0);
}

#[test]
fn test_suppression_keeps_the_stronger_high() {
    // Two cones half the globe apart; a huge radius keeps only the
    // stronger one, a small radius keeps both.
    let (width, height) = (20, 9);
    let a = cone_grid(width, height, 4, 4, 50.0, 10.0);
    let b = cone_grid(width, height, 14, 4, 40.0, 10.0);
    let data: Vec<f32> = a.iter().zip(b.iter()).map(|(x, y)| x + y).collect();
    let grid = MagnitudeGrid::new(data, width, height).unwrap();

    let both = detect_extrema(&grid, &global_bounds(), &ExtremaConfig::new(1000.0)).unwrap();
    assert_eq!(both.highs.len(), 2);
    assert_eq!(both.highs[0].value, 50.0); // strongest first

    let one = detect_extrema(&grid, &global_bounds(), &ExtremaConfig::new(19000.0)).unwrap();
    assert_eq!(one.highs.len(), 1);
    assert_eq!(one.highs[0].value, 50.0);
}

#[test]
fn test_survivors_respect_the_radius() {
    // Property: every surviving same-kind pair is at least the radius
    // apart, over an irregular generated grid.
    let (width, height) = (48, 24);
    let grid = MagnitudeGrid::new(noisy_grid(width, height, 7, 100.0), width, height).unwrap();
    let radius_km = 800.0;

    let set = detect_extrema(&grid, &global_bounds(), &ExtremaConfig::new(radius_km)).unwrap();
    for kind in [&set.highs, &set.lows] {
        for (i, a) in kind.iter().enumerate() {
            for b in kind.iter().skip(i + 1) {
                assert!(
                    haversine_km(a.position, b.position) >= radius_km,
                    "{:?} and {:?} are closer than {radius_km} km",
                    a,
                    b
                );
            }
        }
    }
}

#[test]
fn test_detection_is_deterministic() {
    let grid = MagnitudeGrid::new(noisy_grid(32, 16, 3, 50.0), 32, 16).unwrap();
    let config = ExtremaConfig::new(500.0);

    let first = detect_extrema(&grid, &global_bounds(), &config).unwrap();
    let second = detect_extrema(&grid, &global_bounds(), &config).unwrap();
    assert_eq!(first, second);
}
