//! Isoline (contour) extraction from magnitude grids.
//!
//! Produces geographic contour polylines at a fixed value interval from a
//! full-resolution magnitude grid. The pipeline runs as explicit stages:
//!
//! 1. Antimeridian sewing (globe-wrapping grids only): a one-texel buffer
//!    column on each side so sampling near the seam sees continuous data
//! 2. Interior-only 3x3 box blur to suppress pixel-level noise
//! 3. Threshold generation at every multiple of the interval in range
//! 4. Marching squares per threshold, with a virtual below-everything
//!    frame so rings close at the grid border
//! 5. Unframing: clip against an interior rectangle inset by an epsilon
//!    from the grid border
//! 6. Integer pixel bbox noise rejection
//! 7. Buffer-offset removal and unprojection to geographic coordinates
//! 8. Re-clip at the data bounds when sewing was used, splitting lines
//!    that crossed back over the seam
//!
//! The result is deterministic for identical grid and config inputs.

use crate::blur::box_blur_interior;
use crate::clip::{clip_polyline, ClipRect};
use crate::config::IsolineConfig;
use crate::error::Result;
use field_sampler::FieldProjection;
use fields_common::{BoundingBox, MagnitudeGrid};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inset from the grid border used when unframing. Non-zero so that
/// frame-hugging ring sections are removed instead of surviving as
/// exact-border degenerate segments.
const UNFRAME_EPSILON: f64 = 1e-6;

/// Tolerance for matching segment endpoints while chaining.
const CHAIN_EPSILON: f64 = 1e-3;

/// A contour polyline in geographic coordinates (a line, not a polygon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isoline {
    /// `[lon, lat]` vertices.
    pub coordinates: Vec<[f64; 2]>,
    /// The threshold this line traces.
    pub value: f32,
}

/// True when `value` sits on a multiple of `major_interval`, the caller's
/// criterion for promoting a contour to the major subset.
pub fn is_major_level(value: f32, major_interval: f32) -> bool {
    if !major_interval.is_finite() || major_interval <= 0.0 {
        return false;
    }
    let ratio = value / major_interval;
    (ratio - ratio.round()).abs() < 1e-3
}

/// Extract contour polylines from a magnitude grid.
pub fn extract_isolines(
    grid: &MagnitudeGrid,
    bounds: &BoundingBox,
    config: &IsolineConfig,
) -> Result<Vec<Isoline>> {
    config.validate()?;
    if grid.width < 2 || grid.height < 2 {
        return Ok(Vec::new());
    }

    // Stage 1: sew the seam so marching squares sees continuous data.
    let sewn = sew_antimeridian(grid, bounds);

    // Stage 2: one blur pass; spurious single-pixel contours cost more to
    // filter later than to prevent here.
    let blurred = box_blur_interior(&sewn.data, sewn.width, sewn.height);

    // Stage 3: thresholds from the blurred grid's NaN-aware range.
    let (min_value, max_value) = blurred
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });
    if !min_value.is_finite() || !max_value.is_finite() {
        // Every cell is no-data.
        return Ok(Vec::new());
    }
    let levels = threshold_levels(min_value, max_value, config.interval);

    debug!(
        width = grid.width,
        height = grid.height,
        sew_buffer = sewn.buffer_left + sewn.buffer_right,
        min_value = min_value,
        max_value = max_value,
        num_levels = levels.len(),
        "Extracting isolines"
    );

    // Stage 4: marching squares per threshold. Levels are independent, so
    // they fan out across the rayon pool; collect preserves level order.
    let frame_value = min_value - config.interval;
    let per_level: Vec<(f32, Vec<Vec<[f64; 2]>>)> = levels
        .par_iter()
        .map(|&level| {
            let segments =
                march_squares_framed(&blurred, sewn.width, sewn.height, level, frame_value);
            (level, chain_segments(segments))
        })
        .collect();

    // Stages 5-8 per polyline.
    let unframe_rect = ClipRect::new(
        UNFRAME_EPSILON,
        UNFRAME_EPSILON,
        (sewn.width - 1) as f64 - UNFRAME_EPSILON,
        (sewn.height - 1) as f64 - UNFRAME_EPSILON,
    );
    let proj = FieldProjection::new(*bounds, grid.width, grid.height);
    let data_rect = ClipRect::new(bounds.min_lon, bounds.min_lat, bounds.max_lon, bounds.max_lat);

    let mut isolines = Vec::new();
    for (level, polylines) in per_level {
        for polyline in polylines {
            for part in clip_polyline(&polyline, &unframe_rect) {
                if !spans_at_least(&part, config.min_feature_px) {
                    continue;
                }

                let geographic: Vec<[f64; 2]> = part
                    .iter()
                    .map(|&[x, y]| {
                        let (lon, lat) = proj.unproject(x - sewn.buffer_left as f64, y);
                        [lon, lat]
                    })
                    .collect();

                if sewn.buffer_left > 0 {
                    // Sewing can produce lines reaching back across the
                    // seam; the final clip splits them at the data bounds.
                    for seam_part in clip_polyline(&geographic, &data_rect) {
                        isolines.push(Isoline {
                            coordinates: seam_part,
                            value: level,
                        });
                    }
                } else {
                    isolines.push(Isoline {
                        coordinates: geographic,
                        value: level,
                    });
                }
            }
        }
    }

    debug!(num_isolines = isolines.len(), "Extracted isolines");
    Ok(isolines)
}

/// A grid with antimeridian buffer columns attached.
struct SewnGrid {
    data: Vec<f32>,
    width: usize,
    height: usize,
    /// Buffer columns prepended before column 0.
    buffer_left: usize,
    /// Buffer columns appended after the last column.
    buffer_right: usize,
}

/// Stage 1: duplicate the last column before column 0 and the first column
/// after the last, so marching squares near the seam sees continuous data.
/// Non-cyclic bounds pass through with zero buffers.
fn sew_antimeridian(grid: &MagnitudeGrid, bounds: &BoundingBox) -> SewnGrid {
    if !bounds.is_cyclic() {
        return SewnGrid {
            data: grid.data.clone(),
            width: grid.width,
            height: grid.height,
            buffer_left: 0,
            buffer_right: 0,
        };
    }

    let width = grid.width + 2;
    let mut data = Vec::with_capacity(width * grid.height);
    for y in 0..grid.height {
        let row = &grid.data[y * grid.width..(y + 1) * grid.width];
        data.push(row[grid.width - 1]);
        data.extend_from_slice(row);
        data.push(row[0]);
    }

    SewnGrid {
        data,
        width,
        height: grid.height,
        buffer_left: 1,
        buffer_right: 1,
    }
}

/// Stage 3: every multiple of `interval` from `ceil(min/interval)` to
/// `floor(max/interval)` inclusive. Indexed stepping avoids accumulation
/// drift dropping the last level.
fn threshold_levels(min: f32, max: f32, interval: f32) -> Vec<f32> {
    if interval <= 0.0 || max < min {
        return Vec::new();
    }
    let start = (min / interval).ceil();
    let end = (max / interval).floor();
    if end < start {
        return Vec::new();
    }
    (0..=(end - start) as i64)
        .map(|i| (start + i as f32) * interval)
        .collect()
}

/// A contour line segment in pixel coordinates.
#[derive(Debug, Clone, Copy)]
struct Segment {
    start: [f64; 2],
    end: [f64; 2],
}

/// Stage 4: marching squares over the grid extended by a virtual frame of
/// `frame_value` (strictly below every threshold). The frame guarantees
/// that every contour closes into a ring at the grid border, which the
/// unframing clip then removes. Cells touching NaN produce no geometry.
fn march_squares_framed(
    data: &[f32],
    width: usize,
    height: usize,
    level: f32,
    frame_value: f32,
) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return Vec::new();
    }

    let value_at = |x: i64, y: i64| -> f32 {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            frame_value
        } else {
            data[y as usize * width + x as usize]
        }
    };

    let mut segments = Vec::new();
    for y in -1..height as i64 {
        for x in -1..width as i64 {
            let tl = value_at(x, y);
            let tr = value_at(x + 1, y);
            let bl = value_at(x, y + 1);
            let br = value_at(x + 1, y + 1);

            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut cell_index = 0u8;
            if tl >= level {
                cell_index |= 1;
            }
            if tr >= level {
                cell_index |= 2;
            }
            if br >= level {
                cell_index |= 4;
            }
            if bl >= level {
                cell_index |= 8;
            }

            cell_segments(
                cell_index, x as f64, y as f64, tl, tr, br, bl, level, &mut segments,
            );
        }
    }

    segments
}

/// Emit the segments for one marching squares cell, interpolating the
/// crossing position along each crossed edge.
fn cell_segments(
    cell_index: u8,
    x: f64,
    y: f64,
    tl: f32,
    tr: f32,
    br: f32,
    bl: f32,
    level: f32,
    segments: &mut Vec<Segment>,
) {
    let top = interpolate_edge(x, y, x + 1.0, y, tl, tr, level);
    let right = interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
    let bottom = interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
    let left = interpolate_edge(x, y, x, y + 1.0, tl, bl, level);

    let mut push = |start: [f64; 2], end: [f64; 2]| segments.push(Segment { start, end });

    match cell_index {
        0 | 15 => {}
        1 | 14 => push(left, top),
        2 | 13 => push(top, right),
        3 | 12 => push(left, right),
        4 | 11 => push(right, bottom),
        5 => {
            // Saddle: two separate segments
            push(left, top);
            push(right, bottom);
        }
        6 | 9 => push(top, bottom),
        7 | 8 => push(left, bottom),
        10 => {
            // Saddle: two separate segments
            push(top, right);
            push(left, bottom);
        }
        _ => {}
    }
}

/// Find where the contour level crosses an edge between two corner values.
fn interpolate_edge(x1: f64, y1: f64, x2: f64, y2: f64, val1: f32, val2: f32, level: f32) -> [f64; 2] {
    if (val2 - val1).abs() < 1e-6 {
        // Values essentially equal: use the midpoint.
        return [(x1 + x2) / 2.0, (y1 + y2) / 2.0];
    }

    let t = (((level - val1) / (val2 - val1)) as f64).clamp(0.0, 1.0);
    [x1 + t * (x2 - x1), y1 + t * (y2 - y1)]
}

/// Chain unordered segments into continuous polylines by matching
/// endpoints within a tolerance.
fn chain_segments(segments: Vec<Segment>) -> Vec<Vec<[f64; 2]>> {
    let mut polylines = Vec::new();
    let mut used = vec![false; segments.len()];

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }

        let mut points = vec![segments[start_idx].start, segments[start_idx].end];
        used[start_idx] = true;

        let mut changed = true;
        while changed {
            changed = false;
            let tail = *points.last().unwrap();

            for (i, segment) in segments.iter().enumerate() {
                if used[i] {
                    continue;
                }

                if distance(segment.start, tail) < CHAIN_EPSILON {
                    points.push(segment.end);
                    used[i] = true;
                    changed = true;
                    break;
                } else if distance(segment.end, tail) < CHAIN_EPSILON {
                    points.push(segment.start);
                    used[i] = true;
                    changed = true;
                    break;
                }
            }
        }

        if points.len() >= 2 {
            polylines.push(points);
        }
    }

    polylines
}

#[inline]
fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Stage 6: integer pixel bbox test. A polyline survives when its bbox
/// spans at least `min_span` pixels on at least one axis, so thin-but-long
/// lines survive while speck-sized blobs are rejected.
fn spans_at_least(points: &[[f64; 2]], min_span: i64) -> bool {
    if min_span <= 0 {
        return true;
    }
    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    let mut max_x = i64::MIN;
    let mut max_y = i64::MIN;
    for p in points {
        min_x = min_x.min(p[0].floor() as i64);
        min_y = min_y.min(p[1].floor() as i64);
        max_x = max_x.max(p[0].ceil() as i64);
        max_y = max_y.max(p[1].ceil() as i64);
    }
    (max_x - min_x) >= min_span || (max_y - min_y) >= min_span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_levels() {
        assert_eq!(threshold_levels(0.0, 20.0, 5.0), vec![0.0, 5.0, 10.0, 15.0, 20.0]);
        assert_eq!(threshold_levels(2.0, 18.0, 5.0), vec![5.0, 10.0, 15.0]);
        assert_eq!(threshold_levels(-12.0, 12.0, 10.0), vec![-10.0, 0.0, 10.0]);
        assert!(threshold_levels(3.0, 4.0, 5.0).is_empty());
        assert!(threshold_levels(10.0, 0.0, 5.0).is_empty());
    }

    #[test]
    fn test_interpolate_edge_midpoint_and_linear() {
        let p = interpolate_edge(0.0, 0.0, 1.0, 0.0, 0.0, 10.0, 5.0);
        assert!((p[0] - 0.5).abs() < 1e-9);

        let p = interpolate_edge(0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 5.0);
        assert_eq!(p, [0.5, 0.0]);
    }

    #[test]
    fn test_march_flat_grid_has_no_interior_contour() {
        // A flat grid at the level only produces the frame ring.
        let data = vec![5.0; 9];
        let segments = march_squares_framed(&data, 3, 3, 5.0, -5.0);
        // Every crossing sits on the border band between frame and data.
        for segment in &segments {
            for p in [segment.start, segment.end] {
                let on_border_band = p[0] <= 0.0 || p[0] >= 2.0 || p[1] <= 0.0 || p[1] >= 2.0;
                assert!(on_border_band, "unexpected interior point {p:?}");
            }
        }
    }

    #[test]
    fn test_march_peak_produces_ring() {
        let data = vec![0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0];
        let segments = march_squares_framed(&data, 3, 3, 5.0, -10.0);
        assert!(!segments.is_empty());

        let polylines = chain_segments(segments);
        // A single closed ring around the center cell.
        assert_eq!(polylines.len(), 1);
        let ring = &polylines[0];
        assert!(distance(ring[0], *ring.last().unwrap()) < CHAIN_EPSILON);
    }

    #[test]
    fn test_spans_filter() {
        let long_thin = vec![[2.0, 0.0], [2.0, 7.0]];
        assert!(spans_at_least(&long_thin, 4));

        let speck = vec![[2.0, 2.0], [2.5, 2.5], [2.0, 3.0]];
        assert!(!spans_at_least(&speck, 4));
    }

    #[test]
    fn test_sew_duplicates_edge_columns() {
        let grid = MagnitudeGrid::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
        let cyclic = BoundingBox::new(-180.0, -30.0, 180.0, 30.0);
        let sewn = sew_antimeridian(&grid, &cyclic);

        assert_eq!(sewn.width, 5);
        assert_eq!((sewn.buffer_left, sewn.buffer_right), (1, 1));
        assert_eq!(sewn.data[0..5], [3.0, 1.0, 2.0, 3.0, 1.0]);
        assert_eq!(sewn.data[5..10], [6.0, 4.0, 5.0, 6.0, 4.0]);

        let regional = BoundingBox::new(-10.0, -30.0, 10.0, 30.0);
        let unsewn = sew_antimeridian(&grid, &regional);
        assert_eq!(unsewn.width, 3);
        assert_eq!((unsewn.buffer_left, unsewn.buffer_right), (0, 0));
    }

    #[test]
    fn test_is_major_level() {
        assert!(is_major_level(40.0, 20.0));
        assert!(is_major_level(0.0, 20.0));
        assert!(is_major_level(-60.0, 20.0));
        assert!(!is_major_level(30.0, 20.0));
        assert!(!is_major_level(40.0, 0.0));
    }
}
