//! Local extrema (high/low) detection in magnitude grids.
//!
//! Finds pressure-style highs and lows: classify interior cells against
//! their eight neighbors, unproject to geographic positions, then greedily
//! suppress candidates that sit geodesically too close to a stronger one.
//! Classification runs on a blurred copy of the grid so single-pixel noise
//! cannot spawn candidates; the reported value is the unblurred measurement
//! at the detected cell.

use crate::blur::box_blur_interior;
use crate::config::ExtremaConfig;
use crate::error::{AnalysisError, Result};
use field_sampler::FieldProjection;
use fields_common::{BoundingBox, MagnitudeGrid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean Earth radius in kilometers, for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A surviving local extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    /// `[lon, lat]` position.
    pub position: [f64; 2],
    /// Field value at the extremum, in physical units.
    pub value: f32,
}

/// Detected highs and lows for one grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtremaSet {
    pub highs: Vec<Extremum>,
    pub lows: Vec<Extremum>,
}

impl ExtremaSet {
    /// Serialize into the flat transfer layout:
    /// `[high_count, (lon, lat, value) x highs, low_count, (lon, lat, value) x lows]`.
    ///
    /// The single contiguous f32 array moves across the background-worker
    /// boundary without per-point allocation.
    pub fn to_transfer_buffer(&self) -> Vec<f32> {
        let mut buffer = Vec::with_capacity(2 + 3 * (self.highs.len() + self.lows.len()));
        buffer.push(self.highs.len() as f32);
        for extremum in &self.highs {
            buffer.push(extremum.position[0] as f32);
            buffer.push(extremum.position[1] as f32);
            buffer.push(extremum.value);
        }
        buffer.push(self.lows.len() as f32);
        for extremum in &self.lows {
            buffer.push(extremum.position[0] as f32);
            buffer.push(extremum.position[1] as f32);
            buffer.push(extremum.value);
        }
        buffer
    }

    /// Parse the flat transfer layout produced by [`Self::to_transfer_buffer`].
    pub fn from_transfer_buffer(buffer: &[f32]) -> Result<Self> {
        let mut cursor = 0usize;
        let highs = read_point_run(buffer, &mut cursor)?;
        let lows = read_point_run(buffer, &mut cursor)?;
        if cursor != buffer.len() {
            return Err(AnalysisError::transfer_layout(format!(
                "{} trailing values after both point runs",
                buffer.len() - cursor
            )));
        }
        Ok(Self { highs, lows })
    }
}

/// Read one `[count, (lon, lat, value) x count]` run from the buffer.
fn read_point_run(buffer: &[f32], cursor: &mut usize) -> Result<Vec<Extremum>> {
    let count_value = *buffer
        .get(*cursor)
        .ok_or_else(|| AnalysisError::transfer_layout("missing point count"))?;
    if !count_value.is_finite() || count_value < 0.0 || count_value.fract() != 0.0 {
        return Err(AnalysisError::transfer_layout(format!(
            "point count {count_value} is not a non-negative integer"
        )));
    }
    *cursor += 1;

    let count = count_value as usize;
    let end = *cursor + 3 * count;
    if end > buffer.len() {
        return Err(AnalysisError::transfer_layout(format!(
            "point run of {count} needs {} values, {} remain",
            3 * count,
            buffer.len() - *cursor
        )));
    }

    let points = buffer[*cursor..end]
        .chunks_exact(3)
        .map(|chunk| Extremum {
            position: [chunk[0] as f64, chunk[1] as f64],
            value: chunk[2],
        })
        .collect();
    *cursor = end;
    Ok(points)
}

/// Detect suppressed local extrema in a magnitude grid.
///
/// Grids smaller than 3x3 and flat fields yield an empty set, not an
/// error.
pub fn detect_extrema(
    grid: &MagnitudeGrid,
    bounds: &BoundingBox,
    config: &ExtremaConfig,
) -> Result<ExtremaSet> {
    config.validate()?;
    if grid.width < 3 || grid.height < 3 {
        return Ok(ExtremaSet::default());
    }

    let blurred = box_blur_interior(&grid.data, grid.width, grid.height);
    let (mut highs, mut lows) = classify_candidates(grid, &blurred, bounds);

    debug!(
        width = grid.width,
        height = grid.height,
        radius_km = config.radius_km,
        high_candidates = highs.len(),
        low_candidates = lows.len(),
        "Classified extrema candidates"
    );

    // Strongest first: highs by value descending, lows ascending.
    highs.sort_by(|a, b| b.value.total_cmp(&a.value));
    lows.sort_by(|a, b| a.value.total_cmp(&b.value));

    let set = ExtremaSet {
        highs: suppress(highs, config.radius_km),
        lows: suppress(lows, config.radius_km),
    };

    debug!(
        highs = set.highs.len(),
        lows = set.lows.len(),
        "Detected extrema"
    );
    Ok(set)
}

/// Classify interior cells (outermost ring excluded) against their eight
/// neighbors on the blurred grid.
///
/// The mixed rule — `>=` toward east/south-east/south/south-west, strict
/// `>` toward the rest — makes exactly one cell of a flat plateau qualify.
/// NaN cells and cells with a NaN neighbor never qualify (every comparison
/// with NaN is false).
fn classify_candidates(
    grid: &MagnitudeGrid,
    blurred: &[f32],
    bounds: &BoundingBox,
) -> (Vec<Extremum>, Vec<Extremum>) {
    let width = grid.width;
    let proj = FieldProjection::new(*bounds, width, grid.height);

    let mut highs = Vec::new();
    let mut lows = Vec::new();

    for y in 1..grid.height - 1 {
        for x in 1..width - 1 {
            let c = blurred[y * width + x];
            let east = blurred[y * width + x + 1];
            let south_east = blurred[(y + 1) * width + x + 1];
            let south = blurred[(y + 1) * width + x];
            let south_west = blurred[(y + 1) * width + x - 1];
            let west = blurred[y * width + x - 1];
            let north_west = blurred[(y - 1) * width + x - 1];
            let north = blurred[(y - 1) * width + x];
            let north_east = blurred[(y - 1) * width + x + 1];

            let is_high = c >= east
                && c >= south_east
                && c >= south
                && c >= south_west
                && c > west
                && c > north_west
                && c > north
                && c > north_east;
            let is_low = c <= east
                && c <= south_east
                && c <= south
                && c <= south_west
                && c < west
                && c < north_west
                && c < north
                && c < north_east;

            if is_high || is_low {
                let (lon, lat) = proj.unproject(x as f64, y as f64);
                let candidate = Extremum {
                    position: [lon, lat],
                    value: grid.value(x, y),
                };
                if is_high {
                    highs.push(candidate);
                } else {
                    lows.push(candidate);
                }
            }
        }
    }

    (highs, lows)
}

/// Single left-to-right greedy sweep over strength-sorted candidates: a
/// candidate survives only when no earlier survivor lies within
/// `radius_km`. Earlier (stronger) candidates always win.
fn suppress(candidates: Vec<Extremum>, radius_km: f64) -> Vec<Extremum> {
    let mut survivors: Vec<Extremum> = Vec::new();
    for candidate in candidates {
        let close = survivors
            .iter()
            .any(|s| haversine_km(s.position, candidate.position) < radius_km);
        if !close {
            survivors.push(candidate);
        }
    }
    survivors
}

/// Great-circle distance between two `[lon, lat]` positions in kilometers.
pub fn haversine_km(a: [f64; 2], b: [f64; 2]) -> f64 {
    let lat_a = a[1].to_radians();
    let lat_b = b[1].to_radians();
    let d_lat = (b[1] - a[1]).to_radians();
    let d_lon = (b[0] - a[0]).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distances() {
        // One degree of longitude on the equator is ~111.19 km.
        let d = haversine_km([0.0, 0.0], [1.0, 0.0]);
        assert!((d - 111.19).abs() < 0.5);

        // Antipodal points are half the circumference apart.
        let d = haversine_km([0.0, 0.0], [180.0, 0.0]);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);

        assert_eq!(haversine_km([12.0, 34.0], [12.0, 34.0]), 0.0);
    }

    #[test]
    fn test_suppress_keeps_stronger() {
        // Two highs 1 degree apart (~111 km), sorted strongest first.
        let candidates = vec![
            Extremum {
                position: [0.0, 0.0],
                value: 100.0,
            },
            Extremum {
                position: [1.0, 0.0],
                value: 90.0,
            },
        ];

        let survivors = suppress(candidates.clone(), 500.0);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].value, 100.0);

        let survivors = suppress(candidates, 50.0);
        assert_eq!(survivors.len(), 2);
    }

    #[test]
    fn test_suppressed_candidate_does_not_block() {
        // B is suppressed by A; C is within radius of B but not A, so C
        // survives: discarded candidates never shadow later ones.
        let candidates = vec![
            Extremum {
                position: [0.0, 0.0],
                value: 100.0,
            },
            Extremum {
                position: [1.0, 0.0],
                value: 90.0,
            },
            Extremum {
                position: [2.0, 0.0],
                value: 80.0,
            },
        ];

        let survivors = suppress(candidates, 150.0);
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[1].value, 80.0);
    }

    #[test]
    fn test_transfer_buffer_round_trip() {
        let set = ExtremaSet {
            highs: vec![Extremum {
                position: [10.0, 20.0],
                value: 1020.0,
            }],
            lows: vec![
                Extremum {
                    position: [-45.5, -10.25],
                    value: 985.0,
                },
                Extremum {
                    position: [170.0, 55.0],
                    value: 990.0,
                },
            ],
        };

        let buffer = set.to_transfer_buffer();
        assert_eq!(buffer.len(), 2 + 3 * 3);
        assert_eq!(buffer[0], 1.0);
        assert_eq!(buffer[4], 2.0);

        let parsed = ExtremaSet::from_transfer_buffer(&buffer).unwrap();
        assert_eq!(parsed, set);

        let empty = ExtremaSet::default();
        let parsed = ExtremaSet::from_transfer_buffer(&empty.to_transfer_buffer()).unwrap();
        assert_eq!(parsed, empty);
    }

    #[test]
    fn test_transfer_buffer_rejects_malformed() {
        assert!(ExtremaSet::from_transfer_buffer(&[]).is_err());
        assert!(ExtremaSet::from_transfer_buffer(&[1.0, 0.0, 0.0]).is_err());
        assert!(ExtremaSet::from_transfer_buffer(&[-1.0, 0.0]).is_err());
        assert!(ExtremaSet::from_transfer_buffer(&[0.0, 0.0, 7.0]).is_err());
    }
}
