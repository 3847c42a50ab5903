//! Tests for the background analysis worker.

use analysis_worker::AnalysisWorker;
use field_analysis::{detect_extrema, extract_isolines, ExtremaConfig, ExtremaSet, IsolineConfig};
use fields_common::{BoundingBox, MagnitudeGrid};
use test_utils::{noisy_grid, ramp_grid};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn ramp() -> MagnitudeGrid {
    MagnitudeGrid::new(ramp_grid(11, 8, 100.0), 11, 8).unwrap()
}

fn bounds() -> BoundingBox {
    BoundingBox::new(-50.0, -25.0, 60.0, 55.0)
}

#[tokio::test]
async fn test_worker_matches_synchronous_results() {
    init_tracing();
    let worker = AnalysisWorker::spawn();
    let isoline_config = IsolineConfig::new(10.0);
    let extrema_config = ExtremaConfig::new(200.0);

    let grid = ramp();
    let expected_isolines = extract_isolines(&grid, &bounds(), &isoline_config).unwrap();
    let expected_extrema = detect_extrema(&grid, &bounds(), &extrema_config).unwrap();

    let (isolines, extrema) = tokio::join!(
        worker.isolines(ramp(), bounds(), isoline_config),
        worker.extrema(ramp(), bounds(), extrema_config),
    );

    assert_eq!(isolines.unwrap(), expected_isolines);
    assert_eq!(extrema.unwrap(), expected_extrema);
}

#[tokio::test]
async fn test_overlapping_submissions_each_get_results() {
    // A timeline scrub: several jobs in flight at once, no cancellation;
    // every request produces an independent result.
    init_tracing();
    let worker = AnalysisWorker::spawn();
    let config = IsolineConfig::new(10.0);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let worker = worker.clone();
        handles.push(tokio::spawn(async move {
            worker.isolines(ramp(), bounds(), config).await
        }));
    }

    let expected = extract_isolines(&ramp(), &bounds(), &config).unwrap();
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result, expected);
    }
}

#[tokio::test]
async fn test_transfer_buffer_submission() {
    let worker = AnalysisWorker::spawn();
    let config = ExtremaConfig::new(500.0);
    let grid = MagnitudeGrid::new(noisy_grid(24, 12, 11, 80.0), 24, 12).unwrap();
    let grid_bounds = BoundingBox::default();

    let buffer = worker
        .extrema_transfer(grid.clone(), grid_bounds, config)
        .await
        .unwrap();
    let parsed = ExtremaSet::from_transfer_buffer(&buffer).unwrap();
    let direct = detect_extrema(&grid, &grid_bounds, &config).unwrap();

    assert_eq!(parsed.highs.len(), direct.highs.len());
    assert_eq!(parsed.lows.len(), direct.lows.len());
}

#[tokio::test]
async fn test_invalid_config_errors_cross_the_boundary() {
    let worker = AnalysisWorker::spawn();
    let result = worker
        .isolines(ramp(), bounds(), IsolineConfig::new(-1.0))
        .await;
    assert!(result.is_err());
}
