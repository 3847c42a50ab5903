//! Job queue over a dedicated analysis thread.

use chrono::{DateTime, Utc};
use field_analysis::{
    detect_extrema, extract_isolines, AnalysisError, ExtremaConfig, ExtremaSet, Isoline,
    IsolineConfig,
};
use fields_common::{BoundingBox, MagnitudeGrid};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors crossing the worker boundary.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker thread is gone (spawn failed or the queue closed).
    #[error("analysis worker is not running")]
    WorkerGone,

    /// The analysis pass itself failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Result type for worker submissions.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// One queued analysis request.
struct AnalysisJob {
    id: Uuid,
    submitted_at: DateTime<Utc>,
    request: JobRequest,
}

enum JobRequest {
    Isolines {
        grid: MagnitudeGrid,
        bounds: BoundingBox,
        config: IsolineConfig,
        reply: oneshot::Sender<field_analysis::Result<Vec<Isoline>>>,
    },
    Extrema {
        grid: MagnitudeGrid,
        bounds: BoundingBox,
        config: ExtremaConfig,
        reply: oneshot::Sender<field_analysis::Result<ExtremaSet>>,
    },
}

impl JobRequest {
    fn name(&self) -> &'static str {
        match self {
            JobRequest::Isolines { .. } => "isolines",
            JobRequest::Extrema { .. } => "extrema",
        }
    }
}

/// Handle to a background analysis worker.
///
/// Cloning the handle shares the same worker; dropping the last handle
/// closes the queue, and the worker finishes any queued jobs before
/// exiting.
#[derive(Clone)]
pub struct AnalysisWorker {
    tx: mpsc::UnboundedSender<AnalysisJob>,
}

impl AnalysisWorker {
    /// Start a worker on its own thread.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("field-analysis".to_string())
            .spawn(move || worker_loop(rx))
            .expect("failed to spawn analysis worker thread");
        Self { tx }
    }

    /// Submit an isoline extraction job. The grid moves into the worker;
    /// the polylines move back.
    pub async fn isolines(
        &self,
        grid: MagnitudeGrid,
        bounds: BoundingBox,
        config: IsolineConfig,
    ) -> WorkerResult<Vec<Isoline>> {
        let (reply, rx) = oneshot::channel();
        self.submit(JobRequest::Isolines {
            grid,
            bounds,
            config,
            reply,
        })?;
        rx.await.map_err(|_| WorkerError::WorkerGone)?.map_err(WorkerError::from)
    }

    /// Submit an extrema detection job.
    pub async fn extrema(
        &self,
        grid: MagnitudeGrid,
        bounds: BoundingBox,
        config: ExtremaConfig,
    ) -> WorkerResult<ExtremaSet> {
        let (reply, rx) = oneshot::channel();
        self.submit(JobRequest::Extrema {
            grid,
            bounds,
            config,
            reply,
        })?;
        rx.await.map_err(|_| WorkerError::WorkerGone)?.map_err(WorkerError::from)
    }

    /// Submit an extrema detection job and receive the flat transfer
    /// buffer instead of typed points.
    pub async fn extrema_transfer(
        &self,
        grid: MagnitudeGrid,
        bounds: BoundingBox,
        config: ExtremaConfig,
    ) -> WorkerResult<Vec<f32>> {
        let set = self.extrema(grid, bounds, config).await?;
        Ok(set.to_transfer_buffer())
    }

    fn submit(&self, request: JobRequest) -> WorkerResult<()> {
        let job = AnalysisJob {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            request,
        };
        debug!(job_id = %job.id, kind = job.request.name(), "Enqueueing analysis job");
        self.tx.send(job).map_err(|_| WorkerError::WorkerGone)
    }
}

/// Drain the queue until every sender is dropped.
fn worker_loop(mut rx: mpsc::UnboundedReceiver<AnalysisJob>) {
    while let Some(job) = rx.blocking_recv() {
        let queued_ms = (Utc::now() - job.submitted_at).num_milliseconds();
        debug!(
            job_id = %job.id,
            kind = job.request.name(),
            queued_ms = queued_ms,
            "Running analysis job"
        );

        match job.request {
            JobRequest::Isolines {
                grid,
                bounds,
                config,
                reply,
            } => {
                let result = extract_isolines(&grid, &bounds, &config);
                if reply.send(result).is_err() {
                    warn!(job_id = %job.id, "Isoline job result dropped by caller");
                }
            }
            JobRequest::Extrema {
                grid,
                bounds,
                config,
                reply,
            } => {
                let result = detect_extrema(&grid, &bounds, &config);
                if reply.send(result).is_err() {
                    warn!(job_id = %job.id, "Extrema job result dropped by caller");
                }
            }
        }
    }
}
