//! In-process background execution for the full-grid analysis passes.
//!
//! Isoline extraction and extrema detection touch every pixel of a
//! potentially megapixel grid — far too slow for an interactive thread.
//! [`AnalysisWorker`] owns a dedicated worker thread fed through a job
//! channel: submissions move the input grid into the job and the result
//! buffer moves back through a oneshot reply, so nothing large is ever
//! copied across the boundary.
//!
//! There is no cancellation: overlapping submissions (a user scrubbing the
//! timeline) each produce an independent result, and superseding stale
//! results is the host's responsibility.

pub mod queue;

pub use queue::{AnalysisWorker, WorkerError, WorkerResult};
