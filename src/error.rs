//! Error taxonomy for the result stream.

use std::fmt;

/// Boxed error returned by worker functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure attached to a [`JobResult`](crate::JobResult).
///
/// Errors are surfaced, never retried: a failure in one job does not affect
/// other jobs unless stop-on-error is enabled, in which case remaining jobs
/// are reported as [`JobError::Skipped`].
#[derive(Debug)]
pub enum JobError {
    /// The pool declined to run the job because cancellation was observed
    /// before or during dispatch.
    Skipped,
    /// The batch was rejected because two jobs shared this id. Every job in
    /// the batch receives this error and none of them run.
    DuplicateId { id: u64 },
    /// The worker function returned an error.
    Failed(BoxError),
    /// The worker function panicked.
    Panicked(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "job not processed (cancelled or skipped)"),
            Self::DuplicateId { id } => {
                write!(f, "duplicate job ID detected: {id} (all jobs rejected)")
            }
            Self::Failed(err) => write!(f, "{err}"),
            Self::Panicked(msg) => write!(f, "panic: {msg}"),
        }
    }
}

impl std::error::Error for JobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Failed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl JobError {
    /// Create a `Failed` error from any error type.
    pub fn failed<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed(Box::new(err))
    }

    /// Check if this is the skipped sentinel.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Check if this is a batch-wide duplicate-id rejection.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateId { .. })
    }

    /// Check if this is a contained panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}
