//! Job and result envelopes.

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// A unit of work submitted to the pool.
///
/// The id labels the job within its batch; it carries no ordering meaning.
/// The pool reports every outcome by id, so ids must be unique per batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job<T> {
    /// Caller-supplied identifier, unique within the batch.
    pub id: u64,
    /// Payload handed to the worker function, opaque to the pool.
    pub data: T,
}

impl<T> Job<T> {
    /// Create a new job.
    pub fn new(id: u64, data: T) -> Self {
        Self { id, data }
    }
}

/// Outcome of a single job, delivered on the result stream.
///
/// `value` is meaningful only when `err` is `None`.
#[derive(Debug)]
pub struct JobResult<R> {
    /// Id of the originating [`Job`].
    pub id: u64,
    /// Success value, if the worker function returned one.
    pub value: Option<R>,
    /// Failure, if the job did not complete successfully.
    pub err: Option<JobError>,
}

impl<R> JobResult<R> {
    /// A successful result.
    pub fn ok(id: u64, value: R) -> Self {
        Self {
            id,
            value: Some(value),
            err: None,
        }
    }

    /// A failed result.
    pub fn err(id: u64, err: JobError) -> Self {
        Self {
            id,
            value: None,
            err: Some(err),
        }
    }

    /// True when the job completed without an error.
    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }

    /// Consume the result, returning the success value if there is one.
    pub fn into_value(self) -> Option<R> {
        self.value
    }
}
