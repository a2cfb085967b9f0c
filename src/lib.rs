//! Squall: a streaming worker pool for bounded batches.
//!
//! This crate executes a batch of jobs concurrently and streams their
//! outcomes back with a hard guarantee of exactly one result per job id:
//!
//! - Pre-flight validation of empty batches, duplicate ids, and callers
//!   that are already cancelled
//! - Cooperative cancellation composed from the caller's token, a pool-wide
//!   deadline, and per-task deadlines
//! - Stop-on-first-error, panic containment, and an optional process-wide
//!   concurrency limiter whose permits are never leaked
//!
//! # Example
//!
//! ```ignore
//! use squall::{BoxError, Job, PoolConfig, run_stream};
//! use tokio_util::sync::CancellationToken;
//!
//! let jobs: Vec<Job<u64>> = (0..10).map(|i| Job::new(i, i * 10)).collect();
//!
//! let mut results = run_stream(
//!     CancellationToken::new(),
//!     jobs,
//!     |_task, data| async move { Ok::<_, BoxError>(data * 2) },
//!     None,
//!     PoolConfig::default(),
//! );
//!
//! while let Some(result) = results.recv().await {
//!     // Exactly one result per job id, in completion order.
//! }
//! ```

pub mod config;
pub mod error;
pub mod job;
pub mod pool;

pub use config::PoolConfig;
pub use error::{BoxError, JobError};
pub use job::{Job, JobResult};
pub use pool::run_stream;
