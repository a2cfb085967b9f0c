//! Generic streaming worker pool.
//!
//! Executes a bounded batch of jobs concurrently and streams outcomes to the
//! caller with exactly one result per job id.
//!
//! # Architecture
//!
//! A single feeder offers jobs to a fixed worker set over a rendezvous
//! channel; every worker forwards outcomes through a deduplicating sink into
//! the buffered output channel. A finalizer waits for the feeder and all
//! workers, then releases the pool deadline and closes the stream:
//!
//! - **Feeder**: streams jobs in input order, skipping the remainder once
//!   pool cancellation trips
//! - **Workers**: run the worker function under a per-task deadline, with
//!   panic containment and optional external concurrency limiting
//! - **Sink**: set-once per id, so racing producers forward exactly one
//!   result; the stream closes exactly once, after the last write

mod cancel;
mod feeder;
mod sink;
mod worker;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::PoolConfig;
use crate::error::{BoxError, JobError};
use crate::job::{Job, JobResult};

use cancel::PoolCancellation;
use feeder::Feeder;
use sink::ResultSink;
use worker::WorkerSet;

/// Execute `jobs` concurrently and stream one result per job id.
///
/// The returned receiver yields results in completion order, not input
/// order, and is closed by the pool once every job has been accounted for.
/// The channel is buffered to the batch size, so the pool finishes and
/// releases limiter permits even when the consumer stalls.
///
/// Cancelling `caller` stops dispatch: in-flight invocations observe their
/// task token and remaining jobs are reported as skipped. `limiter`, when
/// provided, bounds concurrent invocations across every pool sharing it;
/// each acquired permit is released on success, error, panic, and
/// cancellation paths alike.
///
/// Must be called within a Tokio runtime.
pub fn run_stream<T, R, F, Fut>(
    caller: CancellationToken,
    jobs: Vec<Job<T>>,
    worker_fn: F,
    limiter: Option<Arc<Semaphore>>,
    config: PoolConfig,
) -> mpsc::Receiver<JobResult<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
{
    if jobs.is_empty() {
        let (_tx, rx) = mpsc::channel(1);
        return rx;
    }

    let (out_tx, out_rx) = mpsc::channel(jobs.len());

    // A colliding id rejects the whole batch: one failure per input job,
    // bypassing deduplication so duplicates are reported too.
    let mut seen = HashSet::with_capacity(jobs.len());
    for job in &jobs {
        if !seen.insert(job.id) {
            warn!(id = job.id, "duplicate job id, rejecting batch");
            for j in &jobs {
                let _ = out_tx.try_send(JobResult::err(j.id, JobError::DuplicateId { id: job.id }));
            }
            return out_rx;
        }
    }

    // A dead caller skips the batch without starting any concurrency.
    if caller.is_cancelled() {
        debug!("caller already cancelled, skipping batch");
        for job in &jobs {
            let _ = out_tx.try_send(JobResult::err(job.id, JobError::Skipped));
        }
        return out_rx;
    }

    let config = config.normalized();
    debug!(
        jobs = jobs.len(),
        workers = config.num_workers,
        "starting worker pool"
    );

    let cancellation = PoolCancellation::new(&caller, config.global_timeout);
    let sink = Arc::new(ResultSink::new(out_tx, jobs.len()));
    let (job_tx, job_rx) = async_channel::bounded(1);

    let mut workers = WorkerSet::spawn(
        job_rx,
        Arc::new(worker_fn),
        limiter,
        cancellation.clone(),
        sink.clone(),
        &config,
    );
    let feeder = Feeder::spawn(jobs, job_tx, cancellation.clone(), sink.clone());

    // Finalizer: the stream closes only after every producer has quiesced.
    tokio::spawn(async move {
        if feeder.await.is_err() {
            warn!("feeder task panicked");
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    warn!("worker task panicked");
                }
            }
        }
        // Releases the deadline timer; a no-op if the pool already tripped.
        cancellation.cancel();
        debug!("worker pool complete");
        // The last sink handle drops here, closing the output stream.
        drop(sink);
    });

    out_rx
}
