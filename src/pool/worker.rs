//! Worker task set.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::PoolConfig;
use crate::error::{BoxError, JobError};
use crate::job::{Job, JobResult};

use super::cancel::PoolCancellation;
use super::sink::ResultSink;

/// Fixed set of interchangeable consumers draining the job channel.
pub(crate) struct WorkerSet;

impl WorkerSet {
    /// Spawn `config.num_workers` workers into a `JoinSet`.
    ///
    /// Each worker holds its own clone of the job receiver and loops until
    /// the feeder closes the channel.
    pub(crate) fn spawn<T, R, F, Fut>(
        job_rx: async_channel::Receiver<Job<T>>,
        worker_fn: Arc<F>,
        limiter: Option<Arc<Semaphore>>,
        cancellation: PoolCancellation,
        sink: Arc<ResultSink<R>>,
        config: &PoolConfig,
    ) -> JoinSet<()>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        let mut workers = JoinSet::new();
        for worker_id in 0..config.num_workers {
            workers.spawn(run_worker(
                worker_id,
                job_rx.clone(),
                worker_fn.clone(),
                limiter.clone(),
                cancellation.clone(),
                sink.clone(),
                config.worker_timeout,
                config.stop_on_error,
            ));
        }
        workers
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_worker<T, R, F, Fut>(
    worker_id: usize,
    job_rx: async_channel::Receiver<Job<T>>,
    worker_fn: Arc<F>,
    limiter: Option<Arc<Semaphore>>,
    cancellation: PoolCancellation,
    sink: Arc<ResultSink<R>>,
    worker_timeout: Duration,
    stop_on_error: bool,
) where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
{
    while let Ok(job) = job_rx.recv().await {
        // Cancellation observed between dispatch and execution.
        if cancellation.token().is_cancelled() {
            sink.skip(job.id);
            continue;
        }

        // The permit is held for the whole invocation and released when this
        // iteration ends, whatever the outcome.
        let _permit = match &limiter {
            Some(sem) => {
                tokio::select! {
                    biased;

                    () = cancellation.token().cancelled() => {
                        sink.skip(job.id);
                        continue;
                    }
                    permit = sem.clone().acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            // Limiter closed by its owner; nothing may run.
                            sink.skip(job.id);
                            continue;
                        }
                    }
                }
            }
            None => None,
        };

        // The invocation runs in its own task so a panic is contained there
        // and surfaces as a join error instead of taking the worker down.
        let task_token = cancellation.task_token();
        let mut handle = tokio::spawn((*worker_fn)(task_token.clone(), job.data));

        let deadline = tokio::time::sleep(worker_timeout);
        tokio::pin!(deadline);
        let mut deadline_armed = true;

        // The deadline only cancels the task token; the invocation is always
        // awaited to completion and its outcome forwarded as-is.
        let joined = loop {
            tokio::select! {
                joined = &mut handle => break joined,
                () = &mut deadline, if deadline_armed => {
                    deadline_armed = false;
                    debug!(worker = worker_id, id = job.id, "per-task deadline elapsed");
                    task_token.cancel();
                }
            }
        };
        drop(task_token);

        match joined {
            Ok(Ok(value)) => {
                sink.record(JobResult::ok(job.id, value));
            }
            Ok(Err(err)) => {
                sink.record(JobResult::err(job.id, JobError::Failed(err)));
                if stop_on_error {
                    cancellation.cancel();
                }
            }
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic());
                debug!(worker = worker_id, id = job.id, %message, "worker function panicked");
                sink.record(JobResult::err(job.id, JobError::Panicked(message)));
                if stop_on_error {
                    cancellation.cancel();
                }
            }
            Err(_) => {
                // Runtime shutdown aborted the invocation mid-flight.
                sink.skip(job.id);
            }
        }
    }
}

/// Render a panic payload the way `panic!` messages usually arrive.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
