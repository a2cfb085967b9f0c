//! Job feeder task.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::job::Job;

use super::cancel::PoolCancellation;
use super::sink::ResultSink;

/// Single producer handing jobs to the workers in input order.
pub(crate) struct Feeder;

impl Feeder {
    /// Spawn the feeder task.
    ///
    /// Each job is offered to the worker channel exactly once. If pool
    /// cancellation trips before the offer succeeds, the job is recorded as
    /// skipped and the feeder moves on; an offer is never retried. Dropping
    /// the sender at the end closes the channel once the workers drain it.
    pub(crate) fn spawn<T, R>(
        jobs: Vec<Job<T>>,
        job_tx: async_channel::Sender<Job<T>>,
        cancellation: PoolCancellation,
        sink: Arc<ResultSink<R>>,
    ) -> JoinHandle<()>
    where
        T: Send + 'static,
        R: Send + 'static,
    {
        tokio::spawn(async move {
            for job in jobs {
                let id = job.id;
                tokio::select! {
                    biased;

                    () = cancellation.token().cancelled() => {
                        sink.skip(id);
                    }
                    sent = job_tx.send(job) => {
                        if sent.is_err() {
                            // All workers exited; nothing can run this job.
                            sink.skip(id);
                        }
                    }
                }
            }
            debug!("feeder: all jobs offered");
        })
    }
}
