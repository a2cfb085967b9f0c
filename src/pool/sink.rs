//! Deduplicating result sink.

use std::collections::HashSet;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::JobError;
use crate::job::JobResult;

/// Fans results from the feeder and workers into the output channel,
/// forwarding at most one result per job id.
///
/// The output channel capacity equals the batch size, so `record` never
/// blocks and worker liveness stays independent of the consumer. The stream
/// closes when the last handle to this sink drops, strictly after the final
/// write.
pub(crate) struct ResultSink<R> {
    seen: Mutex<HashSet<u64>>,
    tx: mpsc::Sender<JobResult<R>>,
}

impl<R> ResultSink<R> {
    pub(crate) fn new(tx: mpsc::Sender<JobResult<R>>, capacity: usize) -> Self {
        Self {
            seen: Mutex::new(HashSet::with_capacity(capacity)),
            tx,
        }
    }

    /// Forward `result` unless one was already recorded for its id.
    ///
    /// Entries in the seen-set are set-once: two producers racing on the
    /// same id both observe the insert under the lock and exactly one
    /// forwards.
    pub(crate) fn record(&self, result: JobResult<R>) {
        let fresh = self
            .seen
            .lock()
            .expect("dedup set lock should not be poisoned")
            .insert(result.id);

        if !fresh {
            debug!(id = result.id, "dropping duplicate result");
            return;
        }

        // Capacity matches the batch size and each id is recorded once, so
        // the send can only fail when the consumer dropped the receiver.
        let _ = self.tx.try_send(result);
    }

    /// Record a skipped job.
    pub(crate) fn skip(&self, id: u64) {
        self.record(JobResult::err(id, JobError::Skipped));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_result_wins() {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = ResultSink::new(tx, 4);

        sink.record(JobResult::ok(1, "first"));
        sink.record(JobResult::ok(1, "second"));
        sink.skip(1);

        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.value, Some("first"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_distinct_ids_all_forwarded() {
        let (tx, mut rx) = mpsc::channel(3);
        let sink = ResultSink::new(tx, 3);

        sink.record(JobResult::ok(1, 10));
        sink.skip(2);
        sink.record(JobResult::ok(3, 30));

        let mut ids = Vec::new();
        while let Ok(result) = rx.try_recv() {
            ids.push(result.id);
        }
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = mpsc::channel(2);
        let sink = ResultSink::new(tx, 2);

        drop(rx);
        sink.record(JobResult::ok(1, ()));
        sink.skip(2);
    }

    #[test]
    fn test_stream_closes_when_sink_drops() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = ResultSink::new(tx, 1);

        sink.record(JobResult::ok(1, ()));
        drop(sink);

        assert!(rx.try_recv().is_ok());
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
