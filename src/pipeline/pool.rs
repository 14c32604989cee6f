//! Fixed-size worker pool.

use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::HostResult;
use crate::probe::HostProber;

use super::queue::WorkReceiver;
use super::PipelineCounters;

/// `n` tasks that each loop dequeue, probe, send.
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `count` workers (at least one).
    ///
    /// Each worker owns a clone of `results`; the channel closes once the
    /// last worker exits. Workers stop when the queue is closed and drained,
    /// when `abort` is cancelled, or when the results receiver is gone.
    pub fn spawn(
        count: usize,
        queue: WorkReceiver,
        prober: Arc<HostProber>,
        results: mpsc::Sender<HostResult>,
        counters: Arc<PipelineCounters>,
        abort: CancellationToken,
    ) -> Self {
        let workers = (0..count.max(1))
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    queue.clone(),
                    Arc::clone(&prober),
                    results.clone(),
                    Arc::clone(&counters),
                    abort.clone(),
                ))
            })
            .collect();
        Self { workers }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits for every worker to exit.
    pub async fn join(self) {
        let mut pending: FuturesUnordered<_> = self.workers.into_iter().collect();
        while let Some(joined) = pending.next().await {
            if let Err(e) = joined {
                error!("Worker task failed: {e}");
            }
        }
    }
}

async fn run_worker(
    id: usize,
    queue: WorkReceiver,
    prober: Arc<HostProber>,
    results: mpsc::Sender<HostResult>,
    counters: Arc<PipelineCounters>,
    abort: CancellationToken,
) {
    loop {
        let host = tokio::select! {
            _ = abort.cancelled() => break,
            host = queue.recv() => match host {
                Some(host) => host,
                None => break,
            },
        };

        let result = prober.probe(&host).await;
        counters.record_probe(&result);
        if results.send(result).await.is_err() {
            debug!("Worker {id}: results channel closed, stopping");
            break;
        }
    }
    debug!("Worker {id} finished");
}
