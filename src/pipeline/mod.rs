//! Producer, worker pool and collector wired together.
//!
//! ```text
//! input lines -> work queue (bounded) -> N workers -> results channel -> collector -> output
//! ```
//!
//! Shutdown is two-phase: the queue is closed once input ends, workers exit
//! after draining it, and the results channel closes when the last worker
//! drops its sender. Only then does the collector finish.

mod collector;
mod pool;
mod queue;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app::normalize_host;
use crate::config::{Config, DEFAULT_WORKERS, PROGRESS_INTERVAL_SECS};
use crate::error_handling::{CollectorError, ProcessingStats};
use crate::models::HostResult;
use crate::probe::HostProber;
use crate::transport::{FetchSettings, RoundTrip};

pub use collector::Collector;
pub use pool::WorkerPool;
pub use queue::{work_queue, WorkReceiver, WorkSender};

/// Sizing and timing of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub workers: usize,
    pub queue_capacity: usize,
    pub progress_interval: Duration,
    pub fetch: FetchSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_WORKERS,
            progress_interval: Duration::from_secs(PROGRESS_INTERVAL_SECS),
            fetch: FetchSettings::default(),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.worker_count(),
            queue_capacity: config.queue_capacity(),
            progress_interval: config.progress_interval(),
            fetch: FetchSettings::from(config),
        }
    }
}

/// Per-run counters shared by the producer, the workers and the collector.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    pub enqueued: AtomicUsize,
    pub probed: AtomicUsize,
    pub failed: AtomicUsize,
    pub https_only: AtomicUsize,
    pub written: AtomicUsize,
}

impl PipelineCounters {
    fn record_probe(&self, result: &HostResult) {
        self.probed.fetch_add(1, Ordering::SeqCst);
        if result.error.is_some() {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        if result.https_only {
            self.https_only.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            enqueued: self.enqueued.load(Ordering::SeqCst),
            probed: self.probed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            https_only: self.https_only.load(Ordering::SeqCst),
            written: self.written.load(Ordering::SeqCst),
        }
    }
}

/// Plain copy of [`PipelineCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub enqueued: usize,
    pub probed: usize,
    pub failed: usize,
    pub https_only: usize,
    pub written: usize,
}

/// What a completed pipeline hands back.
pub struct PipelineSummary<W> {
    /// The flushed output writer.
    pub output: W,
    pub counters: CounterSnapshot,
    pub stats: Arc<ProcessingStats>,
}

/// Probes every host read from `input` and writes one JSON line per host to
/// `output`.
///
/// Blank lines and `#` comments are skipped. Lines that are not valid UTF-8
/// are decoded lossily and still produce a record. Input read errors end the
/// input early with a warning; hosts already enqueued are still processed.
///
/// # Errors
///
/// Returns the collector's error if a record could not be serialized or
/// written. The run is aborted in that case and later records are lost.
pub async fn run_pipeline<R, W>(
    input: R,
    output: W,
    transport: Arc<dyn RoundTrip>,
    settings: &PipelineSettings,
) -> Result<PipelineSummary<W>, CollectorError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let counters = Arc::new(PipelineCounters::default());
    let stats = Arc::new(ProcessingStats::new());
    let abort = CancellationToken::new();
    let workers = settings.workers.max(1);

    let prober = Arc::new(HostProber::new(transport, settings.fetch, Arc::clone(&stats)));
    let (work_tx, work_rx) = work_queue(settings.queue_capacity);
    let (results_tx, results_rx) = mpsc::channel::<HostResult>(workers);

    let collector = Collector::new(output, Arc::clone(&counters), settings.progress_interval);
    let collector_task = tokio::spawn(collector.run(results_rx, abort.clone()));

    let pool = WorkerPool::spawn(
        workers,
        work_rx,
        prober,
        results_tx,
        Arc::clone(&counters),
        abort.clone(),
    );
    info!(
        "Started {} workers (queue capacity {})",
        pool.len(),
        settings.queue_capacity.max(1)
    );

    produce(input, &work_tx, &counters, &abort).await;
    drop(work_tx);

    pool.join().await;
    let (output, _) = collector_task.await??;

    Ok(PipelineSummary {
        output,
        counters: counters.snapshot(),
        stats,
    })
}

async fn produce<R>(
    input: R,
    queue: &WorkSender,
    counters: &PipelineCounters,
    abort: &CancellationToken,
) where
    R: AsyncBufRead + Unpin,
{
    // Raw lines: one undecodable line must not end the input.
    let mut lines = input.split(b'\n');
    loop {
        let line = tokio::select! {
            _ = abort.cancelled() => break,
            line = lines.next_segment() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input, no further hosts will be queued: {e}");
                break;
            }
        };
        let line = String::from_utf8_lossy(&line);
        let Some(host) = normalize_host(&line) else {
            continue;
        };

        tokio::select! {
            _ = abort.cancelled() => break,
            sent = queue.send(host) => {
                if sent.is_err() {
                    break;
                }
                counters.enqueued.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
