//! Single writer of the output stream.
//!
//! The collector drains the results channel and appends one JSON line per
//! record. A progress reporter runs beside it on its own timer and is stopped
//! and joined when draining ends.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::error;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::{log_progress, shutdown_gracefully};
use crate::error_handling::CollectorError;
use crate::memory::MemoryStats;

use super::PipelineCounters;

/// Owns the output writer for the duration of a run.
pub struct Collector<W> {
    writer: W,
    counters: Arc<PipelineCounters>,
    progress_interval: Duration,
}

impl<W> Collector<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(writer: W, counters: Arc<PipelineCounters>, progress_interval: Duration) -> Self {
        Self {
            writer,
            counters,
            progress_interval,
        }
    }

    /// Writes every record received until all senders are gone.
    ///
    /// Returns the flushed writer and the number of records written. On a
    /// serialization or write failure the loop stops immediately, `abort` is
    /// cancelled so upstream stages stop producing, and records still in the
    /// channel are dropped.
    pub async fn run<T>(
        mut self,
        mut results: mpsc::Receiver<T>,
        abort: CancellationToken,
    ) -> Result<(W, usize), CollectorError>
    where
        T: Serialize,
    {
        let start = Instant::now();
        let progress_cancel = CancellationToken::new();
        let progress_task = spawn_progress_reporter(
            start,
            Arc::clone(&self.counters),
            self.progress_interval,
            progress_cancel.clone(),
        );

        let drained = self.drain(&mut results).await;
        shutdown_gracefully(progress_cancel, Some(progress_task)).await;

        match drained {
            Ok(()) => {
                let written = self.counters.written.load(Ordering::SeqCst);
                log_progress(start, written, MemoryStats::sample());
                Ok((self.writer, written))
            }
            Err(e) => {
                error!("Collector stopped: {e}");
                abort.cancel();
                Err(e)
            }
        }
    }

    async fn drain<T: Serialize>(
        &mut self,
        results: &mut mpsc::Receiver<T>,
    ) -> Result<(), CollectorError> {
        while let Some(record) = results.recv().await {
            let mut line = serde_json::to_vec(&record)?;
            line.push(b'\n');
            self.writer.write_all(&line).await?;
            self.counters.written.fetch_add(1, Ordering::SeqCst);
        }
        self.writer.flush().await?;
        Ok(())
    }
}

fn spawn_progress_reporter(
    start: Instant,
    counters: Arc<PipelineCounters>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    log_progress(
                        start,
                        counters.written.load(Ordering::SeqCst),
                        MemoryStats::sample(),
                    );
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;

    #[derive(Serialize)]
    struct Row {
        host: &'static str,
    }

    /// Serializes fine unless `poisoned` is set.
    struct Fragile {
        poisoned: bool,
    }

    impl Serialize for Fragile {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.poisoned {
                Err(S::Error::custom("poisoned record"))
            } else {
                serializer.serialize_str("ok")
            }
        }
    }

    fn collector(interval: Duration) -> (Collector<Vec<u8>>, Arc<PipelineCounters>) {
        let counters = Arc::new(PipelineCounters::default());
        (
            Collector::new(Vec::new(), Arc::clone(&counters), interval),
            counters,
        )
    }

    #[tokio::test]
    async fn test_writes_one_line_per_record() {
        let (collector, counters) = collector(Duration::from_secs(5));
        let (tx, rx) = mpsc::channel(4);
        tx.send(Row { host: "a.test" }).await.expect("open");
        tx.send(Row { host: "b.test" }).await.expect("open");
        drop(tx);

        let (output, written) = collector
            .run(rx, CancellationToken::new())
            .await
            .expect("collector succeeds");
        assert_eq!(written, 2);
        assert_eq!(counters.written.load(Ordering::SeqCst), 2);
        assert_eq!(
            String::from_utf8(output).expect("utf8"),
            "{\"host\":\"a.test\"}\n{\"host\":\"b.test\"}\n"
        );
    }

    #[tokio::test]
    async fn test_serialization_failure_stops_and_cancels_abort() {
        let (collector, counters) = collector(Duration::from_secs(5));
        let (tx, rx) = mpsc::channel(4);
        tx.send(Fragile { poisoned: false }).await.expect("open");
        tx.send(Fragile { poisoned: true }).await.expect("open");
        tx.send(Fragile { poisoned: false }).await.expect("open");
        drop(tx);

        let abort = CancellationToken::new();
        let err = collector
            .run(rx, abort.clone())
            .await
            .expect_err("poisoned record is fatal");
        assert!(matches!(err, CollectorError::Serialize(_)));
        assert!(abort.is_cancelled());
        assert_eq!(counters.written.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_progress_reporter_stops_with_short_interval() {
        let (collector, _) = collector(Duration::from_millis(5));
        let (tx, rx) = mpsc::channel::<Row>(1);
        let run = tokio::spawn(collector.run(rx, CancellationToken::new()));
        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(tx);

        let (output, written) = run.await.expect("join").expect("collector succeeds");
        assert!(output.is_empty());
        assert_eq!(written, 0);
    }
}
