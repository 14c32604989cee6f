//! Scan orchestration: startup checks, wiring and the final report.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::io::{AsyncBufRead, BufReader, BufWriter};

use crate::app::{print_error_statistics, print_run_summary};
use crate::config::{Config, STDIN_INPUT};
use crate::initialization::init_tls_config;
use crate::pipeline::{run_pipeline, PipelineSettings};
use crate::transport::{HyperTransport, RoundTrip, TransportTimeouts};

/// Outcome of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Hosts read from the input and queued for probing.
    pub total_hosts: usize,
    /// Records written to the output file.
    pub records_written: usize,
    /// Records carrying an error.
    pub failed: usize,
    /// Hosts whose HTTP probe already ended on HTTPS.
    pub https_only: usize,
    pub output_path: PathBuf,
    pub elapsed_seconds: f64,
}

/// Runs a scan to completion.
///
/// Startup failures (no output path, unreadable input, output that cannot be
/// created, TLS setup) are returned before any host is probed. A failure to
/// write results ends the scan early and is returned as well; per-host probe
/// failures are only recorded in the output.
///
/// # Errors
///
/// Returns an error on any startup failure or when the output cannot be
/// written.
pub async fn run_scan(config: Config) -> Result<ScanReport> {
    let output_path = match &config.output {
        Some(path) if !path.as_os_str().is_empty() => path.clone(),
        _ => bail!("No output destination given (use --output <FILE>)"),
    };

    let input: Box<dyn AsyncBufRead + Unpin + Send> = if config.input.as_os_str() == STDIN_INPUT {
        info!("Reading hosts from stdin");
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        let file = tokio::fs::File::open(&config.input)
            .await
            .with_context(|| format!("Failed to open input file {}", config.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let output = tokio::fs::File::create(&output_path)
        .await
        .with_context(|| format!("Failed to create output file {}", output_path.display()))?;

    let tls_config = init_tls_config().context("Failed to initialize TLS configuration")?;
    let transport: Arc<dyn RoundTrip> = Arc::new(HyperTransport::new(
        tls_config,
        TransportTimeouts::from(&config),
        config.user_agent.clone(),
    ));
    let settings = PipelineSettings::from(&config);

    info!(
        "Writing results to {} ({} workers, {}s request timeout)",
        output_path.display(),
        settings.workers,
        settings.fetch.request_timeout.as_secs()
    );

    let start = Instant::now();
    let summary = run_pipeline(input, BufWriter::new(output), transport, &settings)
        .await
        .context("Scan aborted while writing results")?;
    let elapsed_seconds = start.elapsed().as_secs_f64();

    print_error_statistics(&summary.stats);
    let counters = summary.counters;
    print_run_summary(
        counters.enqueued,
        counters.failed,
        counters.https_only,
        elapsed_seconds,
    );

    Ok(ScanReport {
        total_hosts: counters.enqueued,
        records_written: counters.written,
        failed: counters.failed,
        https_only: counters.https_only,
        output_path,
        elapsed_seconds,
    })
}
