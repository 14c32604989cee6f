//! Main application entry point (CLI binary).
//!
//! Thin wrapper around the `host_scan` library: argument parsing, logger
//! setup, heap accounting and user-facing output.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use host_scan::initialization::{effective_log_level, init_logger_with};
use host_scan::memory::CountingAllocator;
use host_scan::{run_scan, Config};

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator::new();

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = effective_log_level(config.log_level.clone().into());
    init_logger_with(log_level, config.log_format.clone())
        .context("Failed to initialize logger")?;

    match run_scan(config).await {
        Ok(report) => {
            println!(
                "Probed {} host{} ({} failed, {} HTTPS-only) in {:.1}s",
                report.total_hosts,
                if report.total_hosts == 1 { "" } else { "s" },
                report.failed,
                report.https_only,
                report.elapsed_seconds
            );
            println!(
                "{} records written to {}",
                report.records_written,
                report.output_path.display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("host_scan error: {:#}", e);
            process::exit(1);
        }
    }
}
