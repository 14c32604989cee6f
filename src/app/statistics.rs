//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

/// Prints error and info counters to the log, skipping zero counts.
pub fn print_error_statistics(stats: &ProcessingStats) {
    let total_errors = stats.total_errors();
    let total_info = stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

/// One-line summary of the run.
pub fn print_run_summary(total_hosts: usize, failed: usize, https_only: usize, elapsed_seconds: f64) {
    info!(
        "Probed {} host{} ({} with errors, {} HTTPS-only) in {:.1}s",
        total_hosts,
        if total_hosts == 1 { "" } else { "s" },
        failed,
        https_only,
        elapsed_seconds
    );
}
