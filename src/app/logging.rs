//! Progress logging.

use std::time::Instant;

use log::info;

use crate::memory::MemoryStats;

/// Logs how many hosts have been written, the rate so far and heap usage.
pub fn log_progress(start_time: Instant, processed: usize, memory: MemoryStats) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        processed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Processed {} hosts in {:.2} seconds (~{:.2} hosts/sec), {}",
        processed, elapsed_secs, rate, memory
    );
}
