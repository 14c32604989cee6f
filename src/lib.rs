//! host_scan library: HTTP/HTTPS reachability survey of large host lists.
//!
//! Every host is probed over plain HTTP and, unless that already landed on
//! HTTPS, over HTTPS. Each redirect hop is captured with its status, protocol,
//! headers and TLS session details, and one JSON record per host is written to
//! the output file.
//!
//! # Example
//!
//! ```no_run
//! use host_scan::{run_scan, Config};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     input: PathBuf::from("hosts.txt"),
//!     output: Some(PathBuf::from("results.json")),
//!     workers: 50,
//!     ..Default::default()
//! };
//!
//! let report = run_scan(config).await?;
//! println!(
//!     "Probed {} hosts: {} failed, {} HTTPS-only",
//!     report.total_hosts, report.failed, report.https_only
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Library use without the network
//!
//! [`pipeline::run_pipeline`] is generic over its input, output and
//! [`transport::RoundTrip`] engine, so a scan can be driven from memory
//! against a scripted transport.

mod app;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod memory;
pub mod models;
pub mod pipeline;
pub mod probe;
mod run;
pub mod transport;

pub use config::{Config, LogFormat, LogLevel};
pub use models::{CertificateSummary, HostResult, Observation, TlsInfo};
pub use run::{run_scan, ScanReport};
