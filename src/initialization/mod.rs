//! Process-wide setup.
//!
//! This module provides:
//! - Logger setup (`env_logger` with plain or JSON output)
//! - The rustls client configuration shared by every HTTPS probe
//!
//! All initialization functions return [`InitializationError`](crate::error_handling::InitializationError).

mod logger;
mod tls;

pub use logger::{effective_log_level, init_logger_with};
pub use tls::init_tls_config;
