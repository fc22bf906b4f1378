//! Logging utilities.
//!
//! Centralizes logger initialization. The library itself only emits through
//! the `log` facade; `env_logger` is installed by `init_logging`.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
