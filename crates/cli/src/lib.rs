//! `ocean-check` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod check;
pub mod config;

pub use check::{check_records, run, CheckReport, RecordReport};
pub use config::{CheckConfig, ConfigError};
