//! # websoul-core
//!
//! Pieces shared by every websoul crate: the `tracing` subscriber setup used
//! by the binary and the in-memory log capture used by tests.

#![deny(unsafe_code)]

pub mod logging;

pub use logging::{CapturedLogs, LogFormat, capture_logs, init_subscriber};
