//! Podium Telemetry - Structured Logging
//!
//! All crates log through `tracing`; this module installs the subscriber.

pub mod tracer;

pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
