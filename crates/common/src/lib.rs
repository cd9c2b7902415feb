//! Eyestream Common Utilities
//!
//! Shared infrastructure for all Eyestream crates:
//! - Error types and result aliases (frame-local vs fatal)
//! - Session clock and rate limiting for sample stamping and status logs
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
