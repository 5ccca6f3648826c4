//! Shared utilities for the Lumeos contract.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
