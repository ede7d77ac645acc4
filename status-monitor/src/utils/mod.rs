//! Utility modules for the status monitor.

pub mod errors;
pub mod logger;

pub use errors::{MonitorError, Result};
