//! Status Monitor Library
//!
//! Connects to a backup server's status port, decodes the snapshot stream
//! with `status_core` and renders what it learns.

pub mod config;
pub mod daemon;
pub mod render;
pub mod session;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use session::Session;
pub use utils::errors::MonitorError;
pub type Result<T> = std::result::Result<T, MonitorError>;
