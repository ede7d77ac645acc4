//! Status feed decoder for a backup server monitor.
//!
//! The server streams JSON snapshots describing every client and its backup
//! history. [`StatusFeed`] decodes them incrementally, chunk by chunk, into
//! a [`Registry`] that a front end can read between calls. Backup lists are
//! merged in place so entries keep their [`EntryId`] across refreshes.

pub mod decoder;
pub mod error;
pub mod merge;
pub mod model;
pub mod registry;
pub mod selection;
mod stream;
pub mod timestamp;

// Re-export commonly used types
pub use decoder::StatusFeed;
pub use error::{DecodeError, Result};
pub use merge::{merge_backups, MergeOutcome};
pub use model::{BackupEntry, BackupFlags, BackupList, ClientRecord, ClientStatus, EntryId};
pub use registry::{ClientId, Registry};
pub use selection::Selection;
