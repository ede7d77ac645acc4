//! In-memory status model: clients and their backup histories.

pub mod backup;
pub mod client;
pub mod flags;
pub mod list;

pub use backup::{BackupEntry, EntryId};
pub use client::{ClientRecord, ClientStatus};
pub use flags::BackupFlags;
pub use list::BackupList;
