//! A single backup in a client's history.

use super::flags::BackupFlags;
use serde::Serialize;

/// Stable identity of a backup entry.
///
/// Ids are handed out by the [`Registry`](crate::registry::Registry) and are
/// never reused, so a UI can hold one across feed updates and compare it
/// against whatever the list contains afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupEntry {
    #[serde(skip)]
    id: EntryId,

    /// Backup number, unique within one client's history
    pub number: u64,

    /// Display form of the backup's start time
    pub timestamp: Option<String>,

    pub flags: BackupFlags,
}

impl BackupEntry {
    pub fn new(id: EntryId, number: u64) -> Self {
        Self {
            id,
            number,
            timestamp: None,
            flags: BackupFlags::empty(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: Option<String>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_flags(mut self, flags: BackupFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Take over the attributes of a freshly decoded copy of this backup,
    /// keeping our own identity.
    pub(crate) fn refresh_from(&mut self, fresh: BackupEntry) {
        self.flags = fresh.flags;
        self.timestamp = fresh.timestamp;
    }
}
