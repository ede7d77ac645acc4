//! Client status records.

use super::list::BackupList;
use serde::Serialize;
use std::fmt;

/// What the server reports a client to be doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    /// No status seen yet, or a token this monitor does not know
    #[default]
    Unset,
    Idle,
    Running,
    ClientCrashed,
    ServerCrashed,
    Scanning,
    Backup,
    Merging,
    Shuffling,
    Listing,
    Restoring,
    Verifying,
    Deleting,
}

const STATUS_TOKENS: [(&str, ClientStatus); 12] = [
    ("idle", ClientStatus::Idle),
    ("running", ClientStatus::Running),
    ("client crashed", ClientStatus::ClientCrashed),
    ("server crashed", ClientStatus::ServerCrashed),
    ("scanning", ClientStatus::Scanning),
    ("backup", ClientStatus::Backup),
    ("merging", ClientStatus::Merging),
    ("shuffling", ClientStatus::Shuffling),
    ("listing", ClientStatus::Listing),
    ("restoring", ClientStatus::Restoring),
    ("verifying", ClientStatus::Verifying),
    ("deleting", ClientStatus::Deleting),
];

impl ClientStatus {
    /// Decode a feed status token. Unknown tokens decode to `Unset`.
    pub fn from_token(token: &str) -> Self {
        STATUS_TOKENS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, status)| *status)
            .unwrap_or_default()
    }

    pub fn as_token(self) -> &'static str {
        STATUS_TOKENS
            .iter()
            .find(|(_, status)| *status == self)
            .map(|(name, _)| *name)
            .unwrap_or("unset")
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_token())
    }
}

/// Everything known about one client of the backup server.
#[derive(Debug, Clone, Serialize)]
pub struct ClientRecord {
    name: String,
    pub status: ClientStatus,
    backups: BackupList,
}

impl ClientRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ClientStatus::default(),
            backups: BackupList::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backup history, newest (highest number) first.
    pub fn backups(&self) -> &BackupList {
        &self.backups
    }

    pub(crate) fn backups_mut(&mut self) -> &mut BackupList {
        &mut self.backups
    }

    pub fn set_status_token(&mut self, token: &str) {
        self.status = ClientStatus::from_token(token);
    }
}
