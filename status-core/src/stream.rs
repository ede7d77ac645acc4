//! Turns tokenizer events into registry updates.
//!
//! A snapshot looks like
//!
//! ```text
//! {"clients": [
//!     {"name": "alpha", "status": "idle", "backups": [
//!         {"number": 3, "timestamp": 1700000000, "current": 1, ...},
//!         ...
//!     ]},
//!     ...
//! ]}
//! ```
//!
//! Entries of a client's `backups` array are collected into a transient
//! list; when the array closes that list is merged into the client's
//! persisted one and the client is done. A client object that carries no
//! `backups` array is done when the object itself closes; its backup list
//! is left as it was.

use crate::decoder::tokenizer::{EventHandler, JsonEvent};
use crate::error::{DecodeError, Result};
use crate::merge::merge_backups;
use crate::model::{BackupEntry, BackupFlags, BackupList, ClientRecord};
use crate::registry::{ClientId, Registry};
use crate::selection::Selection;
use crate::timestamp::format_epoch;
use tracing::debug;

/// Longest key prefix that is remembered.
pub(crate) const KEY_CAPACITY: usize = 32;

const BACKUPS_KEY: &str = "backups";

/// Most recent map key, truncated to [`KEY_CAPACITY`] bytes.
#[derive(Debug, Default)]
struct LastKey(String);

impl LastKey {
    fn set(&mut self, key: &str) {
        let mut end = key.len().min(KEY_CAPACITY);
        while !key.is_char_boundary(end) {
            end -= 1;
        }
        self.0.clear();
        self.0.push_str(&key[..end]);
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

/// The client whose object is being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Current {
    Registered(ClientId),
    /// Not yet in the registry; see `SnapshotState::pending_client`.
    Pending,
}

/// Fields of the backup object being decoded.
#[derive(Debug, Default)]
struct PendingEntry {
    number: u64,
    timestamp: Option<String>,
    flags: BackupFlags,
}

/// Decode state that outlives a single chunk.
#[derive(Debug, Default)]
pub(crate) struct SnapshotState {
    depth: usize,
    last_key: LastKey,
    in_backups: bool,
    current: Option<Current>,
    /// Depth of the map that named `current`.
    client_depth: usize,
    pending_client: Option<ClientRecord>,
    incoming: BackupList,
    entry: PendingEntry,
}

impl SnapshotState {
    /// Map nesting depth; zero between snapshots.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pair the state with the registry and selection it updates.
    pub(crate) fn bind<'a>(
        &'a mut self,
        registry: &'a mut Registry,
        selection: &'a mut Selection,
    ) -> StreamContext<'a> {
        StreamContext {
            state: self,
            registry,
            selection,
        }
    }
}

pub(crate) struct StreamContext<'a> {
    state: &'a mut SnapshotState,
    registry: &'a mut Registry,
    selection: &'a mut Selection,
}

impl EventHandler for StreamContext<'_> {
    fn handle(&mut self, event: JsonEvent<'_>) -> Result<()> {
        if self.state.depth == 0 {
            if let Some(kind) = value_kind(&event) {
                return Err(DecodeError::NotAnObject { kind });
            }
        }
        match event {
            JsonEvent::Key(key) => {
                self.state.last_key.set(key);
                Ok(())
            }
            JsonEvent::StartMap => {
                self.state.depth += 1;
                if self.state.in_backups {
                    self.flush_entry();
                }
                Ok(())
            }
            JsonEvent::EndMap => {
                if self.state.current.is_some()
                    && !self.state.in_backups
                    && self.state.depth == self.state.client_depth
                {
                    self.release_client();
                }
                self.state.depth = self.state.depth.saturating_sub(1);
                Ok(())
            }
            JsonEvent::StartArray => {
                if self.state.last_key.as_str() == BACKUPS_KEY {
                    self.state.in_backups = true;
                }
                Ok(())
            }
            JsonEvent::EndArray => {
                if self.state.in_backups {
                    self.state.in_backups = false;
                    self.flush_entry();
                    self.finish_client();
                }
                Ok(())
            }
            JsonEvent::String(value) => self.on_string(value),
            JsonEvent::Integer(value) => self.on_integer(value),
            JsonEvent::Double(_) => Err(self.unexpected("number")),
            JsonEvent::Bool(_) => Err(self.unexpected("boolean")),
            JsonEvent::Null => Err(self.unexpected("null")),
        }
    }
}

impl StreamContext<'_> {
    fn on_string(&mut self, value: &str) -> Result<()> {
        match self.state.last_key.as_str() {
            "name" => {
                if self.state.current.is_some() {
                    return Err(DecodeError::NestedClient {
                        name: value.to_string(),
                    });
                }
                let current = match self.registry.find(value) {
                    Some(id) => Current::Registered(id),
                    None => {
                        self.state.pending_client = Some(ClientRecord::new(value));
                        Current::Pending
                    }
                };
                self.state.current = Some(current);
                self.state.client_depth = self.state.depth;
                Ok(())
            }
            "status" => match self.state.current {
                Some(Current::Registered(id)) => {
                    self.registry.set_status(id, value);
                    Ok(())
                }
                Some(Current::Pending) => {
                    if let Some(client) = self.state.pending_client.as_mut() {
                        client.set_status_token(value);
                    }
                    Ok(())
                }
                None => Err(self.unexpected_string(value)),
            },
            _ => Err(self.unexpected_string(value)),
        }
    }

    fn on_integer(&mut self, value: i64) -> Result<()> {
        if !self.state.in_backups || self.state.current.is_none() {
            return Err(self.unexpected_integer(value));
        }
        let entry = &mut self.state.entry;
        match self.state.last_key.as_str() {
            // Negative numbers wrap into the unsigned range rather than
            // being rejected.
            "number" => entry.number = value as u64,
            "timestamp" => entry.timestamp = Some(format_epoch(value)),
            key => match BackupFlags::from_field(key) {
                Some(flag) => {
                    if value != 0 {
                        entry.flags.insert(flag);
                    }
                }
                None => return Err(self.unexpected_integer(value)),
            },
        }
        Ok(())
    }

    /// Move the accumulated backup fields into the transient list. A record
    /// that never got a number is dropped.
    fn flush_entry(&mut self) {
        let pending = std::mem::take(&mut self.state.entry);
        if pending.number == 0 {
            return;
        }
        let id = self.registry.allocate_entry_id();
        self.state.incoming.push_back(
            BackupEntry::new(id, pending.number)
                .with_timestamp(pending.timestamp)
                .with_flags(pending.flags),
        );
    }

    /// The client's backups array has closed: reconcile, register, move on.
    fn finish_client(&mut self) {
        let Some(current) = self.state.current else {
            self.state.incoming.clear();
            return;
        };
        let client = match current {
            Current::Registered(id) => self.registry.get_mut(id),
            Current::Pending => self.state.pending_client.as_mut(),
        };
        if let Some(client) = client {
            let outcome = merge_backups(client.backups_mut(), &mut self.state.incoming, self.selection);
            debug!(
                client = client.name(),
                updated = outcome.updated,
                removed = outcome.removed,
                inserted = outcome.inserted,
                selection_cleared = outcome.selection_cleared,
                "merged backup list"
            );
        }
        self.state.incoming.clear();
        self.release_client();
    }

    /// Stop populating the current client, registering it if it is new.
    fn release_client(&mut self) {
        self.state.current = None;
        if let Some(record) = self.state.pending_client.take() {
            debug!(client = record.name(), "registering new client");
            self.registry.register(record);
        }
    }

    fn unexpected(&self, kind: &'static str) -> DecodeError {
        DecodeError::UnexpectedValue {
            key: self.state.last_key.as_str().to_string(),
            kind,
        }
    }

    fn unexpected_string(&self, value: &str) -> DecodeError {
        DecodeError::UnexpectedString {
            key: self.state.last_key.as_str().to_string(),
            value: value.to_string(),
        }
    }

    fn unexpected_integer(&self, value: i64) -> DecodeError {
        DecodeError::UnexpectedInteger {
            key: self.state.last_key.as_str().to_string(),
            value,
        }
    }
}

/// Name of the value an event opens, for anything that is not an object.
fn value_kind(event: &JsonEvent<'_>) -> Option<&'static str> {
    match event {
        JsonEvent::StartArray => Some("array"),
        JsonEvent::String(_) => Some("string"),
        JsonEvent::Integer(_) | JsonEvent::Double(_) => Some("number"),
        JsonEvent::Bool(_) => Some("boolean"),
        JsonEvent::Null => Some("null"),
        JsonEvent::StartMap | JsonEvent::EndMap | JsonEvent::Key(_) | JsonEvent::EndArray => None,
    }
}
