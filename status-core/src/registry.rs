//! Registry of every client the feed has mentioned.
//!
//! Clients are kept in the order they were first seen (the server sends
//! them sorted by name, but nothing here relies on that). Records are never
//! removed: a client that drops out of the feed stays with its last known
//! status.

use crate::model::{BackupEntry, ClientRecord, EntryId};
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;

/// Index of a client in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(usize);

#[derive(Debug, Default)]
pub struct Registry {
    clients: Vec<ClientRecord>,
    by_name: HashMap<String, ClientId>,
    next_entry_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn clients(&self) -> impl Iterator<Item = &ClientRecord> {
        self.clients.iter()
    }

    pub fn get(&self, id: ClientId) -> Option<&ClientRecord> {
        self.clients.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ClientId) -> Option<&mut ClientRecord> {
        self.clients.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<ClientId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&ClientRecord> {
        self.find(name).and_then(|id| self.get(id))
    }

    /// Exact-name lookup, appending a fresh record if the name is new.
    ///
    /// Registers immediately. The feed decoder instead holds a new client
    /// back until its record is complete, so a snapshot that fails halfway
    /// never adds it.
    pub fn find_or_create(&mut self, name: &str) -> ClientId {
        match self.find(name) {
            Some(id) => id,
            None => self.register(ClientRecord::new(name)),
        }
    }

    /// Append a record built elsewhere. The caller has already checked that
    /// the name is not registered.
    pub(crate) fn register(&mut self, record: ClientRecord) -> ClientId {
        let id = ClientId(self.clients.len());
        self.by_name.insert(record.name().to_string(), id);
        self.clients.push(record);
        id
    }

    /// Decode `token` into the client's status. Returns false for an unknown id.
    pub fn set_status(&mut self, id: ClientId, token: &str) -> bool {
        match self.get_mut(id) {
            Some(client) => {
                client.set_status_token(token);
                true
            }
            None => false,
        }
    }

    /// Hand out the next backup entry identity.
    pub fn allocate_entry_id(&mut self) -> EntryId {
        self.next_entry_id += 1;
        EntryId::new(self.next_entry_id)
    }

    /// Find the client and backup an entry id refers to.
    pub fn locate(&self, id: EntryId) -> Option<(&ClientRecord, &BackupEntry)> {
        self.clients
            .iter()
            .find_map(|client| client.backups().get(id).map(|entry| (client, entry)))
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.clients)
    }
}
