//! Arena-backed doubly-linked list of backup entries.
//!
//! Nodes live in a slot vector and point at their neighbours by index.
//! Unlinked slots go on a free list and are reused by later insertions, so
//! the arena never grows past the largest history a client has had.
//!
//! The list itself does not enforce any ordering: the decoder appends in
//! arrival order and the merge engine keeps persisted lists sorted by
//! descending backup number.

use super::backup::{BackupEntry, EntryId};
use serde::ser::{Serialize, Serializer};

/// Index of an occupied arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot(usize);

#[derive(Debug, Clone)]
struct Node {
    entry: BackupEntry,
    prev: Option<Slot>,
    next: Option<Slot>,
}

#[derive(Debug, Clone, Default)]
pub struct BackupList {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<Slot>,
    tail: Option<Slot>,
    len: usize,
}

impl BackupList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<&BackupEntry> {
        self.head.and_then(|slot| self.entry(slot))
    }

    pub fn last(&self) -> Option<&BackupEntry> {
        self.tail.and_then(|slot| self.entry(slot))
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Backup numbers in list order.
    pub fn numbers(&self) -> Vec<u64> {
        self.iter().map(|entry| entry.number).collect()
    }

    pub fn get(&self, id: EntryId) -> Option<&BackupEntry> {
        self.slot_of(id).and_then(|slot| self.entry(slot))
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.slot_of(id).is_some()
    }

    pub fn find_number(&self, number: u64) -> Option<&BackupEntry> {
        self.slot_of_number(number).and_then(|slot| self.entry(slot))
    }

    /// The entry linked before `id`.
    pub fn before(&self, id: EntryId) -> Option<&BackupEntry> {
        let node = self.node(self.slot_of(id)?)?;
        self.entry(node.prev?)
    }

    /// The entry linked after `id`.
    pub fn after(&self, id: EntryId) -> Option<&BackupEntry> {
        let node = self.node(self.slot_of(id)?)?;
        self.entry(node.next?)
    }

    /// Append in O(1).
    pub fn push_back(&mut self, entry: BackupEntry) {
        let prev = self.tail;
        let slot = self.alloc(Node {
            entry,
            prev,
            next: None,
        });
        match prev.and_then(|p| self.node_mut(p)) {
            Some(node) => node.next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }

    pub fn pop_front(&mut self) -> Option<BackupEntry> {
        let head = self.head?;
        self.unlink(head)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub(crate) fn head_slot(&self) -> Option<Slot> {
        self.head
    }

    pub(crate) fn next_slot(&self, slot: Slot) -> Option<Slot> {
        self.node(slot).and_then(|node| node.next)
    }

    pub(crate) fn entry(&self, slot: Slot) -> Option<&BackupEntry> {
        self.node(slot).map(|node| &node.entry)
    }

    pub(crate) fn entry_mut(&mut self, slot: Slot) -> Option<&mut BackupEntry> {
        self.node_mut(slot).map(|node| &mut node.entry)
    }

    pub(crate) fn slot_of(&self, id: EntryId) -> Option<Slot> {
        self.find_slot(|entry| entry.id() == id)
    }

    pub(crate) fn slot_of_number(&self, number: u64) -> Option<Slot> {
        self.find_slot(|entry| entry.number == number)
    }

    /// Link `entry` immediately before the occupied slot `at`.
    pub(crate) fn insert_before(&mut self, at: Slot, entry: BackupEntry) -> Slot {
        let prev = self.node(at).and_then(|node| node.prev);
        let slot = self.alloc(Node {
            entry,
            prev,
            next: Some(at),
        });
        if let Some(node) = self.node_mut(at) {
            node.prev = Some(slot);
        }
        match prev.and_then(|p| self.node_mut(p)) {
            Some(node) => node.next = Some(slot),
            None => self.head = Some(slot),
        }
        slot
    }

    /// Detach the node in `slot`, relink its neighbours and hand back the entry.
    pub(crate) fn unlink(&mut self, slot: Slot) -> Option<BackupEntry> {
        let node = self.nodes.get_mut(slot.0)?.take()?;
        match node.prev.and_then(|p| self.node_mut(p)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.node_mut(n)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }
        self.free.push(slot.0);
        self.len -= 1;
        Some(node.entry)
    }

    fn find_slot(&self, mut matches: impl FnMut(&BackupEntry) -> bool) -> Option<Slot> {
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let node = self.node(slot)?;
            if matches(&node.entry) {
                return Some(slot);
            }
            cursor = node.next;
        }
        None
    }

    fn alloc(&mut self, node: Node) -> Slot {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                Slot(index)
            }
            None => {
                self.nodes.push(Some(node));
                Slot(self.nodes.len() - 1)
            }
        }
    }

    fn node(&self, slot: Slot) -> Option<&Node> {
        self.nodes.get(slot.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, slot: Slot) -> Option<&mut Node> {
        self.nodes.get_mut(slot.0).and_then(Option::as_mut)
    }
}

impl Serialize for BackupList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'a> IntoIterator for &'a BackupList {
    type Item = &'a BackupEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Walks a [`BackupList`] from either end.
pub struct Iter<'a> {
    list: &'a BackupList,
    front: Option<Slot>,
    back: Option<Slot>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a BackupEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.entry)
    }
}

impl ExactSizeIterator for Iter<'_> {}
