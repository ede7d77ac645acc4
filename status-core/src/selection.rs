//! The UI's "currently selected backup".
//!
//! The front end owns the selection and moves it around. The feed decoder
//! only ever clears it, and only at the moment the entry it names is
//! removed from a backup list.

use crate::model::EntryId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection(Option<EntryId>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: EntryId) {
        self.0 = Some(id);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn get(&self) -> Option<EntryId> {
        self.0
    }

    pub fn is_selected(&self, id: EntryId) -> bool {
        self.0 == Some(id)
    }

    /// Drop the selection if it names `removed`. Returns true if it did.
    pub(crate) fn invalidate(&mut self, removed: EntryId) -> bool {
        if self.is_selected(removed) {
            self.0 = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_only_matching_entry() {
        let mut selection = Selection::new();
        selection.select(EntryId::new(4));

        assert!(!selection.invalidate(EntryId::new(5)));
        assert_eq!(selection.get(), Some(EntryId::new(4)));

        assert!(selection.invalidate(EntryId::new(4)));
        assert_eq!(selection.get(), None);
        assert!(!selection.invalidate(EntryId::new(4)));
    }
}
