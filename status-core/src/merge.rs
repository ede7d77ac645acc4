//! Reconciles a freshly decoded backup list with the one already held.
//!
//! The persisted list is updated in place so that a backup present in both
//! keeps its [`EntryId`](crate::model::EntryId). A UI can then hold on to a
//! selection across refreshes. Backups missing from the new list are dropped
//! and, if the UI had one of them selected, the selection is cleared.

use crate::model::BackupList;
use crate::selection::Selection;

/// What a merge did to the persisted list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Entries present in both lists, refreshed in place
    pub updated: usize,
    /// Entries only in the persisted list, dropped
    pub removed: usize,
    /// Entries only in the incoming list, spliced in
    pub inserted: usize,
    /// Whether a removal cleared the selection
    pub selection_cleared: bool,
}

/// Merge `incoming` into `persisted`, leaving `incoming` empty.
///
/// `persisted` must be sorted by descending backup number; `incoming` may be
/// in any order. On return `persisted` holds the union of both number sets,
/// still sorted descending and free of duplicates.
pub fn merge_backups(
    persisted: &mut BackupList,
    incoming: &mut BackupList,
    selection: &mut Selection,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    let mut cursor = persisted.head_slot();
    while let Some(slot) = cursor {
        cursor = persisted.next_slot(slot);
        let Some(number) = persisted.entry(slot).map(|entry| entry.number) else {
            break;
        };

        let fresh = incoming
            .slot_of_number(number)
            .and_then(|found| incoming.unlink(found));
        match fresh {
            Some(fresh) => {
                if let Some(entry) = persisted.entry_mut(slot) {
                    entry.refresh_from(fresh);
                }
                outcome.updated += 1;
            }
            None => {
                if let Some(gone) = persisted.unlink(slot) {
                    if selection.invalidate(gone.id()) {
                        outcome.selection_cleared = true;
                    }
                    outcome.removed += 1;
                }
            }
        }
    }

    // Only brand-new numbers are left in `incoming` now.
    while let Some(fresh) = incoming.pop_front() {
        let mut at = persisted.head_slot();
        while let Some(slot) = at {
            match persisted.entry(slot) {
                Some(entry) if fresh.number < entry.number => at = persisted.next_slot(slot),
                _ => break,
            }
        }

        match at {
            // A repeated number inside one incoming list lands on the
            // entry merged a moment ago; refresh it rather than duplicate it.
            Some(slot) if persisted.entry(slot).map(|e| e.number) == Some(fresh.number) => {
                if let Some(entry) = persisted.entry_mut(slot) {
                    entry.refresh_from(fresh);
                }
                outcome.updated += 1;
            }
            Some(slot) => {
                persisted.insert_before(slot, fresh);
                outcome.inserted += 1;
            }
            None => {
                persisted.push_back(fresh);
                outcome.inserted += 1;
            }
        }
    }

    outcome
}
