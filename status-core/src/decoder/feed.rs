//! Chunk-fed entry point.
//!
//! [`StatusFeed`] keeps one tokenizer alive for as long as a snapshot is
//! open, so a document split across any number of transport reads decodes
//! the same as one delivered whole. Once the top-level object closes the
//! tokenizer is finalized and dropped; the next byte starts a new one.

use super::tokenizer::Tokenizer;
use crate::error::Result;
use crate::registry::Registry;
use crate::selection::Selection;
use crate::stream::SnapshotState;
use tracing::debug;

/// Decode state for one status connection.
///
/// Independent feeds may share nothing but the registry they update; each
/// connection gets its own `StatusFeed`.
#[derive(Debug, Default)]
pub struct StatusFeed {
    tokenizer: Option<Tokenizer>,
    state: SnapshotState,
    snapshots: u64,
}

impl StatusFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, applying every event to `registry`.
    ///
    /// On error the partial snapshot is thrown away and the next call starts
    /// from a clean state. Clients already merged before the error keep
    /// their updates.
    pub fn feed(&mut self, chunk: &[u8], registry: &mut Registry, selection: &mut Selection) -> Result<()> {
        let result = self.feed_chunk(chunk, registry, selection);
        if let Err(ref e) = result {
            debug!(error = %e, "discarding partial snapshot");
            self.reset();
        }
        result
    }

    /// Drop any half-decoded snapshot.
    pub fn reset(&mut self) {
        self.tokenizer = None;
        self.state.reset();
    }

    /// Number of snapshots fully decoded so far.
    pub fn snapshots(&self) -> u64 {
        self.snapshots
    }

    /// Whether a snapshot is partway through decoding.
    pub fn in_progress(&self) -> bool {
        self.tokenizer.as_ref().is_some_and(|t| t.has_started())
    }

    fn feed_chunk(&mut self, chunk: &[u8], registry: &mut Registry, selection: &mut Selection) -> Result<()> {
        let mut rest = chunk;
        while !rest.is_empty() {
            let tokenizer = self.tokenizer.get_or_insert_with(Tokenizer::new);
            let mut ctx = self.state.bind(registry, selection);
            let consumed = tokenizer.parse(rest, &mut ctx)?;
            rest = &rest[consumed..];

            if !tokenizer.has_started() {
                // Only whitespace so far; nothing to keep.
                self.tokenizer = None;
            } else if tokenizer.is_complete() || self.state.depth() == 0 {
                let mut ctx = self.state.bind(registry, selection);
                tokenizer.complete(&mut ctx)?;
                let bytes = tokenizer.offset();
                self.tokenizer = None;
                self.state.reset();
                self.snapshots += 1;
                debug!(snapshots = self.snapshots, bytes, clients = registry.len(), "snapshot complete");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClientStatus;

    const SNAPSHOT: &str = r#"{"clients":[{"name":"alpha","status":"idle","backups":[{"number":2,"timestamp":0,"current":1},{"number":1,"timestamp":0}]}]}"#;

    #[test]
    fn test_one_chunk() {
        let mut feed = StatusFeed::new();
        let mut registry = Registry::new();
        feed.feed(SNAPSHOT.as_bytes(), &mut registry, &mut Selection::new()).unwrap();

        assert_eq!(feed.snapshots(), 1);
        assert!(!feed.in_progress());
        let alpha = registry.by_name("alpha").unwrap();
        assert_eq!(alpha.status, ClientStatus::Idle);
        assert_eq!(alpha.backups().numbers(), vec![2, 1]);
    }

    #[test]
    fn test_decoder_survives_between_chunks() {
        let mut feed = StatusFeed::new();
        let mut registry = Registry::new();
        let mut selection = Selection::new();
        let (left, right) = SNAPSHOT.as_bytes().split_at(40);

        feed.feed(left, &mut registry, &mut selection).unwrap();
        assert!(feed.in_progress());
        assert_eq!(feed.snapshots(), 0);

        feed.feed(right, &mut registry, &mut selection).unwrap();
        assert!(!feed.in_progress());
        assert_eq!(feed.snapshots(), 1);
    }

    #[test]
    fn test_error_resets_state() {
        let mut feed = StatusFeed::new();
        let mut registry = Registry::new();
        let mut selection = Selection::new();

        feed.feed(br#"{"clients":[{"name":"alpha","#, &mut registry, &mut selection).unwrap();
        assert!(feed.feed(b"]", &mut registry, &mut selection).is_err());
        assert!(!feed.in_progress());

        feed.feed(SNAPSHOT.as_bytes(), &mut registry, &mut selection).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(feed.snapshots(), 1);
    }

    #[test]
    fn test_whitespace_only_chunk() {
        let mut feed = StatusFeed::new();
        let mut registry = Registry::new();
        feed.feed(b"  \n", &mut registry, &mut Selection::new()).unwrap();
        assert!(!feed.in_progress());
        assert_eq!(feed.snapshots(), 0);
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let mut feed = StatusFeed::new();
        let mut registry = Registry::new();
        let err = feed.feed(b"[", &mut registry, &mut Selection::new()).unwrap_err();
        assert_eq!(err, crate::error::DecodeError::NotAnObject { kind: "array" });
        assert!(!feed.in_progress());
    }

    #[test]
    fn test_state_is_fresh_after_snapshot() {
        let mut feed = StatusFeed::new();
        let mut registry = Registry::new();
        let mut selection = Selection::new();

        // A bare client record as the whole document.
        feed.feed(br#"{"name":"zulu","backups":[{"number":9}]}"#, &mut registry, &mut selection)
            .unwrap();
        assert_eq!(feed.state.depth(), 0);
        assert!(!feed.in_progress());

        feed.feed(SNAPSHOT.as_bytes(), &mut registry, &mut selection).unwrap();
        assert_eq!(registry.by_name("alpha").unwrap().backups().numbers(), vec![2, 1]);
        assert_eq!(registry.by_name("zulu").unwrap().backups().numbers(), vec![9]);
        assert_eq!(feed.snapshots(), 2);
    }
}
