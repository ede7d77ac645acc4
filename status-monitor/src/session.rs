//! Decode state shared by every way of getting bytes into the monitor.

use crate::utils::errors::Result;
use status_core::{Registry, Selection, StatusFeed};
use tracing::warn;

/// One feed plus the registry it populates.
///
/// The registry outlives reconnects; the feed is reset whenever the byte
/// stream behind it is replaced.
#[derive(Debug, Default)]
pub struct Session {
    feed: StatusFeed,
    registry: Registry,
    selection: Selection,
    decode_errors: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one chunk through the decoder.
    ///
    /// Returns how many snapshots the chunk completed. A decode error drops
    /// the snapshot in progress; it comes back as `MonitorError::Decode` so
    /// the caller can decide whether the stream is still worth reading.
    pub fn ingest(&mut self, chunk: &[u8]) -> Result<u64> {
        let before = self.feed.snapshots();
        match self.feed.feed(chunk, &mut self.registry, &mut self.selection) {
            Ok(()) => Ok(self.feed.snapshots() - before),
            Err(e) => {
                self.decode_errors += 1;
                warn!(error = %e, "status feed decode failed");
                Err(e.into())
            }
        }
    }

    /// Forget any half-read snapshot, e.g. after the connection drops.
    pub fn restart_stream(&mut self) {
        if self.feed.in_progress() {
            warn!("discarding snapshot cut off by end of stream");
        }
        self.feed.reset();
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn snapshots(&self) -> u64 {
        self.feed.snapshots()
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }

    pub fn in_progress(&self) -> bool {
        self.feed.in_progress()
    }
}
