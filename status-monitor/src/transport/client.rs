//! TCP client for the backup server's status port.
//!
//! The server pushes one JSON snapshot after another down a plain socket.
//! Reads are handed to the [`Session`] exactly as they arrive; the decoder
//! takes care of snapshots that straddle reads.

use crate::config::FeedConfig;
use crate::session::Session;
use crate::utils::errors::{MonitorError, Result};
use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Status feed client that reconnects until told to stop.
pub struct FeedClient {
    config: FeedConfig,
    shutdown: CancellationToken,
}

impl FeedClient {
    pub fn new(config: FeedConfig, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    /// Read the feed with automatic reconnection.
    ///
    /// `on_snapshot` runs after every read that completed at least one
    /// snapshot.
    pub async fn run<F>(&self, session: &mut Session, mut on_snapshot: F)
    where
        F: FnMut(&Session),
    {
        let mut backoff_ms = self.config.reconnect_initial_ms;

        loop {
            if self.shutdown.is_cancelled() {
                info!("Feed client shutting down");
                return;
            }

            match self.connect_and_read(session, &mut on_snapshot).await {
                Ok(()) => {
                    info!("Feed connection closed by server");
                    backoff_ms = self.config.reconnect_initial_ms;
                }
                Err(e) => {
                    warn!("Feed connection error: {}", e);
                }
            }
            session.restart_stream();

            if self.shutdown.is_cancelled() {
                return;
            }

            info!("Reconnecting in {}ms...", backoff_ms);
            tokio::select! {
                _ = tokio::time::sleep(tokio::time::Duration::from_millis(backoff_ms)) => {}
                _ = self.shutdown.cancelled() => return,
            }

            backoff_ms = (backoff_ms * 2).min(self.config.reconnect_max_ms);
        }
    }

    async fn connect_and_read<F>(&self, session: &mut Session, on_snapshot: &mut F) -> Result<()>
    where
        F: FnMut(&Session),
    {
        info!("Connecting to status feed: {}", self.config.address);

        let mut stream = TcpStream::connect(&self.config.address)
            .await
            .map_err(|source| MonitorError::Connect {
                address: self.config.address.clone(),
                source,
            })?;

        info!("Connected to status feed");

        let mut buf = BytesMut::with_capacity(self.config.read_buffer);
        loop {
            buf.clear();
            buf.reserve(self.config.read_buffer);

            let n = tokio::select! {
                read = stream.read_buf(&mut buf) => read?,
                _ = self.shutdown.cancelled() => return Ok(()),
            };
            if n == 0 {
                return Ok(());
            }
            debug!(bytes = n, "status chunk");

            // Decode failures only cost the current snapshot; keep reading.
            if let Ok(completed) = session.ingest(&buf) {
                if completed > 0 {
                    on_snapshot(session);
                }
            }
        }
    }
}
