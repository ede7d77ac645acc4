//! Replay a captured status feed from disk.
//!
//! The file is fed to the decoder in fixed-size chunks, so a capture can be
//! used to check that decoding does not depend on how reads are split.

use crate::session::Session;
use crate::utils::errors::{MonitorError, Result};
use bytes::BytesMut;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

/// Totals for one replayed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub chunks: u64,
    pub bytes: u64,
    pub snapshots: u64,
    pub decode_errors: u64,
}

/// Feed `path` into `session` `chunk_size` bytes at a time.
pub async fn replay_file<F>(path: &Path, chunk_size: usize, session: &mut Session, mut on_snapshot: F) -> Result<ReplayStats>
where
    F: FnMut(&Session),
{
    if chunk_size == 0 {
        return Err(MonitorError::Config("chunk size must be positive".to_string()));
    }

    let mut file = File::open(path).await?;
    let mut stats = ReplayStats::default();
    let mut buf = BytesMut::with_capacity(chunk_size);

    info!("Replaying {} in {}-byte chunks", path.display(), chunk_size);

    loop {
        buf.clear();
        // `take` caps the read so every chunk but the last is exactly chunk_size.
        let n = (&mut file).take(chunk_size as u64).read_buf(&mut buf).await?;
        if n == 0 {
            break;
        }
        while buf.len() < chunk_size {
            let more = (&mut file).take((chunk_size - buf.len()) as u64).read_buf(&mut buf).await?;
            if more == 0 {
                break;
            }
        }

        stats.chunks += 1;
        stats.bytes += buf.len() as u64;
        match session.ingest(&buf) {
            Ok(completed) => {
                stats.snapshots += completed;
                if completed > 0 {
                    on_snapshot(session);
                }
            }
            Err(_) => stats.decode_errors += 1,
        }
    }

    if session.in_progress() {
        warn!("{} ends partway through a snapshot", path.display());
    }
    session.restart_stream();

    info!(
        chunks = stats.chunks,
        bytes = stats.bytes,
        snapshots = stats.snapshots,
        errors = stats.decode_errors,
        "Replay finished"
    );
    Ok(stats)
}
