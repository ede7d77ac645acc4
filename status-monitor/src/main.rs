//! Status Monitor - Main entry point
//!
//! Follows a backup server's status feed, or replays a captured one, and
//! prints every decoded snapshot.

use anyhow::Result;
use clap::Parser;
use status_monitor::config::{Config, DisplayFormat};
use status_monitor::daemon::shutdown::ShutdownCoordinator;
use status_monitor::render::View;
use status_monitor::transport::{replay_file, FeedClient};
use status_monitor::{utils, Session};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Status feed address, host:port (overrides config)
    #[arg(short, long)]
    address: Option<String>,

    /// Decode a captured feed from FILE instead of connecting
    #[arg(short, long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Bytes per chunk when replaying
    #[arg(long, default_value_t = 4096)]
    chunk_size: usize,

    /// Print snapshots as JSON (overrides config)
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn print_snapshot(view: &View, session: &Session) {
    match view.render(session.registry(), session.selection()) {
        Ok(out) => {
            if view.format == DisplayFormat::Text {
                println!("--- snapshot {} ---", session.snapshots());
            }
            print!("{}", out);
            if view.format == DisplayFormat::Json {
                println!();
            }
        }
        Err(e) => tracing::error!("Failed to render snapshot: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    if let Some(address) = args.address {
        config.feed.address = address;
    }
    if args.json {
        config.display.format = DisplayFormat::Json;
    }

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    tracing::info!("Starting status-monitor v{}", env!("CARGO_PKG_VERSION"));

    let view = View::from(&config.display);

    if let Some(path) = args.replay {
        let mut session = Session::new();
        let stats = replay_file(&path, args.chunk_size, &mut session, |_| {}).await?;
        print_snapshot(&view, &session);
        if stats.decode_errors > 0 {
            anyhow::bail!("{} snapshot(s) in {} failed to decode", stats.decode_errors, path.display());
        }
        return Ok(());
    }

    config.validate()?;

    let shutdown_coordinator = ShutdownCoordinator::new();
    let client = FeedClient::new(config.feed.clone(), shutdown_coordinator.token());

    let client_handle = tokio::spawn(async move {
        let mut session = Session::new();
        client.run(&mut session, |s| print_snapshot(&view, s)).await;
    });

    // Wait for shutdown signal
    shutdown_coordinator.wait_for_signal().await?;

    shutdown_coordinator
        .drain("Feed client", client_handle, Duration::from_secs(3))
        .await;

    Ok(())
}
