//! Byte sources for the status feed: a live server socket or a capture file.

pub mod client;
pub mod replay;

pub use client::FeedClient;
pub use replay::{replay_file, ReplayStats};
