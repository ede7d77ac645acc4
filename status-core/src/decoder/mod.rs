//! Byte stream to structural events, and the chunk-fed adapter on top.

pub mod feed;
pub mod tokenizer;

pub use feed::StatusFeed;
pub use tokenizer::{EventHandler, JsonEvent, Tokenizer};
