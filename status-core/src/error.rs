//! Errors raised while decoding the status feed.
//!
//! Every variant aborts the snapshot being decoded. Syntax-level failures
//! carry the absolute byte offset into the feed; schema failures carry the
//! offending key and value.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("parse error at byte {offset}: {reason}")]
    Syntax { offset: u64, reason: &'static str },

    #[error("integer overflow at byte {offset}")]
    IntegerOverflow { offset: u64 },

    #[error("premature end of input")]
    Incomplete,

    #[error("unexpected string: {key} {value}")]
    UnexpectedString { key: String, value: String },

    #[error("unexpected integer: {key} {value}")]
    UnexpectedInteger { key: String, value: i64 },

    #[error("unexpected {kind} for key {key}")]
    UnexpectedValue { key: String, kind: &'static str },

    #[error("top-level value must be an object, found {kind}")]
    NotAnObject { kind: &'static str },

    #[error("client {name} appeared inside another client record")]
    NestedClient { name: String },
}

impl DecodeError {
    /// True for failures caused by malformed bytes rather than by the schema.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            DecodeError::Syntax { .. } | DecodeError::IntegerOverflow { .. } | DecodeError::Incomplete
        )
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
