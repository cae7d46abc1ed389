//! Lexical helpers for the XSD primitive kinds.

pub mod datetime;
pub mod duration;

use thiserror::Error;

pub use datetime::{format_datetime_rfc3339, parse_datetime_rfc3339};
pub use duration::{format_duration, parse_duration};

/// A string did not match the lexical form of an XSD primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LexicalError {
    pub message: String,
}

impl LexicalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
