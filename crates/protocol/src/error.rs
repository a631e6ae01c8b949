//! Decode error type
//!
//! A malformed row surfaces as a value so readers can log and move on; no
//! decode failure ever aborts a file.

use thiserror::Error;

/// Row-level decode failure, carrying the offending field's text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A field failed to parse as its schema type
    #[error("parse {field} error: {value:?}")]
    Field {
        field: &'static str,
        value: String,
    },

    /// The terminal-end-word field must be exactly one byte
    #[error("parse TEW error: expected a single byte, got {value:?}")]
    TerminalEndWord { value: String },
}

impl DecodeError {
    pub(crate) fn field(field: &'static str, value: &str) -> Self {
        Self::Field {
            field,
            value: value.to_string(),
        }
    }
}
