//! Protocol errors.
//!
//! Parse failures carry the offending line, so the log shows it as received.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("expected exactly one ':' delimiter: {line:?}")]
    MissingDelimiter { line: String },

    #[error("unknown direction {direction:?} in {line:?}")]
    UnknownDirection { direction: String, line: String },

    #[error("magnitude is not an integer: {line:?}")]
    InvalidMagnitude { line: String },

    #[error("magnitude must be greater than zero: {line:?}")]
    ZeroMagnitude { line: String },

    #[error("line is not valid UTF-8: {line:?}")]
    InvalidUtf8 { line: String },

    #[error("line exceeds {limit} bytes (got {len})")]
    LineTooLong { len: usize, limit: usize },
}
