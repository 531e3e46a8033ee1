//! Error kinds raised by the board subsystem.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("invalid square {0:?}")]
    InvalidSquare(String),

    #[error("invalid move {text:?}: {reason}")]
    InvalidMove { text: String, reason: &'static str },

    #[error("invalid FEN field {field:?}: {reason}")]
    InvalidFen { field: &'static str, reason: String },

    #[error("no legal move matches SAN {text:?} in this position")]
    InvalidSan { text: String },

    #[error("position invariant violated: {0}")]
    InvariantViolation(&'static str),

    #[error("invalid position signature {0:?}")]
    InvalidSignature(String),
}
