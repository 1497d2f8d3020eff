//! Error types for the 2D kernel.

use thiserror::Error;

use crate::context::Context;

/// Errors raised by 2D kernel operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Two operands live in different coordinate frames.
    #[error("context mismatch: expected {expected}, found {found}")]
    ContextMismatch {
        /// Frame of the left operand.
        expected: Context,
        /// Frame of the offending operand.
        found: Context,
    },

    /// Fill line spacing is not a positive finite number.
    #[error("invalid fill spacing: {0}")]
    InvalidSpacing(f64),

    /// The fill would need more scanlines than the kernel allows.
    #[error("fill needs {requested} scanlines, limit is {limit}")]
    TooManyScanlines {
        /// Lines the pattern asked for.
        requested: usize,
        /// Upper bound.
        limit: usize,
    },
}

/// Result type for 2D kernel operations.
pub type Result<T> = std::result::Result<T, GeomError>;
