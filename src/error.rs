//! Error types.
//!
//! Every fallible operation in this crate reports an invalid-input
//! condition through [`StatsError`]. Numeric edge cases that have a
//! concrete answer (far-tail CDF values, for instance) are returned as
//! ordinary numbers instead.

use thiserror::Error;

/// Invalid-input conditions raised by statistical operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// A parameter lies outside the domain of the operation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Fewer observations than the statistic needs.
    #[error("insufficient data: need at least {needed} values, found {found}")]
    InsufficientData { needed: u64, found: u64 },

    /// Scale normalisation is undefined because the spread is zero.
    #[error("operation undefined when the standard deviation is zero")]
    ZeroVariance,
}

impl StatsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        StatsError::InvalidParameters(msg.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StatsError>;
