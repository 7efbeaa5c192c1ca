//! Error types for the risk engine

use thiserror::Error;

/// Risk engine error
#[derive(Debug, Error)]
pub enum Error {
    /// A transaction's timestamp could not be parsed as ISO-8601.
    #[error("bad timestamp on transaction {transaction_id}: {reason}")]
    BadTimestamp {
        /// Offending transaction
        transaction_id: String,
        /// Parse failure detail
        reason: String,
    },

    /// Training was attempted with too little labeled data, or a missing label column.
    #[error("insufficient data for training: {0}")]
    InsufficientData(String),

    /// A `RiskConfig` failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
