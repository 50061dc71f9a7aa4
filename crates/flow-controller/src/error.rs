//! Error types for the controller runtime

use thiserror::Error;

/// Controller errors
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Environment variable held an unusable value
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// Observed packet line could not be parsed
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// Ledger-level failure
    #[error(transparent)]
    Ledger(#[from] flow_ledger::LedgerError),

    /// Mining worker task panicked or was cancelled
    #[error("Mining worker failed: {0}")]
    Worker(String),
}
