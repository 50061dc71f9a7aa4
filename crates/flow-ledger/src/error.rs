//! Error types for the flow ledger

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while mining, appending or auditing blocks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Difficulty outside the accepted range
    #[error("Invalid difficulty {difficulty}: must be between {min} and {max}")]
    InvalidDifficulty {
        /// Requested difficulty
        difficulty: u32,
        /// Smallest accepted value
        min: u32,
        /// Largest accepted value
        max: u32,
    },

    /// Candidate was built against a tail that is no longer current
    #[error("Stale parent: candidate links to {actual}, tail is {expected}")]
    StaleParent {
        /// Fingerprint of the current tail
        expected: String,
        /// Fingerprint the candidate references
        actual: String,
    },

    /// Claimed fingerprint failed the difficulty check or re-hashing
    #[error("Invalid proof for block {index}: {reason}")]
    InvalidProof {
        /// Index of the rejected candidate
        index: u64,
        /// Which check failed
        reason: String,
    },

    /// First block is not a well-formed genesis block
    #[error("Genesis block is malformed")]
    GenesisMismatch,

    /// Block does not reference its predecessor's fingerprint
    #[error("Broken link at block {index}")]
    BrokenLink {
        /// Index of the block with the bad back-reference
        index: u64,
    },

    /// Block index does not match its position in the chain
    #[error("Block at position {position} carries index {index}")]
    IndexMismatch {
        /// Position in the chain
        position: usize,
        /// Index stored in the block
        index: u64,
    },

    /// Stored fingerprint does not match the recomputed digest
    #[error("Fingerprint mismatch at block {index}")]
    FingerprintMismatch {
        /// Index of the tampered block
        index: u64,
    },

    /// Committed block has no fingerprint
    #[error("Block {index} was never committed")]
    MissingFingerprint {
        /// Index of the block
        index: u64,
    },

    /// Nonce search hit its deadline
    #[error("Mining block {index} timed out after {attempts} attempts")]
    MiningTimedOut {
        /// Index of the candidate
        index: u64,
        /// Hash evaluations performed
        attempts: u64,
    },

    /// Every nonce was tried without meeting the difficulty
    #[error("Nonce space exhausted for block {index}")]
    NonceSpaceExhausted {
        /// Index of the candidate
        index: u64,
    },

    /// Flow descriptor could not be parsed
    #[error("Invalid flow descriptor: {0}")]
    InvalidFlowDescriptor(String),
}

impl LedgerError {
    /// Check if the caller may rebuild the candidate and try again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StaleParent { .. } | Self::MiningTimedOut { .. })
    }

    /// Check if the error points at an implementation bug or tampering
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::InvalidProof { .. }
                | Self::GenesisMismatch
                | Self::BrokenLink { .. }
                | Self::IndexMismatch { .. }
                | Self::FingerprintMismatch { .. }
                | Self::MissingFingerprint { .. }
        )
    }
}
