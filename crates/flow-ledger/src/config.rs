//! Configuration types for the flow ledger

use crate::domain::validate_difficulty;
use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;

/// Runtime configuration for the ledger and its miner
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero hex digits a fingerprint must have (1..=64)
    pub difficulty: u32,

    /// Give up mining after this many milliseconds (None = search until found)
    pub mining_timeout_ms: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: crate::DEFAULT_DIFFICULTY,
            mining_timeout_ms: None,
        }
    }
}

impl LedgerConfig {
    /// Config with the given difficulty and no mining deadline
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Check ranges
    pub fn validate(&self) -> Result<()> {
        validate_difficulty(self.difficulty)
    }

    /// Mining deadline as a duration
    pub fn mining_timeout(&self) -> Option<Duration> {
        self.mining_timeout_ms.map(Duration::from_millis)
    }
}
