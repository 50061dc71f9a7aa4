//! # Controller Configuration
//!
//! Defaults can be overridden from the environment:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `FLOW_LEDGER_DIFFICULTY` | leading zero hex digits per admission (1..=64) |
//! | `FLOW_LEDGER_MINING_TIMEOUT_MS` | mining deadline, `0` disables it |
//! | `FLOW_CONTROLLER_OFFLOAD_MINING` | `true` runs mining on the blocking pool |
//! | `FLOW_CONTROLLER_QUERY_MARKER` | route substring marking a query |
//! | `FLOW_CONTROLLER_ADMIT_MARKER` | route substring marking an admission |

use flow_ledger::LedgerConfig;
use tracing::info;

use crate::error::ControllerError;

/// Complete controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Ledger and mining settings
    pub ledger: LedgerConfig,
    /// Run admissions on the blocking pool instead of the caller's task
    pub offload_mining: bool,
    /// Route substring that marks a query
    pub query_marker: String,
    /// Route substring that marks an admission
    pub admit_marker: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            offload_mining: true,
            query_marker: crate::DEFAULT_QUERY_MARKER.to_string(),
            admit_marker: crate::DEFAULT_ADMIT_MARKER.to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load from process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let mut config = Self::default();

        if let Some(value) = lookup("FLOW_LEDGER_DIFFICULTY") {
            config.ledger.difficulty = parse_var("FLOW_LEDGER_DIFFICULTY", value)?;
        }
        if let Some(value) = lookup("FLOW_LEDGER_MINING_TIMEOUT_MS") {
            let ms: u64 = parse_var("FLOW_LEDGER_MINING_TIMEOUT_MS", value)?;
            config.ledger.mining_timeout_ms = (ms > 0).then_some(ms);
        }
        if let Some(value) = lookup("FLOW_CONTROLLER_OFFLOAD_MINING") {
            config.offload_mining = parse_var("FLOW_CONTROLLER_OFFLOAD_MINING", value)?;
        }
        if let Some(value) = lookup("FLOW_CONTROLLER_QUERY_MARKER") {
            config.query_marker = non_empty("FLOW_CONTROLLER_QUERY_MARKER", value)?;
        }
        if let Some(value) = lookup("FLOW_CONTROLLER_ADMIT_MARKER") {
            config.admit_marker = non_empty("FLOW_CONTROLLER_ADMIT_MARKER", value)?;
        }

        config.ledger.validate()?;
        info!(
            difficulty = config.ledger.difficulty,
            mining_timeout_ms = config.ledger.mining_timeout_ms,
            offload_mining = config.offload_mining,
            "Loaded controller configuration"
        );
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ControllerError> {
    value
        .trim()
        .parse()
        .map_err(|_| ControllerError::InvalidEnv { var, value })
}

fn non_empty(var: &'static str, value: String) -> Result<String, ControllerError> {
    if value.is_empty() {
        return Err(ControllerError::InvalidEnv { var, value });
    }
    Ok(value)
}
