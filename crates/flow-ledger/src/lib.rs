//! # Flow Ledger
//!
//! A single-writer proof-of-work ledger used as an authorization oracle for
//! network flows. A flow is "data-accessible" only once a block recording it
//! has been mined and appended; admitting a flow costs `16^difficulty` hash
//! evaluations on average.
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Service                                            │
//! │  - FlowAuthorizationService: RwLock<Ledger>         │
//! │    query = read lock, append = write lock           │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports                                              │
//! │  - Inbound: FlowAuthorization                       │
//! │  - Outbound: Clock                                  │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (pure)                                      │
//! │  - Block, Fingerprint, FlowDescriptor               │
//! │  - Ledger (append / contains_payload / audit)       │
//! │  - ProofEngine (mine / verify)                      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Chain Invariants
//!
//! 1. **Genesis**: `chain[0]` has index 0 and the sentinel parent `"0"`
//! 2. **Linkage**: every block references its predecessor's fingerprint
//! 3. **Proof**: every non-genesis fingerprint meets the difficulty and
//!    equals the recomputed digest
//! 4. **Indexing**: `chain[i].index == i`
//!
//! ## Usage Example
//!
//! ```rust
//! use flow_ledger::{FlowAuthorizationService, FlowDescriptor, Ledger};
//!
//! let service = FlowAuthorizationService::new(Ledger::new(2).unwrap());
//! let flow: FlowDescriptor = "10.0.0.1 -> 10.0.0.2".parse().unwrap();
//!
//! assert!(!service.is_flow_authorized(&flow));
//! assert!(service.authorize_flow(&flow));
//! assert!(service.is_flow_authorized(&flow));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Domain models and ledger logic
pub mod domain;
/// Hexagonal ports
pub mod ports;
/// Authorization service
pub mod service;
/// Hashing helpers
pub mod utils;

mod config;
mod error;
mod metrics;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use metrics::Metrics;

pub use domain::{
    verify_blocks, Block, Fingerprint, FlowDescriptor, FlowIntent, Ledger, ProofEngine, Solution,
};

pub use ports::{Clock, FlowAuthorization, SystemClock};

pub use service::FlowAuthorizationService;

/// Difficulty used when none is configured
pub const DEFAULT_DIFFICULTY: u32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_difficulty_in_range() {
        assert!(domain::validate_difficulty(DEFAULT_DIFFICULTY).is_ok());
    }
}
