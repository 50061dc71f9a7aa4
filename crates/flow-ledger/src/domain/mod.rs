//! Domain layer - pure ledger logic
//!
//! No I/O, no async, no locking. Everything here operates on owned values
//! and is driven by the service layer.
//!
//! ## Entities
//!
//! - [`Block`]: one committed flow authorization
//! - [`Ledger`]: the hash-linked chain of blocks
//! - [`FlowDescriptor`]: the (source, destination) pair a block records
//!
//! ## Services
//!
//! - [`ProofEngine`]: nonce search and proof verification

pub mod block;
pub mod flow;
pub mod ledger;
pub mod proof;

pub use block::{Block, CanonicalEncoding, Fingerprint, GENESIS_PAYLOAD, GENESIS_PREVIOUS_FINGERPRINT};
pub use flow::{FlowDescriptor, FlowIntent, FLOW_SEPARATOR};
pub use ledger::{validate_difficulty, verify_blocks, Ledger, MAX_DIFFICULTY, MIN_DIFFICULTY};
pub use proof::{ProofEngine, Solution};
