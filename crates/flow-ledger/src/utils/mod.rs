//! Utility modules for the flow ledger

pub mod hashing;

pub use hashing::*;
