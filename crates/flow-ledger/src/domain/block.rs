//! Block entity and its canonical fingerprint encoding
//!
//! A block's fingerprint is the SHA-256 hex digest of a compact JSON object
//! holding every field except the fingerprint itself, keys in sorted order:
//!
//! ```text
//! {"index":1,"nonce":42,"payload":"10.0.0.1 -> 10.0.0.2","previous_fingerprint":"00a3..","timestamp":1700000000000}
//! ```
//!
//! `nonce` is left out entirely while unset (the genesis block is never
//! mined). The encoding is the auditable representation of a block and must
//! not change between releases.

use crate::utils::hashing::{leading_zero_digits, meets_difficulty, sha256_hex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload carried by the genesis block
pub const GENESIS_PAYLOAD: &str = "";

/// Previous-fingerprint sentinel carried by the genesis block
pub const GENESIS_PREVIOUS_FINGERPRINT: &str = "0";

/// Hex digest committing a block's contents
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a hex digest
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Sentinel the genesis block links to
    pub fn genesis_parent() -> Self {
        Self(GENESIS_PREVIOUS_FINGERPRINT.to_string())
    }

    /// Digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of leading `'0'` hex digits
    pub fn leading_zeros(&self) -> usize {
        leading_zero_digits(&self.0)
    }

    /// Check the difficulty predicate
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.0, difficulty)
    }

    /// First 12 characters, for log lines
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(digest: String) -> Self {
        Self(digest)
    }
}

impl From<&str> for Fingerprint {
    fn from(digest: &str) -> Self {
        Self(digest.to_string())
    }
}

/// Pre-rendered canonical encoding of a block, split around the nonce
///
/// `nonce` sorts between `index` and `payload`, so everything except the nonce
/// can be rendered once and reused across mining attempts.
#[derive(Clone, Debug)]
pub struct CanonicalEncoding {
    head: String,
    tail: String,
}

impl CanonicalEncoding {
    fn of(block: &Block) -> Self {
        let head = format!("{{\"index\":{},", block.index);
        let tail = format!(
            "\"payload\":{},\"previous_fingerprint\":{},\"timestamp\":{}}}",
            json_string(&block.payload),
            json_string(block.previous_fingerprint.as_str()),
            block.timestamp
        );
        Self { head, tail }
    }

    /// Render the full encoding for a given nonce
    pub fn render(&self, nonce: Option<u64>) -> String {
        match nonce {
            Some(nonce) => format!("{}\"nonce\":{},{}", self.head, nonce, self.tail),
            None => format!("{}{}", self.head, self.tail),
        }
    }

    /// Fingerprint of the encoding for a given nonce
    pub fn fingerprint(&self, nonce: Option<u64>) -> Fingerprint {
        Fingerprint(sha256_hex(self.render(nonce).as_bytes()))
    }
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// A ledger record authorizing one flow
///
/// Fields are only reachable through accessors. Mining may change the nonce of
/// a candidate; the fingerprint is assigned once by the ledger on commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    payload: String,
    /// Unix epoch milliseconds
    timestamp: u64,
    previous_fingerprint: Fingerprint,
    nonce: Option<u64>,
    fingerprint: Option<Fingerprint>,
}

impl Block {
    /// Create an unmined, uncommitted block. No validation happens here.
    pub fn new(
        index: u64,
        payload: impl Into<String>,
        timestamp: u64,
        previous_fingerprint: Fingerprint,
    ) -> Self {
        Self {
            index,
            payload: payload.into(),
            timestamp,
            previous_fingerprint,
            nonce: None,
            fingerprint: None,
        }
    }

    /// Genesis block: index 0, empty payload, sentinel parent
    pub(crate) fn genesis(timestamp: u64) -> Self {
        let mut block = Self::new(
            0,
            GENESIS_PAYLOAD,
            timestamp,
            Fingerprint::genesis_parent(),
        );
        let fingerprint = block.compute_fingerprint();
        block.fingerprint = Some(fingerprint);
        block
    }

    /// Sequence number
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Flow descriptor recorded by this block
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Creation time in Unix epoch milliseconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Fingerprint of the tail this block was built on
    pub fn previous_fingerprint(&self) -> &Fingerprint {
        &self.previous_fingerprint
    }

    /// Nonce found by mining, if any
    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    /// Committed fingerprint; `None` until the ledger accepts the block
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Whether the ledger has accepted this block
    pub fn is_committed(&self) -> bool {
        self.fingerprint.is_some()
    }

    /// Set the nonce of a candidate
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = Some(nonce);
    }

    /// Canonical encoding with the nonce left open
    pub fn canonical_encoding(&self) -> CanonicalEncoding {
        CanonicalEncoding::of(self)
    }

    /// Canonical encoding with the current nonce
    pub fn canonical_string(&self) -> String {
        self.canonical_encoding().render(self.nonce)
    }

    /// Digest over every field except the fingerprint
    pub fn compute_fingerprint(&self) -> Fingerprint {
        self.canonical_encoding().fingerprint(self.nonce)
    }

    pub(crate) fn commit(&mut self, fingerprint: Fingerprint) {
        self.fingerprint = Some(fingerprint);
    }
}
