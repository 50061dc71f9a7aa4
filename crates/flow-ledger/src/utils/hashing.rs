//! Hashing utilities for the flow ledger
//!
//! Fingerprints are lowercase hexadecimal SHA-256 digests. Difficulty is
//! counted in leading `'0'` hex characters, so each extra unit multiplies the
//! expected mining work by 16.

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute SHA-256 hash of data as a lowercase hex string
#[inline]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Count leading `'0'` characters of a hex digest
#[inline]
pub fn leading_zero_digits(digest: &str) -> usize {
    digest.bytes().take_while(|b| *b == b'0').count()
}

/// Check if a hex digest starts with at least `difficulty` zero digits
#[inline]
pub fn meets_difficulty(digest: &str, difficulty: u32) -> bool {
    leading_zero_digits(digest) >= difficulty as usize
}

/// Expected number of hash evaluations to satisfy `difficulty`
pub fn expected_attempts(difficulty: u32) -> f64 {
    16f64.powi(difficulty as i32)
}
