//! Proof-of-work search and verification
//!
//! The nonce search is sequential, starting at 0 and increasing by one, so a
//! given candidate always yields the same nonce. Expected work is
//! `16^difficulty` hash evaluations.

use super::block::{Block, Fingerprint};
use crate::error::{LedgerError, Result};
use std::time::{Duration, Instant};

/// How often the deadline is polled during a bounded search
const DEADLINE_CHECK_INTERVAL: u64 = 4096;

/// Result of a successful nonce search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Winning digest
    pub fingerprint: Fingerprint,
    /// Nonce that produced it
    pub nonce: u64,
    /// Hash evaluations performed
    pub attempts: u64,
    /// Wall time spent searching
    pub elapsed: Duration,
}

/// Mines and verifies proof-of-work for blocks
#[derive(Copy, Clone, Debug, Default)]
pub struct ProofEngine;

impl ProofEngine {
    /// Create a new proof engine
    pub fn new() -> Self {
        Self
    }

    /// Search for a nonce whose fingerprint has `difficulty` leading zeros
    ///
    /// Leaves the winning nonce on `candidate` and returns the digest.
    pub fn mine(&self, candidate: &mut Block, difficulty: u32) -> Result<Fingerprint> {
        self.solve(candidate, difficulty, None)
            .map(|solution| solution.fingerprint)
    }

    /// Nonce search with an optional deadline
    ///
    /// On timeout the candidate keeps the last nonce tried and
    /// [`LedgerError::MiningTimedOut`] is returned.
    #[tracing::instrument(skip(self, candidate), fields(index = candidate.index()))]
    pub fn solve(
        &self,
        candidate: &mut Block,
        difficulty: u32,
        deadline: Option<Instant>,
    ) -> Result<Solution> {
        let started = Instant::now();
        let encoding = candidate.canonical_encoding();
        let mut attempts = 0u64;

        for nonce in 0..=u64::MAX {
            attempts += 1;
            let fingerprint = encoding.fingerprint(Some(nonce));
            if fingerprint.meets_difficulty(difficulty) {
                candidate.set_nonce(nonce);
                let elapsed = started.elapsed();
                tracing::debug!(
                    nonce,
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    fingerprint = fingerprint.short(),
                    "Nonce found"
                );
                return Ok(Solution {
                    fingerprint,
                    nonce,
                    attempts,
                    elapsed,
                });
            }

            if let Some(deadline) = deadline {
                if attempts % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                    candidate.set_nonce(nonce);
                    tracing::warn!(attempts, "Mining deadline reached");
                    return Err(LedgerError::MiningTimedOut {
                        index: candidate.index(),
                        attempts,
                    });
                }
            }
        }

        Err(LedgerError::NonceSpaceExhausted {
            index: candidate.index(),
        })
    }

    /// Check a claimed fingerprint against the block's current nonce
    pub fn verify(&self, block: &Block, claimed: &Fingerprint, difficulty: u32) -> bool {
        self.check(block, claimed, difficulty).is_ok()
    }

    /// Like [`verify`](Self::verify) but reports which check failed
    pub fn check(&self, block: &Block, claimed: &Fingerprint, difficulty: u32) -> Result<()> {
        if !claimed.meets_difficulty(difficulty) {
            return Err(LedgerError::InvalidProof {
                index: block.index(),
                reason: format!(
                    "{} leading zeros, difficulty requires {}",
                    claimed.leading_zeros(),
                    difficulty
                ),
            });
        }
        if *claimed != block.compute_fingerprint() {
            return Err(LedgerError::InvalidProof {
                index: block.index(),
                reason: "claimed fingerprint does not match recomputed digest".to_string(),
            });
        }
        Ok(())
    }
}
