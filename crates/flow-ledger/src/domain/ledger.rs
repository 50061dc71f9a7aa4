//! Append-only hash-linked ledger
//!
//! ## Invariants
//!
//! 1. `chain[0]` is the genesis block (index 0, sentinel parent)
//! 2. `chain[i].previous_fingerprint == chain[i - 1].fingerprint`
//! 3. every non-genesis fingerprint meets the difficulty and re-hashes exactly
//! 4. `chain[i].index == i`
//!
//! [`Ledger::try_append`] is the only way to grow the chain and checks all of
//! the above for the incoming block before it is pushed.

use super::block::{Block, Fingerprint, GENESIS_PAYLOAD};
use super::proof::ProofEngine;
use crate::error::{LedgerError, Result};
use tracing::{debug, error, info, warn};

/// Smallest accepted difficulty
pub const MIN_DIFFICULTY: u32 = 1;

/// Largest accepted difficulty (a SHA-256 hex digest has 64 digits)
pub const MAX_DIFFICULTY: u32 = 64;

/// Check a difficulty against the accepted range
pub fn validate_difficulty(difficulty: u32) -> Result<()> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(LedgerError::InvalidDifficulty {
            difficulty,
            min: MIN_DIFFICULTY,
            max: MAX_DIFFICULTY,
        });
    }
    Ok(())
}

/// Ordered sequence of committed blocks
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    tail_fingerprint: Fingerprint,
    difficulty: u32,
    engine: ProofEngine,
}

impl Ledger {
    /// Create a ledger whose genesis block is stamped with the current time
    pub fn new(difficulty: u32) -> Result<Self> {
        Self::with_genesis_timestamp(difficulty, crate::ports::now_millis())
    }

    /// Create a ledger with an explicit genesis timestamp
    pub fn with_genesis_timestamp(difficulty: u32, timestamp: u64) -> Result<Self> {
        validate_difficulty(difficulty)?;
        let genesis = Block::genesis(timestamp);
        let tail_fingerprint = genesis.compute_fingerprint();
        info!(
            difficulty,
            genesis = tail_fingerprint.short(),
            "Ledger initialized"
        );
        Ok(Self {
            chain: vec![genesis],
            tail_fingerprint,
            difficulty,
            engine: ProofEngine::new(),
        })
    }

    /// Required leading zero hex digits
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Most recently committed block
    pub fn tail(&self) -> &Block {
        // Genesis keeps the chain non-empty
        &self.chain[self.chain.len() - 1]
    }

    /// Fingerprint of the tail
    pub fn tail_fingerprint(&self) -> &Fingerprint {
        &self.tail_fingerprint
    }

    /// Number of committed blocks, genesis included
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false; genesis is committed at construction
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Committed blocks in order
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Block at `index`
    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.chain.get(i))
    }

    /// Build an unmined candidate linked to the current tail
    pub fn next_candidate(&self, payload: impl Into<String>, timestamp: u64) -> Block {
        let tail = self.tail();
        Block::new(
            tail.index() + 1,
            payload,
            timestamp,
            self.tail_fingerprint().clone(),
        )
    }

    /// Append a mined candidate, reporting acceptance as a boolean
    pub fn append(&mut self, candidate: Block, claimed: Fingerprint) -> bool {
        match self.try_append(candidate, claimed) {
            Ok(_) => true,
            Err(err @ (LedgerError::StaleParent { .. } | LedgerError::IndexMismatch { .. })) => {
                warn!(%err, "Structural rejection");
                false
            }
            Err(err) => {
                error!(%err, "Proof rejection: mined fingerprint failed verification");
                false
            }
        }
    }

    /// Append a mined candidate
    ///
    /// Rejects without touching the chain if the candidate does not extend
    /// the current tail or the claimed fingerprint does not verify.
    pub fn try_append(&mut self, mut candidate: Block, claimed: Fingerprint) -> Result<&Block> {
        if *candidate.previous_fingerprint() != self.tail_fingerprint {
            return Err(LedgerError::StaleParent {
                expected: self.tail_fingerprint.to_string(),
                actual: candidate.previous_fingerprint().to_string(),
            });
        }
        if candidate.index() != self.tail().index() + 1 {
            return Err(LedgerError::IndexMismatch {
                position: self.chain.len(),
                index: candidate.index(),
            });
        }
        self.engine.check(&candidate, &claimed, self.difficulty)?;

        debug!(
            index = candidate.index(),
            fingerprint = claimed.short(),
            "Block committed"
        );
        self.tail_fingerprint = claimed.clone();
        candidate.commit(claimed);
        self.chain.push(candidate);
        Ok(self.tail())
    }

    /// Whether any committed block carries exactly `target` as its payload
    pub fn contains_payload(&self, target: &str) -> bool {
        self.chain.iter().any(|block| block.payload() == target)
    }

    /// Recompute the whole chain and check every invariant
    ///
    /// Returns the first violation found, scanning from genesis.
    pub fn verify_chain(&self) -> Result<()> {
        verify_blocks(&self.chain, self.difficulty)
    }
}

/// Audit an arbitrary block sequence against the ledger invariants
pub fn verify_blocks(blocks: &[Block], difficulty: u32) -> Result<()> {
    let engine = ProofEngine::new();
    let genesis = blocks.first().ok_or(LedgerError::GenesisMismatch)?;
    let genesis_fp = genesis
        .fingerprint()
        .ok_or(LedgerError::MissingFingerprint { index: 0 })?;
    if genesis.index() != 0
        || genesis.payload() != GENESIS_PAYLOAD
        || *genesis.previous_fingerprint() != Fingerprint::genesis_parent()
    {
        return Err(LedgerError::GenesisMismatch);
    }
    if *genesis_fp != genesis.compute_fingerprint() {
        return Err(LedgerError::FingerprintMismatch { index: 0 });
    }

    let mut previous = genesis_fp;
    for (position, block) in blocks.iter().enumerate().skip(1) {
        if block.index() != position as u64 {
            return Err(LedgerError::IndexMismatch {
                position,
                index: block.index(),
            });
        }
        if block.previous_fingerprint() != previous {
            return Err(LedgerError::BrokenLink {
                index: block.index(),
            });
        }
        let fingerprint = block
            .fingerprint()
            .ok_or(LedgerError::MissingFingerprint {
                index: block.index(),
            })?;
        if *fingerprint != block.compute_fingerprint() {
            return Err(LedgerError::FingerprintMismatch {
                index: block.index(),
            });
        }
        engine.check(block, fingerprint, difficulty)?;
        previous = fingerprint;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFFICULTY: u32 = 1;

    fn ledger() -> Ledger {
        Ledger::with_genesis_timestamp(DIFFICULTY, 1_000).unwrap()
    }

    fn mine_next(ledger: &Ledger, payload: &str) -> (Block, Fingerprint) {
        let mut candidate = ledger.next_candidate(payload, 2_000);
        let fingerprint = ProofEngine::new().mine(&mut candidate, DIFFICULTY).unwrap();
        (candidate, fingerprint)
    }

    #[test]
    fn test_genesis_invariant() {
        let ledger = ledger();
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_empty());

        let genesis = ledger.tail();
        assert_eq!(genesis.index(), 0);
        assert_eq!(*genesis.previous_fingerprint(), Fingerprint::genesis_parent());
        assert_eq!(genesis.fingerprint(), Some(&genesis.compute_fingerprint()));
        assert!(ledger.verify_chain().is_ok());
    }

    #[test]
    fn test_rejects_invalid_difficulty() {
        assert!(matches!(
            Ledger::new(0),
            Err(LedgerError::InvalidDifficulty { difficulty: 0, .. })
        ));
        assert!(Ledger::new(65).is_err());
        assert!(validate_difficulty(64).is_ok());
    }

    #[test]
    fn test_append_valid_block() {
        let mut ledger = ledger();
        let (candidate, fingerprint) = mine_next(&ledger, "10.0.0.1 -> 10.0.0.2");

        assert!(ledger.append(candidate, fingerprint.clone()));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.tail().index(), 1);
        assert_eq!(ledger.tail().fingerprint(), Some(&fingerprint));
        assert_eq!(ledger.tail_fingerprint(), &fingerprint);
        assert!(ledger.verify_chain().is_ok());
    }

    #[test]
    fn test_append_rejects_stale_parent() {
        let mut ledger = ledger();
        let (first, first_fp) = mine_next(&ledger, "10.0.0.1 -> 10.0.0.2");
        let (stale, stale_fp) = mine_next(&ledger, "10.0.0.1 -> 10.0.0.3");

        assert!(ledger.append(first, first_fp));
        let err = ledger.try_append(stale, stale_fp).unwrap_err();
        assert!(matches!(err, LedgerError::StaleParent { .. }));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_append_rejects_wrong_index() {
        let mut ledger = ledger();
        let mut candidate = Block::new(
            5,
            "10.0.0.1 -> 10.0.0.2",
            2_000,
            ledger.tail_fingerprint().clone(),
        );
        let fingerprint = ProofEngine::new().mine(&mut candidate, DIFFICULTY).unwrap();

        let err = ledger.try_append(candidate, fingerprint).unwrap_err();
        assert!(matches!(err, LedgerError::IndexMismatch { position: 1, index: 5 }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_append_rejects_forged_proof() {
        let mut ledger = ledger();
        let (candidate, _) = mine_next(&ledger, "10.0.0.1 -> 10.0.0.2");

        // Right prefix, wrong digest
        let forged = Fingerprint::from(format!("0{}", "f".repeat(63)));
        assert!(!ledger.append(candidate, forged));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_contains_payload_exact_match() {
        let mut ledger = ledger();
        let (candidate, fingerprint) = mine_next(&ledger, "10.0.0.1 -> 10.0.0.3");
        assert!(ledger.append(candidate, fingerprint));

        assert!(ledger.contains_payload("10.0.0.1 -> 10.0.0.3"));
        assert!(!ledger.contains_payload("10.0.0.1 -> 10.0.0.2"));
        assert!(!ledger.contains_payload("10.0.0.1 -> 10.0.0.33"));
        assert!(!ledger.contains_payload("10.0.0.1"));
    }

    #[test]
    fn test_get_by_index() {
        let mut ledger = ledger();
        let (candidate, fingerprint) = mine_next(&ledger, "10.0.0.1 -> 10.0.0.2");
        assert!(ledger.append(candidate, fingerprint));

        assert_eq!(ledger.get(1).map(Block::payload), Some("10.0.0.1 -> 10.0.0.2"));
        assert!(ledger.get(2).is_none());
    }

    #[test]
    fn test_verify_blocks_detects_tampering() {
        let mut ledger = ledger();
        for dst in ["10.0.0.2", "10.0.0.3", "10.0.0.4"] {
            let (candidate, fingerprint) = mine_next(&ledger, &format!("10.0.0.1 -> {dst}"));
            assert!(ledger.append(candidate, fingerprint));
        }

        let mut blocks = ledger.blocks().to_vec();
        let tampered = blocks[2].nonce().unwrap() + 1;
        blocks[2].set_nonce(tampered);
        assert_eq!(
            verify_blocks(&blocks, DIFFICULTY),
            Err(LedgerError::FingerprintMismatch { index: 2 })
        );

        let mut reordered = ledger.blocks().to_vec();
        reordered.swap(1, 2);
        assert!(matches!(
            verify_blocks(&reordered, DIFFICULTY),
            Err(LedgerError::IndexMismatch { position: 1, .. })
        ));

        assert_eq!(verify_blocks(&[], DIFFICULTY), Err(LedgerError::GenesisMismatch));
    }
}
