//! Flow authorization service
//!
//! Owns the ledger behind a single `RwLock`. Queries take the read side and
//! scan a consistent snapshot. Admissions read the tail, mine with no lock
//! held, then take the write side for the tail check and push, so two
//! candidates built on the same tail can never both be appended.

use crate::{
    config::LedgerConfig,
    domain::{Block, Fingerprint, FlowDescriptor, Ledger, ProofEngine},
    error::Result,
    metrics::Metrics,
    ports::{Clock, FlowAuthorization, SystemClock},
    utils::expected_attempts,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Gates flows against the ledger and records new admissions
pub struct FlowAuthorizationService {
    /// The only ledger this service writes to
    ledger: RwLock<Ledger>,

    /// Nonce search
    engine: ProofEngine,

    /// Timestamp source for new blocks
    clock: Arc<dyn Clock>,

    /// Per-admission mining deadline
    mining_timeout: Option<Duration>,

    /// Query and admission counters
    metrics: Metrics,
}

impl FlowAuthorizationService {
    /// Take ownership of an existing ledger
    pub fn new(ledger: Ledger) -> Self {
        info!(
            difficulty = ledger.difficulty(),
            expected_hashes_per_admission = expected_attempts(ledger.difficulty()),
            blocks = ledger.len(),
            "Initializing flow authorization service"
        );
        Self {
            ledger: RwLock::new(ledger),
            engine: ProofEngine::new(),
            clock: Arc::new(SystemClock),
            mining_timeout: None,
            metrics: Metrics::new(),
        }
    }

    /// Build a fresh ledger from configuration
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        let ledger = Ledger::new(config.difficulty)?;
        Ok(Self::new(ledger).with_mining_timeout(config.mining_timeout()))
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Bound each admission's nonce search
    pub fn with_mining_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.mining_timeout = timeout;
        self
    }

    /// Whether `flow` was recorded by an earlier admission
    pub fn is_flow_authorized(&self, flow: &FlowDescriptor) -> bool {
        let payload = flow.to_payload();
        let hit = self.ledger.read().contains_payload(&payload);
        self.metrics.record_query(hit);
        debug!(flow = %payload, authorized = hit, "Flow query");
        hit
    }

    /// Mine and append a block for `flow`
    ///
    /// Returns false when mining times out, the tail moved while mining, or
    /// the proof fails verification. The chain is unchanged in every case.
    pub fn authorize_flow(&self, flow: &FlowDescriptor) -> bool {
        match self.try_authorize_flow(flow) {
            Ok(block) => {
                info!(
                    flow = %flow,
                    index = block.index(),
                    nonce = block.nonce(),
                    "Added acceptable flow"
                );
                true
            }
            Err(err) if err.is_critical() => {
                error!(flow = %flow, %err, "Admission failed verification");
                false
            }
            Err(err) => {
                warn!(flow = %flow, %err, "Admission rejected");
                false
            }
        }
    }

    /// Mine and append a block for `flow`, returning the committed block
    #[tracing::instrument(skip_all, fields(flow = %flow))]
    pub fn try_authorize_flow(&self, flow: &FlowDescriptor) -> Result<Block> {
        let mut candidate = self.prepare_candidate(flow);
        let difficulty = self.difficulty();
        let deadline = self.mining_timeout.map(|timeout| Instant::now() + timeout);

        let solution = match self.engine.solve(&mut candidate, difficulty, deadline) {
            Ok(solution) => solution,
            Err(err) => {
                self.metrics.record_admission(false);
                return Err(err);
            }
        };
        self.metrics
            .record_mining(solution.attempts, solution.elapsed.as_millis() as u64);

        let result = self.commit(candidate, solution.fingerprint);
        self.metrics.record_admission(result.is_ok());
        result
    }

    /// Unmined candidate for `flow` linked to the current tail
    pub fn prepare_candidate(&self, flow: &FlowDescriptor) -> Block {
        let timestamp = self.clock.now_millis();
        self.ledger.read().next_candidate(flow.to_payload(), timestamp)
    }

    /// Append a mined candidate under the write lock
    pub fn commit(&self, candidate: Block, fingerprint: Fingerprint) -> Result<Block> {
        let mut ledger = self.ledger.write();
        ledger.try_append(candidate, fingerprint).cloned()
    }

    /// Required leading zero hex digits
    pub fn difficulty(&self) -> u32 {
        self.ledger.read().difficulty()
    }

    /// Number of committed blocks, genesis included
    pub fn chain_len(&self) -> usize {
        self.ledger.read().len()
    }

    /// Copy of the most recent block
    pub fn tail(&self) -> Block {
        self.ledger.read().tail().clone()
    }

    /// Copy of the whole chain
    pub fn chain_snapshot(&self) -> Vec<Block> {
        self.ledger.read().blocks().to_vec()
    }

    /// Recompute every fingerprint and link
    pub fn audit(&self) -> Result<()> {
        let ledger = self.ledger.read();
        ledger.verify_chain().inspect_err(|err| {
            error!(%err, "Ledger audit failed");
        })
    }

    /// Query and admission counters
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl FlowAuthorization for FlowAuthorizationService {
    fn is_flow_authorized(&self, flow: &FlowDescriptor) -> bool {
        FlowAuthorizationService::is_flow_authorized(self, flow)
    }

    fn authorize_flow(&self, flow: &FlowDescriptor) -> bool {
        FlowAuthorizationService::authorize_flow(self, flow)
    }
}

impl From<Ledger> for FlowAuthorizationService {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
