//! Execution context for authorization decisions
//!
//! [`InlineGate`] runs every decision on the caller's task, so an admission
//! stalls the packet path for the whole nonce search. [`MiningWorker`] moves
//! admissions onto tokio's blocking pool; queries stay inline because they
//! only take the ledger's read lock.

use std::sync::Arc;

use async_trait::async_trait;
use flow_ledger::{Block, FlowAuthorization, FlowAuthorizationService, FlowDescriptor, FlowIntent};
use tracing::{debug, error, warn};

use crate::error::ControllerError;

/// Port: asynchronous authorization decision
#[async_trait]
pub trait FlowGate: Send + Sync {
    /// Outcome of `intent` for `flow`; false means deny
    async fn decide(&self, intent: FlowIntent, flow: FlowDescriptor) -> bool;
}

/// Decides on the calling task
pub struct InlineGate {
    authorizer: Arc<dyn FlowAuthorization>,
}

impl InlineGate {
    /// Wrap any authorizer
    pub fn new(authorizer: Arc<dyn FlowAuthorization>) -> Self {
        Self { authorizer }
    }
}

#[async_trait]
impl FlowGate for InlineGate {
    async fn decide(&self, intent: FlowIntent, flow: FlowDescriptor) -> bool {
        self.authorizer.decide(intent, &flow)
    }
}

/// Runs admissions on the blocking pool
pub struct MiningWorker {
    service: Arc<FlowAuthorizationService>,
}

impl MiningWorker {
    /// Create a worker over a shared service
    pub fn new(service: Arc<FlowAuthorizationService>) -> Self {
        Self { service }
    }

    /// Mine and append `flow` off the async runtime
    pub async fn admit(&self, flow: FlowDescriptor) -> Result<Block, ControllerError> {
        let service = Arc::clone(&self.service);
        let block = tokio::task::spawn_blocking(move || service.try_authorize_flow(&flow))
            .await
            .map_err(|err| ControllerError::Worker(err.to_string()))??;
        Ok(block)
    }
}

#[async_trait]
impl FlowGate for MiningWorker {
    async fn decide(&self, intent: FlowIntent, flow: FlowDescriptor) -> bool {
        match intent {
            FlowIntent::Query => self.service.is_flow_authorized(&flow),
            FlowIntent::Admit => match self.admit(flow).await {
                Ok(block) => {
                    debug!(index = block.index(), "Worker appended block");
                    true
                }
                Err(ControllerError::Ledger(err)) if !err.is_critical() => {
                    warn!(%err, "Worker admission rejected");
                    false
                }
                Err(err) => {
                    error!(%err, "Mining worker failed");
                    false
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_ledger::{Ledger, LedgerError};
    use std::time::Duration;

    fn service(difficulty: u32) -> Arc<FlowAuthorizationService> {
        Arc::new(FlowAuthorizationService::new(
            Ledger::new(difficulty).unwrap(),
        ))
    }

    fn flow() -> FlowDescriptor {
        "10.0.0.1 -> 10.0.0.2".parse().unwrap()
    }

    #[tokio::test]
    async fn test_inline_gate_round_trip() {
        let service = service(1);
        let gate = InlineGate::new(service.clone());

        assert!(!gate.decide(FlowIntent::Query, flow()).await);
        assert!(gate.decide(FlowIntent::Admit, flow()).await);
        assert!(gate.decide(FlowIntent::Query, flow()).await);
        assert_eq!(service.chain_len(), 2);
    }

    #[tokio::test]
    async fn test_worker_round_trip() {
        let service = service(2);
        let worker = MiningWorker::new(service.clone());

        assert!(!worker.decide(FlowIntent::Query, flow()).await);
        assert!(worker.decide(FlowIntent::Admit, flow()).await);
        assert!(worker.decide(FlowIntent::Query, flow()).await);
        assert_eq!(service.chain_len(), 2);
        assert_eq!(service.tail().payload(), "10.0.0.1 -> 10.0.0.2");
    }

    #[tokio::test]
    async fn test_worker_admit_returns_block() {
        let service = service(1);
        let worker = MiningWorker::new(service.clone());

        let block = worker.admit(flow()).await.unwrap();
        assert_eq!(block.index(), 1);
        assert_eq!(block.payload(), "10.0.0.1 -> 10.0.0.2");
        assert_eq!(service.tail(), block);
    }

    #[tokio::test]
    async fn test_worker_surfaces_timeout() {
        let service = Arc::new(
            FlowAuthorizationService::new(Ledger::new(64).unwrap())
                .with_mining_timeout(Some(Duration::ZERO)),
        );
        let worker = MiningWorker::new(service.clone());

        let err = worker.admit(flow()).await.unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Ledger(LedgerError::MiningTimedOut { .. })
        ));
        assert!(!worker.decide(FlowIntent::Admit, flow()).await);
        assert_eq!(service.chain_len(), 1);
    }
}
