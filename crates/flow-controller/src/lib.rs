//! # Flow Controller
//!
//! Controller runtime sitting in front of the flow ledger.
//!
//! ## Decision Path
//!
//! ```text
//! ObservedPacket ──→ PacketClassifier ──→ Classification { flow, intent }
//!                          │                        │
//!                    (no intent)                    ↓
//!                          │                    FlowGate
//!                          │              (inline or MiningWorker)
//!                          ↓                        │
//!                       FORWARD          true → FORWARD, false → DROP
//! ```
//!
//! ## Modules
//!
//! - `classifier/` - HTTP route to intent mapping
//! - `gate/` - where decisions run (caller task or blocking pool)
//! - `handler/` - per-packet verdicts
//! - `config/` - environment-driven configuration

pub mod classifier;
pub mod config;
pub mod error;
pub mod gate;
pub mod handler;

use std::sync::Arc;

use flow_ledger::FlowAuthorizationService;

pub use classifier::{Classification, ObservedPacket, PacketClassifier};
pub use config::ControllerConfig;
pub use error::ControllerError;
pub use gate::{FlowGate, InlineGate, MiningWorker};
pub use handler::{PacketHandler, Verdict};

/// Route substring that marks a query
pub const DEFAULT_QUERY_MARKER: &str = "data";

/// Route substring that marks an admission
pub const DEFAULT_ADMIT_MARKER: &str = "add";

/// Service plus packet handler wired from one configuration
pub struct Controller {
    /// Ledger owner
    pub service: Arc<FlowAuthorizationService>,
    /// Per-packet decision path
    pub handler: PacketHandler,
}

impl Controller {
    /// Build the service, gate and handler described by `config`
    pub fn new(config: &ControllerConfig) -> Result<Self, ControllerError> {
        let service = Arc::new(FlowAuthorizationService::from_config(&config.ledger)?);
        let gate: Arc<dyn FlowGate> = if config.offload_mining {
            Arc::new(MiningWorker::new(Arc::clone(&service)))
        } else {
            Arc::new(InlineGate::new(service.clone()))
        };
        let classifier = PacketClassifier::new(&config.query_marker, &config.admit_marker);

        Ok(Self {
            service,
            handler: PacketHandler::new(classifier, gate),
        })
    }
}
