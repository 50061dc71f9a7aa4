//! Per-packet decision path

use std::fmt;
use std::sync::Arc;

use flow_ledger::FlowIntent;
use tracing::debug;

use crate::classifier::{ObservedPacket, PacketClassifier};
use crate::gate::FlowGate;

/// What to do with the packet that triggered a decision
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Pass the packet on
    Forward,
    /// Discard the packet
    Drop,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("FORWARD"),
            Self::Drop => f.write_str("DROP"),
        }
    }
}

/// Classifies packets and gates them on the ledger
pub struct PacketHandler {
    classifier: PacketClassifier,
    gate: Arc<dyn FlowGate>,
}

impl PacketHandler {
    /// Create a handler
    pub fn new(classifier: PacketClassifier, gate: Arc<dyn FlowGate>) -> Self {
        Self { classifier, gate }
    }

    /// Decide whether `packet` may continue
    pub async fn handle(&self, packet: &ObservedPacket) -> Verdict {
        let Some(classification) = self.classifier.classify(packet) else {
            return Verdict::Forward;
        };

        let flow = classification.flow;
        let intent = classification.intent;
        if self.gate.decide(intent, flow.clone()).await {
            return Verdict::Forward;
        }

        match intent {
            FlowIntent::Query => debug!(%flow, "Flow is not allowed"),
            FlowIntent::Admit => debug!(%flow, "Flow admission denied"),
        }
        Verdict::Drop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::InlineGate;
    use async_trait::async_trait;
    use flow_ledger::FlowDescriptor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Gate with a fixed answer that counts calls
    struct FixedGate {
        answer: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FlowGate for FixedGate {
        async fn decide(&self, _intent: FlowIntent, _flow: FlowDescriptor) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    fn packet(payload: &str) -> ObservedPacket {
        ObservedPacket::new(
            "10.0.0.1".parse().unwrap(),
            "10.0.0.2".parse().unwrap(),
            payload,
        )
    }

    #[tokio::test]
    async fn test_unclassified_traffic_bypasses_gate() {
        let gate = Arc::new(FixedGate {
            answer: false,
            calls: AtomicUsize::new(0),
        });
        let handler = PacketHandler::new(PacketClassifier::default(), gate.clone());

        assert_eq!(handler.handle(&packet("GET / HTTP/1.1")).await, Verdict::Forward);
        assert_eq!(handler.handle(&packet("\x16\x03\x01")).await, Verdict::Forward);
        assert_eq!(gate.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_denied_flow_is_dropped() {
        let gate = Arc::new(FixedGate {
            answer: false,
            calls: AtomicUsize::new(0),
        });
        let handler = PacketHandler::new(PacketClassifier::default(), gate.clone());

        assert_eq!(handler.handle(&packet("GET /data HTTP/1.1")).await, Verdict::Drop);
        assert_eq!(handler.handle(&packet("GET /add HTTP/1.1")).await, Verdict::Drop);
        assert_eq!(gate.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ledger_backed_sequence() {
        let service = Arc::new(flow_ledger::FlowAuthorizationService::new(
            flow_ledger::Ledger::new(1).unwrap(),
        ));
        let handler = PacketHandler::new(
            PacketClassifier::default(),
            Arc::new(InlineGate::new(service.clone())),
        );

        assert_eq!(handler.handle(&packet("GET /data HTTP/1.1")).await, Verdict::Drop);
        assert_eq!(handler.handle(&packet("GET /add HTTP/1.1")).await, Verdict::Forward);
        assert_eq!(handler.handle(&packet("GET /data HTTP/1.1")).await, Verdict::Forward);
        assert_eq!(service.chain_len(), 2);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Forward.to_string(), "FORWARD");
        assert_eq!(Verdict::Drop.to_string(), "DROP");
    }
}
