//! Inbound ports (driving side - API)

use crate::domain::{FlowDescriptor, FlowIntent};

/// Primary port: flow authorization
///
/// Called by the packet-classification side with a descriptor extracted from
/// traffic. A `false` outcome means the triggering packet must be dropped.
pub trait FlowAuthorization: Send + Sync {
    /// Whether the flow was recorded earlier. Never mutates the ledger.
    fn is_flow_authorized(&self, flow: &FlowDescriptor) -> bool;

    /// Mine and record the flow; true only if the block was appended
    fn authorize_flow(&self, flow: &FlowDescriptor) -> bool;

    /// Dispatch on intent
    fn decide(&self, intent: FlowIntent, flow: &FlowDescriptor) -> bool {
        match intent {
            FlowIntent::Query => self.is_flow_authorized(flow),
            FlowIntent::Admit => self.authorize_flow(flow),
        }
    }
}
