//! Hexagonal ports

pub mod inbound;
pub mod outbound;

pub use inbound::FlowAuthorization;
pub use outbound::{now_millis, Clock, SystemClock};
