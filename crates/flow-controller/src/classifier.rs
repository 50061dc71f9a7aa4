//! # Packet Classification
//!
//! Turns an observed IPv4/TCP packet into a flow descriptor and an intent.
//!
//! Only HTTP `GET` requests carry an intent. The request route is the text
//! between `GET ` and the space before `HTTP`:
//!
//! - a route containing the query marker (default `data`) is a [`FlowIntent::Query`]
//! - otherwise a route containing the admit marker (default `add`) is a [`FlowIntent::Admit`]
//! - anything else has no intent and is forwarded without touching the ledger

use std::net::IpAddr;
use std::str::FromStr;

use flow_ledger::{FlowDescriptor, FlowIntent};

use crate::error::ControllerError;

/// TCP traffic seen by the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservedPacket {
    /// IPv4/IPv6 source address
    pub source: IpAddr,
    /// IPv4/IPv6 destination address
    pub destination: IpAddr,
    /// TCP payload bytes
    pub payload: Vec<u8>,
}

impl ObservedPacket {
    /// Create a packet from addresses and a payload
    pub fn new(source: IpAddr, destination: IpAddr, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            source,
            destination,
            payload: payload.into(),
        }
    }

    /// Flow descriptor for this packet's address pair
    pub fn flow(&self) -> FlowDescriptor {
        FlowDescriptor::from_addrs(self.source, self.destination)
    }
}

/// Parses `<src> <dst> <payload...>`; the payload may contain spaces.
impl FromStr for ObservedPacket {
    type Err = ControllerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.trim().splitn(3, ' ');
        let mut addr = |name: &str| -> Result<IpAddr, ControllerError> {
            let raw = parts
                .next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ControllerError::MalformedPacket(format!("missing {name}")))?;
            raw.parse()
                .map_err(|_| ControllerError::MalformedPacket(format!("bad {name}: {raw}")))
        };
        let source = addr("source")?;
        let destination = addr("destination")?;
        let payload = parts.next().unwrap_or_default();
        Ok(Self::new(source, destination, payload.as_bytes()))
    }
}

/// A packet's flow and what it asks of the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Flow the packet belongs to
    pub flow: FlowDescriptor,
    /// Requested ledger action
    pub intent: FlowIntent,
}

/// Maps HTTP routes to flow intents
#[derive(Clone, Debug)]
pub struct PacketClassifier {
    query_marker: String,
    admit_marker: String,
}

impl Default for PacketClassifier {
    fn default() -> Self {
        Self::new(crate::DEFAULT_QUERY_MARKER, crate::DEFAULT_ADMIT_MARKER)
    }
}

impl PacketClassifier {
    /// Create a classifier with custom route markers
    pub fn new(query_marker: impl Into<String>, admit_marker: impl Into<String>) -> Self {
        Self {
            query_marker: query_marker.into(),
            admit_marker: admit_marker.into(),
        }
    }

    /// Classify a packet; `None` means forward without consulting the ledger
    pub fn classify(&self, packet: &ObservedPacket) -> Option<Classification> {
        let text = std::str::from_utf8(&packet.payload).ok()?;
        let route = http_get_route(text)?;

        let intent = if route.contains(&self.query_marker) {
            FlowIntent::Query
        } else if route.contains(&self.admit_marker) {
            FlowIntent::Admit
        } else {
            return None;
        };

        Some(Classification {
            flow: packet.flow(),
            intent,
        })
    }
}

/// Route of an HTTP `GET` request, if the payload starts with one
pub fn http_get_route(payload: &str) -> Option<&str> {
    let rest = payload.strip_prefix("GET ")?;
    let line = rest.lines().next().unwrap_or_default();
    let route = match line.find("HTTP") {
        Some(end) => &line[..end],
        None => line,
    };
    Some(route.trim_end())
}
