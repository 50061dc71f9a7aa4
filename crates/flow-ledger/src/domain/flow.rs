//! Flow descriptors and authorization intents

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Separator between source and destination in the canonical form
pub const FLOW_SEPARATOR: &str = " -> ";

/// An observed (source, destination) pair
///
/// The ledger stores the canonical string `"<source> -> <destination>"` and
/// matches it by exact equality, so two descriptors authorize each other only
/// if both addresses render identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlowDescriptor {
    source: String,
    destination: String,
}

impl FlowDescriptor {
    /// Create a descriptor, rejecting empty addresses or ones containing the separator
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let destination = destination.into();
        for (side, value) in [("source", &source), ("destination", &destination)] {
            if value.trim().is_empty() {
                return Err(LedgerError::InvalidFlowDescriptor(format!("empty {side}")));
            }
            if value.contains(FLOW_SEPARATOR) {
                return Err(LedgerError::InvalidFlowDescriptor(format!(
                    "{side} contains separator: {value:?}"
                )));
            }
        }
        Ok(Self {
            source,
            destination,
        })
    }

    /// Descriptor for an IP-level flow
    pub fn from_addrs(source: IpAddr, destination: IpAddr) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    /// Source address
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Destination address
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Canonical ledger payload
    pub fn to_payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FlowDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.source, FLOW_SEPARATOR, self.destination)
    }
}

impl FromStr for FlowDescriptor {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let (source, destination) = s.split_once(FLOW_SEPARATOR).ok_or_else(|| {
            LedgerError::InvalidFlowDescriptor(format!("missing separator in {s:?}"))
        })?;
        Self::new(source, destination)
    }
}

impl TryFrom<String> for FlowDescriptor {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FlowDescriptor> for String {
    fn from(flow: FlowDescriptor) -> Self {
        flow.to_payload()
    }
}

/// What the caller wants to do with a flow
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowIntent {
    /// Read-only check that the flow was admitted earlier
    Query,
    /// Mine and record the flow
    Admit,
}

impl fmt::Display for FlowIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Admit => f.write_str("admit"),
        }
    }
}
