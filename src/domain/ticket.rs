use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NO_SUBJECT: &str = "(no subject)";
pub const UNKNOWN_REQUESTER: &str = "(unknown)";

/// Canonical string form of an upstream ticket identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Canonical form of a JSON identifier: strings are trimmed, numbers are
    /// rendered in decimal. Anything else has no identity.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.trim().is_empty() => Some(Self::new(text.trim())),
            Value::Number(number) => Some(Self::new(number.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub subject: String,
    pub requester: String,
}

impl Ticket {
    pub fn new(
        id: TicketId,
        subject: Option<String>,
        requester: Option<String>,
    ) -> Self {
        let subject = subject
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| NO_SUBJECT.to_string());
        let requester = requester
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| UNKNOWN_REQUESTER.to_string());
        Self {
            id,
            subject,
            requester,
        }
    }

    /// Deep link to the ticket's web view on the helpdesk.
    pub fn web_link(&self, web_base: &str) -> String {
        format!(
            "{}/WorkOrder.do?woMode=viewWO&woID={}",
            web_base.trim_end_matches('/'),
            self.id
        )
    }
}
