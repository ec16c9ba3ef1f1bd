//! Continuation token type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque continuation token handed out by the webhook.
///
/// The value is echoed back verbatim in the next poll, so it is kept as raw
/// JSON rather than assuming a particular encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(pub serde_json::Value);

impl PollId {
    /// Create a poll id from any JSON value
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<&str> for PollId {
    fn from(s: &str) -> Self {
        Self(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for PollId {
    fn from(s: String) -> Self {
        Self(serde_json::Value::String(s))
    }
}
