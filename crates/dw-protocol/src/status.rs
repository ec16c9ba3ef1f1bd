//! Status document returned by the deploy webhook
//!
//! Both the deploy and the poll action answer with
//!
//! ```json
//! {"deploy": {"status": "building", "status_time": {"secs": 2, "nanos": 500000000}, "poll_id": "..."}}
//! ```
//!
//! `status_time` is the time elapsed since the status last changed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{PollId, ProtocolError};

/// Elapsed time as whole seconds plus a nanosecond remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusTime {
    pub secs: u64,
    pub nanos: u32,
}

impl StatusTime {
    /// Create a new status time
    pub fn new(secs: u64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    /// Seconds as a float, `secs + nanos * 1e-9`
    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + f64::from(self.nanos) * 1e-9
    }

    /// Convert to a `Duration`. Nanos past one second carry into `secs`.
    ///
    /// Fails when the carry overflows the seconds counter.
    pub fn as_duration(&self) -> Result<Duration, ProtocolError> {
        Duration::from_secs(self.secs)
            .checked_add(Duration::from_nanos(u64::from(self.nanos)))
            .ok_or(ProtocolError::Invalid("status_time"))
    }
}

impl From<Duration> for StatusTime {
    fn from(d: Duration) -> Self {
        Self {
            secs: d.as_secs(),
            nanos: d.subsec_nanos(),
        }
    }
}

/// Status of one deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    /// Free-form status string (see [`DeployStatus`] for the known values)
    pub status: String,
    /// Time since the status last changed
    pub status_time: StatusTime,
    /// Token for the next poll
    pub poll_id: PollId,
    /// Challenge name, when the webhook includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chall_name: Option<String>,
}

/// Top-level response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    pub deploy: DeploymentStatus,
}

impl StatusEnvelope {
    /// Fields every status document must carry, checked in this order
    const REQUIRED: [&'static str; 3] = ["status", "status_time", "poll_id"];

    /// Validate and decode a JSON status document.
    ///
    /// Reports the first missing field by name before attempting a full
    /// decode, so that a half-formed answer produces a useful error.
    pub fn from_json(value: serde_json::Value) -> Result<DeploymentStatus, ProtocolError> {
        let inner = value
            .get("deploy")
            .ok_or(ProtocolError::MissingField("deploy"))?;

        for field in Self::REQUIRED {
            match inner.get(field) {
                Some(v) if !v.is_null() => {}
                _ => return Err(ProtocolError::MissingField(field)),
            }
        }

        let envelope: StatusEnvelope = serde_json::from_value(value)?;
        envelope.deploy.status_time.as_duration()?;
        Ok(envelope.deploy)
    }
}

/// Known deployment states reported by the webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployStatus {
    Started,
    Building,
    Pulling,
    Pushing,
    Uploading,
    Success,
    Failure,
    Unknown,
    /// A status string this client does not recognise
    Other(String),
}

impl DeployStatus {
    /// Classify a status string, ignoring case
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "started" => Self::Started,
            "building" => Self::Building,
            "pulling" => Self::Pulling,
            "pushing" => Self::Pushing,
            "uploading" => Self::Uploading,
            "success" => Self::Success,
            "failure" => Self::Failure,
            "unknown" => Self::Unknown,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Whether the deployment has finished, one way or the other
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Building => write!(f, "building"),
            Self::Pulling => write!(f, "pulling"),
            Self::Pushing => write!(f, "pushing"),
            Self::Uploading => write!(f, "uploading"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Unknown => write!(f, "unknown"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_time_secs_f64() {
        let t = StatusTime::new(2, 500_000_000);
        assert!((t.as_secs_f64() - 2.5).abs() < 1e-9);
        assert_eq!(t.as_duration().unwrap(), Duration::from_millis(2500));
    }

    #[test]
    fn test_status_time_nanos_carry() {
        let t = StatusTime::new(1, 1_500_000_000);
        assert_eq!(t.as_duration().unwrap(), Duration::from_millis(2500));
    }

    #[test]
    fn test_status_time_overflow_is_an_error() {
        let t = StatusTime::new(u64::MAX, 1_500_000_000);
        assert!(matches!(
            t.as_duration(),
            Err(ProtocolError::Invalid("status_time"))
        ));
    }

    #[test]
    fn test_from_json_rejects_overflowing_status_time() {
        let err = StatusEnvelope::from_json(json!({
            "deploy": {
                "status": "building",
                "status_time": {"secs": u64::MAX, "nanos": 1_500_000_000u32},
                "poll_id": "t"
            }
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::Invalid("status_time")));
    }

    #[test]
    fn test_status_time_from_duration() {
        let t = StatusTime::from(Duration::from_millis(1250));
        assert_eq!(t, StatusTime::new(1, 250_000_000));
    }

    #[test]
    fn test_from_json_valid() {
        let status = StatusEnvelope::from_json(json!({
            "deploy": {
                "status": "building",
                "status_time": {"secs": 12, "nanos": 0},
                "poll_id": "next-token",
                "chall_name": "rev-warmup"
            }
        }))
        .unwrap();

        assert_eq!(status.status, "building");
        assert_eq!(status.status_time, StatusTime::new(12, 0));
        assert_eq!(status.poll_id, PollId::from("next-token"));
        assert_eq!(status.chall_name.as_deref(), Some("rev-warmup"));
    }

    #[test]
    fn test_from_json_missing_envelope() {
        let err = StatusEnvelope::from_json(json!({"status": "building"})).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("deploy")));
    }

    #[test]
    fn test_from_json_missing_status_time() {
        let err = StatusEnvelope::from_json(json!({
            "deploy": {"status": "building", "poll_id": "t"}
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("status_time")));
    }

    #[test]
    fn test_from_json_null_poll_id() {
        let err = StatusEnvelope::from_json(json!({
            "deploy": {"status": "building", "status_time": {"secs": 0, "nanos": 0}, "poll_id": null}
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("poll_id")));
    }

    #[test]
    fn test_from_json_wrong_type() {
        let err = StatusEnvelope::from_json(json!({
            "deploy": {"status": "building", "status_time": "soon", "poll_id": "t"}
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_deploy_status_parse() {
        assert_eq!(DeployStatus::parse("Success"), DeployStatus::Success);
        assert_eq!(DeployStatus::parse("pulling"), DeployStatus::Pulling);
        assert_eq!(
            DeployStatus::parse("queued"),
            DeployStatus::Other("queued".to_string())
        );
    }

    #[test]
    fn test_deploy_status_terminal() {
        assert!(DeployStatus::Success.is_terminal());
        assert!(DeployStatus::Failure.is_terminal());
        assert!(!DeployStatus::Building.is_terminal());
        assert!(!DeployStatus::Other("done".into()).is_terminal());
    }
}
