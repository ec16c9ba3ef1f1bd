//! Poller configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::{duration_secs, option_duration_secs};
use crate::error::ConfigError;

/// Pause between the end of one poll cycle and the start of the next
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What to do when the initial deploy of a challenge fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployFailurePolicy {
    /// Stop before polling anything
    #[default]
    Abort,
    /// Keep going; the challenge is shown with its error and never polled
    Exclude,
}

/// Configuration for a deploy-watch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Webhook URL every request is posted to
    pub endpoint: Option<String>,

    /// Bearer token sent with every request
    pub token: Option<String>,

    /// Interval between poll cycles in seconds
    #[serde(with = "duration_secs")]
    pub interval: Duration,

    /// Per-request timeout in seconds (none by default)
    #[serde(with = "option_duration_secs", skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<Duration>,

    /// Ask the webhook to discard previous deployment state
    pub force_wipe: bool,

    /// Handling of failed startup deploys
    pub on_deploy_failure: DeployFailurePolicy,

    /// Exit once every tracked challenge reached success or failure
    pub until_settled: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            interval: DEFAULT_POLL_INTERVAL,
            request_timeout: None,
            force_wipe: false,
            on_deploy_failure: DeployFailurePolicy::default(),
            until_settled: false,
        }
    }
}

impl PollerConfig {
    /// Check values that cannot be expressed in the type
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "interval must be at least one second".to_string(),
            ));
        }
        if matches!(self.request_timeout, Some(t) if t.is_zero()) {
            return Err(ConfigError::Invalid(
                "request_timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    /// Extract the transport settings, failing if endpoint or token is unset
    pub fn transport(&self) -> Result<TransportConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("endpoint".to_string()))?;
        let token = self
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField("token".to_string()))?;

        Ok(TransportConfig {
            endpoint,
            token,
            timeout: self.request_timeout,
        })
    }
}

/// Static settings of the HTTP transport
#[derive(Clone)]
pub struct TransportConfig {
    /// Webhook URL
    pub endpoint: String,
    /// Bearer token
    pub token: String,
    /// Optional per-request timeout
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> PollerConfig {
        PollerConfig {
            endpoint: Some("http://127.0.0.1:9000/deploy".to_string()),
            token: Some("s3cret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_interval_is_five_seconds() {
        assert_eq!(PollerConfig::default().interval, Duration::from_secs(5));
    }

    #[test]
    fn test_transport_requires_endpoint() {
        let config = PollerConfig {
            endpoint: None,
            ..configured()
        };
        let err = config.transport().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "endpoint"));
    }

    #[test]
    fn test_transport_requires_token() {
        let config = PollerConfig {
            token: Some(String::new()),
            ..configured()
        };
        let err = config.transport().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "token"));
    }

    #[test]
    fn test_transport_carries_timeout() {
        let config = PollerConfig {
            request_timeout: Some(Duration::from_secs(10)),
            ..configured()
        };
        let transport = config.transport().unwrap();
        assert_eq!(transport.endpoint, "http://127.0.0.1:9000/deploy");
        assert_eq!(transport.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = PollerConfig {
            interval: Duration::ZERO,
            ..configured()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let transport = configured().transport().unwrap();
        let debug = format!("{:?}", transport);
        assert!(!debug.contains("s3cret"));
    }
}
