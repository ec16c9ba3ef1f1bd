//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::{ResponseBody, Transport, TransportResponse};
use crate::config::TransportConfig;
use crate::error::{ConfigError, TransportError};
use dw_protocol::ActionEnvelope;

/// Posts envelopes to a fixed webhook URL with a bearer token
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    token: String,
}

impl HttpTransport {
    /// Build a transport; fails if the endpoint is not a valid URL
    pub fn new(config: TransportConfig) -> Result<Self, ConfigError> {
        let endpoint = reqwest::Url::parse(&config.endpoint).map_err(|e| {
            ConfigError::Invalid(format!("endpoint {:?} is not a URL: {}", config.endpoint, e))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            token: config.token,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

/// `application/json`, ignoring parameters such as `charset`
fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|media| media.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, envelope: &ActionEnvelope) -> Result<TransportResponse, TransportError> {
        let body = serde_json::to_vec(envelope).map_err(TransportError::Encode)?;

        tracing::trace!(action = envelope.kind(), endpoint = %self.endpoint, "Sending request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(
                    action = envelope.kind(),
                    endpoint = %self.endpoint,
                    error = ?e,
                    "Request to webhook failed"
                );
                TransportError::Request(e)
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response.bytes().await?;

        let body = if is_json(content_type.as_deref()) {
            ResponseBody::Json(serde_json::from_slice(&bytes).map_err(TransportError::Decode)?)
        } else {
            ResponseBody::Raw(bytes)
        };

        tracing::trace!(action = envelope.kind(), status, "Received response");

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
