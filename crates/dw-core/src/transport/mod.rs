//! Transport to the deploy webhook
//!
//! A [`Transport`] sends one action envelope and hands back one decoded
//! response. It performs exactly one attempt per call and does not interpret
//! the HTTP status; [`TransportResponse::into_status`] turns a response into
//! a status document or a [`ProtocolError`].

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{TransportError, UnitError};
use dw_protocol::{ActionEnvelope, DeploymentStatus, ProtocolError, StatusEnvelope};

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body declared as `application/json`
    Json(serde_json::Value),
    /// Any other content type, untouched
    Raw(Bytes),
}

impl ResponseBody {
    /// Body as text; a JSON string is unquoted
    pub fn to_text(&self) -> String {
        match self {
            Self::Json(serde_json::Value::String(s)) => s.clone(),
            Self::Json(other) => other.to_string(),
            Self::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// One webhook response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Declared content type, if any
    pub content_type: Option<String>,
    pub body: ResponseBody,
}

impl TransportResponse {
    /// A 200 response with a JSON body
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: ResponseBody::Json(value),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Interpret the body as a status document.
    ///
    /// A body that cannot be read as one becomes `Rejected` when the HTTP
    /// status was not 2xx, so the webhook's own error text reaches the log.
    pub fn into_status(self) -> Result<DeploymentStatus, ProtocolError> {
        if !self.is_success() {
            let status = self.status;
            let body = self.body.to_text();
            return match self.body {
                ResponseBody::Json(value) => StatusEnvelope::from_json(value)
                    .map_err(|_| ProtocolError::Rejected { status, body }),
                ResponseBody::Raw(_) => Err(ProtocolError::Rejected { status, body }),
            };
        }

        match self.body {
            ResponseBody::Json(value) => StatusEnvelope::from_json(value),
            ResponseBody::Raw(_) => Err(ProtocolError::NotJson {
                content_type: self.content_type,
            }),
        }
    }
}

/// Sends action envelopes to the webhook
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one envelope and wait for the full response
    async fn send(&self, envelope: &ActionEnvelope) -> Result<TransportResponse, TransportError>;

    /// Send one envelope and decode the status document it answers with
    async fn request_status(
        &self,
        envelope: &ActionEnvelope,
    ) -> Result<DeploymentStatus, UnitError> {
        let response = self.send(envelope).await?;
        Ok(response.into_status()?)
    }
}
