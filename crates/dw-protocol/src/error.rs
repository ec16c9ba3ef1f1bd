//! Protocol error types

use thiserror::Error;

/// Errors raised while interpreting a webhook response
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A required field was absent from the status document
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    /// The response body was not declared as JSON
    #[error("Expected a JSON response, got content type {content_type:?}")]
    NotJson { content_type: Option<String> },

    /// The body was JSON but did not match the status shape
    #[error("Malformed status document: {0}")]
    Decode(#[from] serde_json::Error),

    /// A field was present but held an unusable value
    #[error("Invalid value for field: {0}")]
    Invalid(&'static str),

    /// The webhook answered with a non-success HTTP status and no usable status
    #[error("Webhook rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}
