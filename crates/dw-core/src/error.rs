//! Core error types for deploy-watch

use dw_protocol::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single request to the webhook
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network-level failure (refused, reset, timed out)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Body was declared as JSON but did not parse
    #[error("Invalid JSON in response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request body could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failure of one action for one challenge
#[derive(Error, Debug)]
pub enum UnitError {
    /// Transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// A startup deploy that did not yield a poll id
#[derive(Error, Debug)]
#[error("Deploy of {unit} failed: {source}")]
pub struct DeployError {
    pub unit: String,
    #[source]
    pub source: UnitError,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}
