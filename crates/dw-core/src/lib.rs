//! dw-core: Core abstractions and configuration for deploy-watch
//!
//! This crate provides the per-challenge state model, configuration loading
//! and the HTTP transport used to talk to the deploy webhook.

pub mod config;
pub mod error;
pub mod transport;
pub mod unit;

pub use error::{ConfigError, DeployError, TransportError, UnitError};
pub use transport::{HttpTransport, ResponseBody, Transport, TransportResponse};
pub use unit::{format_age, parse_unit_names, Unit, UnitTable};
