//! dw-protocol: Wire protocol for the deploy-watch webhook
//!
//! This crate defines the JSON envelopes sent to the deploy webhook and the
//! status document it answers with. Every request and every response is
//! wrapped in a top-level `deploy` object.

pub mod action;
pub mod error;
pub mod poll_id;
pub mod status;

pub use action::{ActionEnvelope, DeployAction};
pub use error::ProtocolError;
pub use poll_id::PollId;
pub use status::{DeployStatus, DeploymentStatus, StatusEnvelope, StatusTime};
