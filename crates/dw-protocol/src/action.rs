//! Request envelopes sent to the deploy webhook
//!
//! Every request body has the shape
//!
//! ```json
//! {"deploy": {"__type": "deploy", "chall": "pwn-intro", "force_wipe": false}}
//! {"deploy": {"__type": "poll", "id": "<poll id>"}}
//! {"deploy": {"__type": "remove", "chall": "<poll id>"}}
//! ```

use serde::{Deserialize, Serialize};

use crate::PollId;

/// Action understood by the deploy webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type", rename_all = "snake_case")]
pub enum DeployAction {
    /// Start (or restart) the deployment of a challenge
    Deploy {
        chall: String,
        /// Discard any previous deployment state for the challenge first
        force_wipe: bool,
    },

    /// Fetch the status of a running deployment
    Poll { id: PollId },

    /// Tear down a deployment
    Remove { chall: PollId },
}

/// Top-level request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub deploy: DeployAction,
}

impl ActionEnvelope {
    /// Deploy request for a named challenge
    pub fn deploy(chall: impl Into<String>, force_wipe: bool) -> Self {
        Self {
            deploy: DeployAction::Deploy {
                chall: chall.into(),
                force_wipe,
            },
        }
    }

    /// Poll request carrying the latest continuation token
    pub fn poll(id: PollId) -> Self {
        Self {
            deploy: DeployAction::Poll { id },
        }
    }

    /// Remove request for a deployment
    pub fn remove(id: PollId) -> Self {
        Self {
            deploy: DeployAction::Remove { chall: id },
        }
    }

    /// Short action name, used in logs
    pub fn kind(&self) -> &'static str {
        match self.deploy {
            DeployAction::Deploy { .. } => "deploy",
            DeployAction::Poll { .. } => "poll",
            DeployAction::Remove { .. } => "remove",
        }
    }
}
