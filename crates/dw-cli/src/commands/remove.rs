//! Remove command implementation

use anyhow::{Context, Result};

use crate::output::{print_error, print_success};
use dw_core::config::PollerConfig;
use dw_core::{HttpTransport, Transport};
use dw_protocol::{ActionEnvelope, PollId};

/// Ask the webhook to tear down the given deployments
pub async fn remove_command(config: &PollerConfig, poll_ids: &[String]) -> Result<()> {
    let transport_config = config.transport().context("Incomplete configuration")?;
    let transport = HttpTransport::new(transport_config)?;

    let mut failed = 0;
    for id in poll_ids {
        let envelope = ActionEnvelope::remove(PollId::from(id.as_str()));
        match transport.send(&envelope).await {
            Ok(response) if response.is_success() => {
                print_success(&format!("Removed {}", id));
            }
            Ok(response) => {
                failed += 1;
                print_error(&format!(
                    "Failed to remove {} ({}): {}",
                    id,
                    response.status,
                    response.body.to_text()
                ));
            }
            Err(e) => {
                failed += 1;
                tracing::debug!(poll_id = %id, error = ?e, "Remove request failed");
                print_error(&format!("Failed to remove {}: {}", id, e));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} removals failed", failed, poll_ids.len());
    }
    Ok(())
}
