//! Deploy-and-watch command

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::output::{print_info, print_success, print_warning, OutputFormat, StdoutSink};
use crate::reconcile::{ReconcileOptions, Reconciler, StopReason};
use dw_core::config::PollerConfig;
use dw_core::HttpTransport;

/// Deploy every challenge, then poll until interrupted (or settled)
pub async fn watch_command(
    config: &PollerConfig,
    challs: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    if challs.is_empty() {
        anyhow::bail!("No challenges given");
    }

    let transport_config = config.transport().context("Incomplete configuration")?;
    let transport = HttpTransport::new(transport_config)?;
    tracing::info!(endpoint = transport.endpoint(), "Using deploy webhook");

    print_info(&format!("Deploying: {}", challs.join(", ")));

    let mut reconciler = Reconciler::new(transport, challs, ReconcileOptions::from(config));

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    let deployed = tokio::select! {
        _ = cancel.cancelled() => {
            print_info("Interrupted during deploy");
            return Ok(());
        }
        result = reconciler.deploy_all() => result?,
    };
    let total = reconciler.units().len();
    tracing::info!(deployed, total, "Initial deploys complete");
    if deployed < total {
        print_warning(&format!(
            "{} of {} challenges failed to deploy and will not be polled",
            total - deployed,
            total
        ));
    }

    let mut sink = StdoutSink::new(format);
    match reconciler.run(&mut sink, cancel).await {
        StopReason::Cancelled => print_info("Stopped"),
        StopReason::Settled => print_success("All challenges settled"),
    }

    Ok(())
}

/// Cancel `cancel` on Ctrl+C or SIGTERM
pub async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel.cancel();
}
