//! deploy-watch CLI
//!
//! Deploys challenges through the deploy webhook, then polls their status
//! every few seconds and prints a table until interrupted:
//!
//! ```text
//! deploy-watch pwn-intro,web-login rev-warmup
//! deploy-watch remove 3f0c2a9e-...
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deploy_watch::commands;
use deploy_watch::output::{print_error, OutputFormat};
use deploy_watch::overrides::{resolve_config, ConfigOverrides};
use dw_core::parse_unit_names;

#[derive(Parser)]
#[command(name = "deploy-watch")]
#[command(author, version, about = "Deploy challenges and watch their status")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    /// Challenges to deploy; comma-separated lists are accepted
    #[arg(required = true, value_name = "CHALLS")]
    challs: Vec<String>,

    /// Deploy webhook URL
    #[arg(long, global = true, env = "WEBHOOK_ADDRESS")]
    endpoint: Option<String>,

    /// Bearer token for the webhook
    #[arg(long, global = true, env = "DEPLOY_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Seconds between poll cycles [default: 5]
    #[arg(short, long, value_name = "SECS")]
    interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Discard previous deployment state before deploying
    #[arg(long)]
    force_wipe: bool,

    /// Keep going when a deploy fails; the challenge is not polled
    #[arg(long)]
    exclude_failed: bool,

    /// Exit once every challenge reports success or failure
    #[arg(long)]
    until_settled: bool,

    /// Status table layout
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tear down deployments by poll id
    Remove {
        /// Poll ids returned by earlier deploys
        #[arg(required = true)]
        poll_ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    // Logs go to stderr so the status table owns stdout
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let overrides = ConfigOverrides {
        endpoint: cli.endpoint,
        token: cli.token,
        interval: cli.interval,
        timeout: cli.timeout,
        force_wipe: cli.force_wipe,
        exclude_failed: cli.exclude_failed,
        until_settled: cli.until_settled,
    };
    let config = match resolve_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            print_error(&format!("{:#}", e));
            return Err(e);
        }
    };

    match cli.command {
        Some(Commands::Remove { poll_ids }) => {
            commands::remove_command(&config, &poll_ids).await?;
        }
        None => {
            let challs = parse_unit_names(&cli.challs);
            commands::watch_command(&config, challs, cli.format).await?;
        }
    }

    Ok(())
}
