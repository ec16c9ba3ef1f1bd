//! Poll-state reconciliation loop
//!
//! The [`Reconciler`] owns the [`UnitTable`] and is its only writer.
//!
//! # Startup
//!
//! One deploy request per challenge, strictly in input order. Each answer
//! carries the first poll id for that challenge. A failed deploy is handled
//! according to [`DeployFailurePolicy`]; a poll id is never made up.
//!
//! # Cycles
//!
//! After each interval, one poll per tracked challenge is issued with that
//! challenge's latest poll id. The polls run concurrently and are all joined
//! before any state changes, so:
//!
//! - at most one poll per challenge is ever in flight,
//! - the next cycle cannot start before every poll of this one settled,
//! - results are applied and rendered on the loop's own task, without locks.
//!
//! A failed poll leaves that challenge's status, age and poll id untouched.

use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::output::DisplaySink;
use dw_core::config::{DeployFailurePolicy, PollerConfig, DEFAULT_POLL_INTERVAL};
use dw_core::{DeployError, Transport, UnitError, UnitTable};
use dw_protocol::ActionEnvelope;

/// Behaviour knobs of the loop
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Sent with every deploy request
    pub force_wipe: bool,
    pub on_deploy_failure: DeployFailurePolicy,
    /// Stop once every tracked challenge reached a terminal status
    pub until_settled: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            force_wipe: false,
            on_deploy_failure: DeployFailurePolicy::default(),
            until_settled: false,
        }
    }
}

impl From<&PollerConfig> for ReconcileOptions {
    fn from(config: &PollerConfig) -> Self {
        Self {
            interval: config.interval,
            force_wipe: config.force_wipe,
            on_deploy_failure: config.on_deploy_failure,
            until_settled: config.until_settled,
        }
    }
}

/// Outcome of one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Why [`Reconciler::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    Settled,
}

/// Drives deploys and polls for a fixed set of challenges
pub struct Reconciler<T> {
    transport: T,
    units: UnitTable,
    options: ReconcileOptions,
    cycles: u64,
}

impl<T: Transport> Reconciler<T> {
    /// Create a loop over `names`, all not started
    pub fn new<I, S>(transport: T, names: I, options: ReconcileOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            transport,
            units: UnitTable::new(names),
            options,
            cycles: 0,
        }
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deploy every challenge, one after another, in input order.
    ///
    /// Returns the number of challenges that got a poll id. With
    /// [`DeployFailurePolicy::Abort`] the first failure is returned and the
    /// remaining challenges are not deployed.
    pub async fn deploy_all(&mut self) -> Result<usize, DeployError> {
        let mut deployed = 0;

        for idx in 0..self.units.len() {
            let Some(name) = self.units.get(idx).map(|u| u.name.clone()) else {
                continue;
            };
            let envelope = ActionEnvelope::deploy(name.as_str(), self.options.force_wipe);

            match self.transport.request_status(&envelope).await {
                Ok(status) => {
                    tracing::info!(unit = %name, poll_id = %status.poll_id, "Deploy accepted");
                    self.units.record_deploy(idx, status.poll_id);
                    deployed += 1;
                }
                Err(e) => match self.options.on_deploy_failure {
                    DeployFailurePolicy::Abort => {
                        return Err(DeployError {
                            unit: name,
                            source: e,
                        });
                    }
                    DeployFailurePolicy::Exclude => {
                        tracing::error!(
                            unit = %name,
                            action = envelope.kind(),
                            error = %e,
                            "Deploy failed, challenge will not be polled"
                        );
                        self.units.record_error(idx, e.to_string());
                    }
                },
            }
        }

        Ok(deployed)
    }

    /// Poll every tracked challenge once and apply the results.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let tracked = self.units.tracked();
        let mut report = CycleReport {
            cycle: self.cycles,
            attempted: tracked.len(),
            ..Default::default()
        };

        let transport = &self.transport;
        let polls = tracked.into_iter().map(|(idx, poll_id)| async move {
            let result = transport.request_status(&ActionEnvelope::poll(poll_id)).await;
            (idx, result)
        });
        let results = join_all(polls).await;

        for (idx, result) in results {
            let applied = result.and_then(|status| {
                self.units
                    .apply_status(idx, &status)
                    .map_err(UnitError::from)
            });
            match applied {
                Ok(()) => {
                    report.succeeded += 1;
                }
                Err(e) => {
                    let name = self.units.get(idx).map(|u| u.name.as_str()).unwrap_or("?");
                    tracing::warn!(
                        unit = %name,
                        action = "poll",
                        cycle = report.cycle,
                        error = %e,
                        "Poll failed, keeping previous status"
                    );
                    self.units.record_error(idx, e.to_string());
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            cycle = report.cycle,
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            "Poll cycle complete"
        );
        report
    }

    async fn next_cycle(&mut self) -> CycleReport {
        tokio::time::sleep(self.options.interval).await;
        self.run_cycle().await
    }

    /// Run cycles until cancelled, rendering after each one.
    ///
    /// The interval is re-armed after a cycle's work is done, so cycles
    /// never overlap. Cancellation abandons an in-flight cycle.
    pub async fn run<S: DisplaySink>(
        &mut self,
        sink: &mut S,
        cancel: CancellationToken,
    ) -> StopReason {
        tracing::info!(
            interval = ?self.options.interval,
            tracked = self.units.tracked().len(),
            "Starting poll loop"
        );

        loop {
            let report = tokio::select! {
                _ = cancel.cancelled() => None,
                report = self.next_cycle() => Some(report),
            };

            match report {
                Some(_) => sink.render(&self.units),
                None => {
                    tracing::info!("Poll loop cancelled");
                    return StopReason::Cancelled;
                }
            }

            if self.options.until_settled && self.units.all_settled() {
                tracing::info!("All challenges settled");
                return StopReason::Settled;
            }
        }
    }
}
