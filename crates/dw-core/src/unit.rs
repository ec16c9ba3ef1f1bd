//! Per-challenge poll state
//!
//! A [`UnitTable`] holds one [`Unit`] per challenge named on the command
//! line, in the order given. It is owned by the reconciliation loop, which is
//! the only writer. A unit only changes after a successful response for it;
//! failures are recorded next to the last good state without touching it.

use std::time::Duration;

use dw_protocol::{DeployStatus, DeploymentStatus, PollId, ProtocolError};

/// Status shown before the webhook has reported anything
pub const NOT_STARTED: &str = "Not started";

/// Flatten command-line arguments into challenge names.
///
/// Each argument may hold several comma-separated names, kept exactly as
/// written. Order and duplicates are preserved; empty segments are dropped.
pub fn parse_unit_names<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .flat_map(|arg| {
            arg.as_ref()
                .split(',')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Seconds with one decimal, halves rounding up (`0.25` -> `"0.3"`)
pub fn format_age(age: Duration) -> String {
    let tenths = u128::from(age.as_secs()) * 10
        + u128::from((age.subsec_nanos() + 50_000_000) / 100_000_000);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Poll state of a single challenge
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Challenge name as given on the command line
    pub name: String,
    /// Last status string reported by the webhook
    pub status: String,
    /// Time since the status last changed, as of the last response
    pub status_age: Option<Duration>,
    /// Token for the next poll; `None` until the deploy answered
    pub poll_id: Option<PollId>,
    /// Most recent failure, cleared by the next success
    pub last_error: Option<String>,
}

impl Unit {
    /// Create a unit that has not been deployed yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: NOT_STARTED.to_string(),
            status_age: None,
            poll_id: None,
            last_error: None,
        }
    }

    /// Formatted status, e.g. `"  success for 2.5 seconds"`
    pub fn status_line(&self) -> String {
        match self.status_age {
            Some(age) => format!("{:>9} for {} seconds", self.status, format_age(age)),
            None => self.status.clone(),
        }
    }

    /// Classified status
    pub fn deploy_status(&self) -> DeployStatus {
        DeployStatus::parse(&self.status)
    }

    /// Whether this unit can be polled
    pub fn is_tracked(&self) -> bool {
        self.poll_id.is_some()
    }
}

/// Ordered collection of units
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    units: Vec<Unit>,
}

impl UnitTable {
    /// Create a table with one not-started unit per name
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            units: names.into_iter().map(Unit::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Unit> {
        self.units.get(idx)
    }

    /// Units in input order
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Index and current token of every unit that holds one
    pub fn tracked(&self) -> Vec<(usize, PollId)> {
        self.units
            .iter()
            .enumerate()
            .filter_map(|(idx, unit)| unit.poll_id.clone().map(|id| (idx, id)))
            .collect()
    }

    /// Store the token returned by the initial deploy
    pub fn record_deploy(&mut self, idx: usize, poll_id: PollId) {
        if let Some(unit) = self.units.get_mut(idx) {
            unit.poll_id = Some(poll_id);
            unit.last_error = None;
        }
    }

    /// Replace status, age and token in one step.
    ///
    /// Nothing changes when the reported age is unusable.
    pub fn apply_status(
        &mut self,
        idx: usize,
        status: &DeploymentStatus,
    ) -> Result<(), ProtocolError> {
        let age = status.status_time.as_duration()?;
        if let Some(unit) = self.units.get_mut(idx) {
            unit.status = status.status.clone();
            unit.status_age = Some(age);
            unit.poll_id = Some(status.poll_id.clone());
            unit.last_error = None;
        }
        Ok(())
    }

    /// Note a failure; the last good state is kept
    pub fn record_error(&mut self, idx: usize, error: impl Into<String>) {
        if let Some(unit) = self.units.get_mut(idx) {
            unit.last_error = Some(error.into());
        }
    }

    /// True when at least one unit is tracked and every tracked unit
    /// reported success or failure
    pub fn all_settled(&self) -> bool {
        let mut tracked = self.units.iter().filter(|u| u.is_tracked()).peekable();
        tracked.peek().is_some() && tracked.all(|u| u.deploy_status().is_terminal())
    }
}
