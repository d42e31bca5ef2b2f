//! Running counters for pipeline status events.

use serde::{Deserialize, Serialize};

use crate::model::BuildStatus;

/// Totals for builds seen, successes, failures, and active runs.
///
/// `total` counts every status event ever received, regardless of value.
/// `active` decrements saturate at zero, so the "never negative" invariant
/// holds by construction rather than by runtime check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Number of status events ever received.
    pub total: u64,
    /// Number of runs currently believed to be running.
    pub active: u64,
    /// Number of successful runs.
    pub succeeded: u64,
    /// Number of failed runs.
    pub failed: u64,
}

impl RunCounters {
    /// Applies one status event to the counters.
    ///
    /// Total over every status value: terminal statuses adjust the outcome
    /// counters and release an active slot, `running` claims one, and
    /// `pending` has no effect beyond the unconditional total increment.
    pub fn apply(&mut self, status: BuildStatus) {
        self.total += 1;
        match status {
            BuildStatus::Success => {
                self.succeeded += 1;
                self.active = self.active.saturating_sub(1);
            }
            BuildStatus::Failure => {
                self.failed += 1;
                self.active = self.active.saturating_sub(1);
            }
            BuildStatus::Running => self.active += 1,
            BuildStatus::Pending => {}
        }
    }

    /// Claims an active slot for an explicitly triggered run.
    ///
    /// Triggering does not count as a status event, so `total` is untouched.
    pub fn begin_run(&mut self) {
        self.active += 1;
    }

    /// The build number a newly triggered run would be assigned.
    #[must_use]
    pub const fn next_build_number(&self) -> u64 {
        self.total + 1
    }
}
