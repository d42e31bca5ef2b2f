//! Read-side summary derivations.
//!
//! Pure functions over the counters and the build ledger. Nothing here
//! mutates tracked state.

use serde::Serialize;

use crate::counters::RunCounters;
use crate::history::History;
use crate::model::{BuildRecord, BuildStatus};

/// Sentinel reported when no successful build exists yet.
pub const NOT_AVAILABLE: &str = "N/A";

/// Deployment success rate over completed runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessRate {
    /// Percentage of completed runs that succeeded, one decimal place.
    /// Exactly `100.0` when no run has completed yet.
    pub rate: f64,
    /// Number of successful runs.
    #[serde(rename = "success")]
    pub succeeded: u64,
    /// Number of failed runs.
    pub failed: u64,
    /// Number of completed runs (the rate's denominator).
    pub total: u64,
}

/// Aggregated build-history statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    /// Number of status events ever received.
    pub total: u64,
    /// Number of successful runs.
    #[serde(rename = "success")]
    pub succeeded: u64,
    /// Number of failed runs.
    pub failed: u64,
    /// Version label of the most recent successful build (`v{build_number}`),
    /// or [`NOT_AVAILABLE`].
    ///
    /// Serialized in the dashboard's camelCase vocabulary.
    #[serde(rename = "lastDeployedVersion")]
    pub last_deployed_version: String,
    /// Timestamp of the most recent successful build, truncated to date+time,
    /// or [`NOT_AVAILABLE`].
    #[serde(rename = "lastDeployedAt")]
    pub last_deployed_at: String,
}

/// Computes the success rate from the counters.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn success_rate(counters: &RunCounters) -> SuccessRate {
    let attempts = counters.succeeded + counters.failed;
    let rate = if attempts == 0 {
        100.0
    } else {
        round_one_decimal(counters.succeeded as f64 / attempts as f64 * 100.0)
    };
    SuccessRate {
        rate,
        succeeded: counters.succeeded,
        failed: counters.failed,
        total: attempts,
    }
}

/// Computes history statistics, scanning the build ledger most-recent-first
/// for the latest successful build.
#[must_use]
pub fn history_stats(counters: &RunCounters, builds: &History<BuildRecord>) -> HistoryStats {
    let last_success = builds.iter().find(|b| b.status == BuildStatus::Success);
    let (last_deployed_version, last_deployed_at) = match last_success {
        Some(build) => (
            format!("v{}", build.build_number),
            build
                .recorded_at
                .get(..19)
                .unwrap_or(&build.recorded_at)
                .to_string(),
        ),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };
    HistoryStats {
        total: counters.total,
        succeeded: counters.succeeded,
        failed: counters.failed,
        last_deployed_version,
        last_deployed_at,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::BUILD_HISTORY_CAPACITY;

    fn build(status: BuildStatus, build_number: u64, recorded_at: &str) -> BuildRecord {
        BuildRecord {
            pipeline_name: None,
            build_number,
            status,
            stage: None,
            branch: "main".to_string(),
            message: None,
            recorded_at: recorded_at.to_string(),
            simulated_duration: 60,
        }
    }

    fn counters(succeeded: u64, failed: u64) -> RunCounters {
        RunCounters {
            total: succeeded + failed,
            active: 0,
            succeeded,
            failed,
        }
    }

    #[test]
    fn rate_is_one_hundred_with_no_completed_runs() {
        let rate = success_rate(&RunCounters::default());
        assert_eq!(rate.rate, 100.0);
        assert_eq!(rate.total, 0);
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        assert_eq!(success_rate(&counters(3, 1)).rate, 75.0);
        assert_eq!(success_rate(&counters(1, 2)).rate, 33.3);
        assert_eq!(success_rate(&counters(2, 1)).rate, 66.7);
    }

    #[test]
    fn stats_scan_front_to_back_for_the_latest_success() {
        let mut builds = History::new(BUILD_HISTORY_CAPACITY);
        // Appended oldest-first, so the failure sits in front of the success.
        builds.push(build(BuildStatus::Success, 7, "2025-11-02T09:15:00.000000Z"));
        builds.push(build(BuildStatus::Failure, 8, "2025-11-02T10:00:00.000000Z"));

        let stats = history_stats(&counters(1, 1), &builds);
        assert_eq!(stats.last_deployed_version, "v7");
        assert_eq!(stats.last_deployed_at, "2025-11-02T09:15:00");
    }

    #[test]
    fn stats_report_sentinels_without_a_success() {
        let mut builds = History::new(BUILD_HISTORY_CAPACITY);
        builds.push(build(BuildStatus::Failure, 1, "2025-11-02T10:00:00.000000Z"));

        let stats = history_stats(&counters(0, 1), &builds);
        assert_eq!(stats.last_deployed_version, NOT_AVAILABLE);
        assert_eq!(stats.last_deployed_at, NOT_AVAILABLE);
    }

    #[test]
    fn stats_keep_short_timestamps_as_is() {
        let mut builds = History::new(BUILD_HISTORY_CAPACITY);
        builds.push(build(BuildStatus::Success, 3, "short"));

        let stats = history_stats(&counters(1, 0), &builds);
        assert_eq!(stats.last_deployed_at, "short");
    }
}
