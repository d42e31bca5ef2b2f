//! Data model for pipeline tracking.
//!
//! Statuses and log levels are closed enumerations validated at the
//! serialization boundary; free-form status strings never reach the core.
//! Records are immutable once appended to a ledger; only [`CurrentRun`] is
//! mutated in place, and only by the tracker.

use chrono::{Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The canonical stage template seeded into every fresh run.
pub const STAGE_TEMPLATE: [&str; 5] = ["Checkout", "Test", "Build", "Push", "Deploy"];

/// Pipeline name used when a trigger request does not supply one.
pub const DEFAULT_PIPELINE_NAME: &str = "autodeployx-backend";

/// Branch recorded when an event does not supply one.
pub const DEFAULT_BRANCH: &str = "main";

/// Display label for the current stage before any stage has reported.
pub const PLACEHOLDER_STAGE: &str = "Queued";

/// Returns the current time as an ISO 8601 timestamp.
///
/// The first 19 characters are the date+time without sub-second precision,
/// which is what summary views truncate to.
#[must_use]
pub fn full_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Returns the current local wall-clock time in short `%H:%M:%S` form.
#[must_use]
pub fn short_timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

// ============================================================================
// Status Enumerations
// ============================================================================

/// Overall status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// The run completed successfully.
    Success,
    /// The run completed with a failure.
    Failure,
    /// The run is actively executing.
    Running,
    /// Created, waiting to start.
    Pending,
}

impl BuildStatus {
    /// Returns true if this is a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Returns the deployment-log level derived from this status.
    #[must_use]
    pub const fn log_level(self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Success,
            Self::Failure => LogLevel::Error,
            Self::Running | Self::Pending => LogLevel::Info,
        }
    }
}

impl Default for BuildStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Running => write!(f, "running"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// Status of a single stage within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not yet started.
    Pending,
    /// Actively executing.
    Running,
    /// Completed successfully.
    Success,
    /// Completed with a failure.
    Failed,
}

impl StageStatus {
    /// Returns the deployment-log level derived from this status.
    #[must_use]
    pub const fn log_level(self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Success,
            Self::Failed => LogLevel::Error,
            Self::Pending | Self::Running => LogLevel::Info,
        }
    }
}

impl Default for StageStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Severity of a deployment log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Informational.
    Info,
    /// A successful outcome.
    Success,
    /// A failed outcome.
    Error,
    /// A degraded or noteworthy condition (e.g. rollback).
    Warning,
}

impl LogLevel {
    /// Derives a level from a free-form lifecycle status label.
    ///
    /// Lifecycle events carry producer-defined status strings; only the
    /// success/failure vocabulary maps to a non-info level.
    #[must_use]
    pub fn for_label(label: &str) -> Self {
        match label {
            "success" => Self::Success,
            "failure" | "failed" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Status of a rollout history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloutStatus {
    /// The rollout completed.
    Success,
    /// The rollout (or rollback) is in progress.
    Rolling,
}

// ============================================================================
// Ledger Records
// ============================================================================

/// One entry in the build history ledger. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Pipeline name as reported by the producer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_name: Option<String>,
    /// Build number (producer-assigned, or the running event total).
    pub build_number: u64,
    /// Status carried by the event.
    pub status: BuildStatus,
    /// Stage label carried by the event, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Branch the build ran against.
    pub branch: String,
    /// Free-text message carried by the event, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// ISO 8601 timestamp at which the record was appended.
    pub recorded_at: String,
    /// Illustrative build duration in seconds. Not load-bearing.
    pub simulated_duration: u64,
}

/// One entry in the deployment log ledger. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    /// Short local wall-clock time (`%H:%M:%S`).
    pub time: String,
    /// Severity.
    pub level: LogLevel,
    /// Log text.
    pub text: String,
}

impl LogLine {
    /// Creates a log line stamped with the current wall-clock time.
    #[must_use]
    pub fn now(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            time: short_timestamp(),
            level,
            text: text.into(),
        }
    }
}

/// One entry in the rollout history ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloutRecord {
    /// Revision number, 1-based and monotonically increasing.
    pub revision: u64,
    /// Image or version label the rollout targets.
    pub image: String,
    /// Short local wall-clock time of the rollout event.
    pub time: String,
    /// Rollout outcome.
    pub status: RolloutStatus,
}

// ============================================================================
// Current Run
// ============================================================================

/// One named stage within the current run.
///
/// The stage name is the identity key: stage events update a matching entry
/// in place and append when the name is new.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEntry {
    /// Stage name (unique within the run).
    pub name: String,
    /// Stage status.
    pub status: StageStatus,
    /// Short wall-clock time of the last update, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl StageEntry {
    /// Creates a pending stage with no recorded time.
    #[must_use]
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Pending,
            time: None,
        }
    }
}

/// The single in-flight (or most recent) pipeline run.
///
/// A process starts with a pending run already seeded with the canonical
/// stage template, so reads never have to lazily initialize anything.
/// Triggering a run supersedes this record wholesale; status and stage
/// events mutate it field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentRun {
    /// Pipeline name, once one has been reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Build number of this run.
    pub build_number: u64,
    /// Overall run status.
    pub status: BuildStatus,
    /// Display label of the currently-active stage.
    pub current_stage: String,
    /// Branch the run is building.
    pub branch: String,
    /// Short wall-clock time the run first entered `running`, if it has.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Per-stage status list, in pipeline order.
    pub stages: Vec<StageEntry>,
}

impl CurrentRun {
    /// The canonical five-stage pending template.
    #[must_use]
    pub fn template_stages() -> Vec<StageEntry> {
        STAGE_TEMPLATE
            .iter()
            .copied()
            .map(StageEntry::pending)
            .collect()
    }

    /// Creates a fresh run that has just been triggered.
    ///
    /// A triggered run re-enters at `running` with all template stages
    /// pending and its start time stamped.
    #[must_use]
    pub fn started(name: impl Into<String>, build_number: u64, branch: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            build_number,
            status: BuildStatus::Running,
            current_stage: STAGE_TEMPLATE[0].to_string(),
            branch: branch.into(),
            start_time: Some(short_timestamp()),
            stages: Self::template_stages(),
        }
    }
}

impl Default for CurrentRun {
    fn default() -> Self {
        Self {
            name: None,
            build_number: 0,
            status: BuildStatus::Pending,
            current_stage: PLACEHOLDER_STAGE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            start_time: None,
            stages: Self::template_stages(),
        }
    }
}
