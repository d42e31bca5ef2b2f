//! The shared state block and its event mutations.
//!
//! A [`Tracker`] owns every piece of mutable state in the service: the
//! counters, the three bounded ledgers, the current run, and the Kubernetes
//! snapshot. Each inbound event maps to exactly one `&mut self` call, so a
//! caller serializing access (the API layer holds a mutex around the
//! tracker) gets every event applied as a single atomic unit: ledger
//! append-and-truncate, counter adjustment, current-run overwrite, and the
//! derived log line all land together or not at all.

use serde_json::{Map, Value};

use crate::counters::RunCounters;
use crate::history::History;
use crate::model::{
    BuildRecord, BuildStatus, CurrentRun, DEFAULT_BRANCH, DEFAULT_PIPELINE_NAME, LogLevel, LogLine,
    PLACEHOLDER_STAGE, RolloutRecord, RolloutStatus, StageEntry, StageStatus, full_timestamp,
    short_timestamp,
};
use crate::summary::{self, HistoryStats, SuccessRate};

/// Build ledger capacity.
pub const BUILD_HISTORY_CAPACITY: usize = 100;

/// Deployment log ledger capacity.
pub const LOG_HISTORY_CAPACITY: usize = 100;

/// Rollout ledger capacity.
pub const ROLLOUT_HISTORY_CAPACITY: usize = 10;

/// Lifecycle event type that drives rollout bookkeeping.
const DEPLOY_EVENT_TYPE: &str = "deploy";

// ============================================================================
// Inbound Events
// ============================================================================

/// A pipeline status update from the automation system.
#[derive(Debug, Clone, Default)]
pub struct StatusEvent {
    /// Target run status.
    pub status: BuildStatus,
    /// Pipeline name, when the producer reports one.
    pub pipeline_name: Option<String>,
    /// Producer-assigned build number.
    pub build_number: Option<u64>,
    /// Stage label the run is currently in.
    pub stage: Option<String>,
    /// Free-text message.
    pub message: Option<String>,
    /// Branch the build ran against.
    pub branch: Option<String>,
}

/// A stage transition within the current run.
#[derive(Debug, Clone)]
pub struct StageEvent {
    /// Stage name (the identity key within the run).
    pub stage_name: String,
    /// New stage status.
    pub status: StageStatus,
    /// Explicit short timestamp; stamped with the wall clock when absent.
    pub timestamp: Option<String>,
}

/// A generic deployment lifecycle event.
///
/// `deploy` events carry a typed payload (the rolled-out version); every
/// other event type flows through opaquely and only feeds the log ledger.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// A deployment event. Successful deploys that name a version advance
    /// the rollout history and the current version.
    Deploy {
        /// Producer-reported status label.
        status: String,
        /// Version being rolled out, when present in the event details.
        version: Option<String>,
        /// Remaining opaque details.
        details: Option<Map<String, Value>>,
    },
    /// Any other lifecycle event; logged, nothing else.
    Other {
        /// Producer-defined event type.
        event_type: String,
        /// Producer-reported status label.
        status: String,
        /// Opaque details.
        details: Option<Map<String, Value>>,
    },
}

impl LifecycleEvent {
    /// Classifies a raw event into the deploy variant or the opaque fallback.
    #[must_use]
    pub fn new(
        event_type: impl Into<String>,
        status: impl Into<String>,
        details: Option<Map<String, Value>>,
    ) -> Self {
        let event_type = event_type.into();
        if event_type == DEPLOY_EVENT_TYPE {
            let version = details
                .as_ref()
                .and_then(|d| d.get("version"))
                .and_then(Value::as_str)
                .map(str::to_string);
            Self::Deploy {
                status: status.into(),
                version,
                details,
            }
        } else {
            Self::Other {
                event_type,
                status: status.into(),
                details,
            }
        }
    }

    /// The producer-defined event type label.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::Deploy { .. } => DEPLOY_EVENT_TYPE,
            Self::Other { event_type, .. } => event_type,
        }
    }

    /// The producer-reported status label.
    #[must_use]
    pub fn status_label(&self) -> &str {
        match self {
            Self::Deploy { status, .. } | Self::Other { status, .. } => status,
        }
    }

    fn details(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Deploy { details, .. } | Self::Other { details, .. } => details.as_ref(),
        }
    }
}

// ============================================================================
// Kubernetes Snapshot
// ============================================================================

/// Cluster-facing state: identity, current version, pods, rollout history.
#[derive(Debug, Clone)]
pub struct KubernetesState {
    /// Cluster name (static, from configuration).
    pub cluster: String,
    /// Namespace (static, from configuration).
    pub namespace: String,
    /// Version label of the most recent successful deploy.
    pub current_version: String,
    /// Opaque pod descriptors, replaced wholesale by the producer.
    pub pods: Vec<Value>,
    /// Rollout/rollback history, capacity [`ROLLOUT_HISTORY_CAPACITY`].
    pub rollout_history: History<RolloutRecord>,
    next_revision: u64,
}

impl KubernetesState {
    fn new(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            namespace: namespace.into(),
            current_version: "v0".to_string(),
            pods: Vec::new(),
            rollout_history: History::new(ROLLOUT_HISTORY_CAPACITY),
            next_revision: 0,
        }
    }

    fn bump_revision(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }
}

// ============================================================================
// Tracker
// ============================================================================

/// The process-wide tracking state.
#[derive(Debug, Clone)]
pub struct Tracker {
    counters: RunCounters,
    builds: History<BuildRecord>,
    logs: History<LogLine>,
    current_run: CurrentRun,
    kubernetes: KubernetesState,
}

impl Tracker {
    /// Creates a fresh tracker for the given cluster identity.
    ///
    /// The current run starts pending with the canonical stage template
    /// already seeded, so reads are pure from the first request on.
    #[must_use]
    pub fn new(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            counters: RunCounters::default(),
            builds: History::new(BUILD_HISTORY_CAPACITY),
            logs: History::new(LOG_HISTORY_CAPACITY),
            current_run: CurrentRun::default(),
            kubernetes: KubernetesState::new(cluster, namespace),
        }
    }

    // ------------------------------------------------------------------
    // Mutations (one call per inbound event)
    // ------------------------------------------------------------------

    /// Applies a status event: counters, build ledger, current run, and the
    /// derived log line.
    ///
    /// Returns the appended build record, which the response echoes.
    pub fn record_status(&mut self, event: StatusEvent) -> BuildRecord {
        self.counters.apply(event.status);

        // Events without a producer build number take the post-increment
        // event total.
        let build_number = event.build_number.unwrap_or(self.counters.total);
        let branch = event
            .branch
            .clone()
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        let record = BuildRecord {
            pipeline_name: event.pipeline_name.clone(),
            build_number,
            status: event.status,
            stage: event.stage.clone(),
            branch: branch.clone(),
            message: event.message.clone(),
            recorded_at: full_timestamp(),
            simulated_duration: simulated_duration(build_number),
        };
        self.builds.push(record.clone());

        let run = &mut self.current_run;
        run.status = event.status;
        run.current_stage = event
            .stage
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_STAGE.to_string());
        run.branch = branch;
        if let Some(name) = event.pipeline_name.clone() {
            run.name = Some(name);
        }
        if let Some(number) = event.build_number {
            run.build_number = number;
        }
        // Stamped once; later running events leave it untouched.
        if event.status == BuildStatus::Running && run.start_time.is_none() {
            run.start_time = Some(short_timestamp());
        }

        let display = event
            .pipeline_name
            .as_deref()
            .unwrap_or(DEFAULT_PIPELINE_NAME);
        let text = event
            .message
            .clone()
            .unwrap_or_else(|| format!("Pipeline {display} - {}", event.status));
        self.logs.push(LogLine::now(event.status.log_level(), text));

        record
    }

    /// Applies a stage event: update-in-place by name, append when new.
    ///
    /// The current-stage label follows the event unconditionally, even when
    /// the run's overall status is untouched.
    pub fn record_stage(&mut self, event: StageEvent) -> StageEntry {
        let time = event.timestamp.clone().unwrap_or_else(short_timestamp);

        let entry = match self
            .current_run
            .stages
            .iter_mut()
            .find(|s| s.name == event.stage_name)
        {
            Some(existing) => {
                existing.status = event.status;
                existing.time = Some(time);
                existing.clone()
            }
            None => {
                let entry = StageEntry {
                    name: event.stage_name.clone(),
                    status: event.status,
                    time: Some(time),
                };
                self.current_run.stages.push(entry.clone());
                entry
            }
        };
        self.current_run.current_stage.clone_from(&event.stage_name);

        let text = format!("Stage {} - {}", event.stage_name, event.status);
        self.logs.push(LogLine::now(event.status.log_level(), text));

        entry
    }

    /// Starts a freshly triggered run and returns its build number.
    ///
    /// Claims an active slot and resets the current run to the running
    /// template. The event total is untouched; build numbers for triggered
    /// runs are provisional until status events arrive.
    pub fn begin_run(&mut self, pipeline_name: &str, branch: &str) -> u64 {
        self.counters.begin_run();
        let build_number = self.counters.next_build_number();
        self.current_run = CurrentRun::started(pipeline_name, build_number, branch);
        build_number
    }

    /// Appends the single log line a trigger produces, once the build-server
    /// notification outcome is known.
    ///
    /// State correctness is identical on both paths; only the wording
    /// differs.
    pub fn record_trigger_outcome(
        &mut self,
        pipeline_name: &str,
        build_number: u64,
        triggered: bool,
    ) {
        let text = if triggered {
            format!("Triggered {pipeline_name} #{build_number}")
        } else {
            format!("Queued {pipeline_name} #{build_number} (build server unavailable)")
        };
        self.logs.push(LogLine::now(LogLevel::Info, text));
    }

    /// Records a lifecycle event.
    ///
    /// Every event appends one log line; successful deploys that name a
    /// version also advance the rollout history and the current version.
    pub fn record_lifecycle(&mut self, event: &LifecycleEvent) -> LogLine {
        let mut text = format!("{}: {}", event.event_type(), event.status_label());
        if let Some(details) = event.details() {
            if !details.is_empty() {
                text.push_str(" - ");
                text.push_str(&Value::Object(details.clone()).to_string());
            }
        }
        let line = LogLine::now(LogLevel::for_label(event.status_label()), text);
        self.logs.push(line.clone());

        if let LifecycleEvent::Deploy {
            status,
            version: Some(version),
            ..
        } = event
        {
            if status == "success" {
                let revision = self.kubernetes.bump_revision();
                self.kubernetes.rollout_history.push(RolloutRecord {
                    revision,
                    image: version.clone(),
                    time: short_timestamp(),
                    status: RolloutStatus::Success,
                });
                self.kubernetes.current_version.clone_from(version);
            }
        }

        line
    }

    /// Records a rollback request.
    ///
    /// Accepted unconditionally: the deployment id is not validated against
    /// any known deployment. Appends a rolling rollout record and a warning
    /// log line.
    pub fn record_rollback(&mut self, deployment_id: &str) -> RolloutRecord {
        let revision = self.kubernetes.bump_revision();
        let record = RolloutRecord {
            revision,
            image: deployment_id.to_string(),
            time: short_timestamp(),
            status: RolloutStatus::Rolling,
        };
        self.kubernetes.rollout_history.push(record.clone());
        self.logs.push(LogLine::now(
            LogLevel::Warning,
            format!("Rollback initiated for deployment {deployment_id}"),
        ));
        record
    }

    /// Replaces the pod list wholesale and returns the new pod count.
    pub fn replace_pods(&mut self, pods: Vec<Value>) -> usize {
        self.kubernetes.pods = pods;
        self.kubernetes.pods.len()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// The current counter values.
    #[must_use]
    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// The current run snapshot.
    #[must_use]
    pub fn current_run(&self) -> &CurrentRun {
        &self.current_run
    }

    /// The Kubernetes snapshot.
    #[must_use]
    pub fn kubernetes(&self) -> &KubernetesState {
        &self.kubernetes
    }

    /// The most recent build records, newest first.
    #[must_use]
    pub fn recent_builds(&self, limit: usize) -> Vec<BuildRecord> {
        self.builds.recent(limit)
    }

    /// Number of retained build records.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds.len()
    }

    /// The most recent log lines, newest first.
    #[must_use]
    pub fn recent_logs(&self, limit: usize) -> Vec<LogLine> {
        self.logs.recent(limit)
    }

    /// Number of retained log lines.
    #[must_use]
    pub fn log_count(&self) -> usize {
        self.logs.len()
    }

    /// Success rate over completed runs.
    #[must_use]
    pub fn success_rate(&self) -> SuccessRate {
        summary::success_rate(&self.counters)
    }

    /// Aggregated build-history statistics.
    #[must_use]
    pub fn history_stats(&self) -> HistoryStats {
        summary::history_stats(&self.counters, &self.builds)
    }
}

/// Illustrative build duration in seconds, derived from the build number so
/// a record's value is stable.
fn simulated_duration(build_number: u64) -> u64 {
    45 + (build_number % 8) * 15
}
