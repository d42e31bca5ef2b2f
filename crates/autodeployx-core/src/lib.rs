//! # autodeployx-core
//!
//! Event ingestion and bounded-history aggregation engine for the AutoDeployX
//! tracking service.
//!
//! This crate owns the only non-trivial state in the system:
//!
//! - **Counters**: running totals for builds seen, successes, failures, and
//!   currently-active runs
//! - **Bounded History**: most-recent-first ledgers for build records, log
//!   lines, and rollout history
//! - **Current Run**: the single in-flight (or most recent) pipeline run with
//!   its per-stage status list
//! - **Summaries**: read-side derivations (success rate, history stats) over
//!   counters and ledgers
//!
//! ## Crate Boundary
//!
//! `autodeployx-core` performs no I/O. Inbound events arrive as already
//! validated typed values; the HTTP layer (`autodeployx-api`) owns transport,
//! serialization framing, and the outbound build-server/registry clients.
//! All mutations go through [`Tracker`], one call per event, so a caller
//! holding exclusive access for the duration of a call gets each event
//! applied as a single atomic unit.
//!
//! ## Example
//!
//! ```rust
//! use autodeployx_core::model::BuildStatus;
//! use autodeployx_core::tracker::{StatusEvent, Tracker};
//!
//! let mut tracker = Tracker::new("autodeployx-cluster", "default");
//! let record = tracker.record_status(StatusEvent {
//!     status: BuildStatus::Running,
//!     build_number: Some(1),
//!     ..StatusEvent::default()
//! });
//! assert_eq!(record.build_number, 1);
//! assert_eq!(tracker.counters().active, 1);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod counters;
pub mod error;
pub mod history;
pub mod model;
pub mod observability;
pub mod summary;
pub mod tracker;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::counters::RunCounters;
    pub use crate::error::{Error, Result};
    pub use crate::history::History;
    pub use crate::model::{
        BuildRecord, BuildStatus, CurrentRun, LogLevel, LogLine, RolloutRecord, RolloutStatus,
        StageEntry, StageStatus,
    };
    pub use crate::tracker::{LifecycleEvent, StageEvent, StatusEvent, Tracker};
}

pub use counters::RunCounters;
pub use error::{Error, Result};
pub use history::History;
pub use model::{
    BuildRecord, BuildStatus, CurrentRun, LogLevel, LogLine, RolloutRecord, RolloutStatus,
    StageEntry, StageStatus,
};
pub use observability::{LogFormat, init_logging};
pub use summary::{HistoryStats, SuccessRate};
pub use tracker::{KubernetesState, LifecycleEvent, StageEvent, StatusEvent, Tracker};
