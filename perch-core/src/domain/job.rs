//! Queue entry types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler-assigned numeric job id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a queued job, as reported by `squeue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Running,
    Pending,
    /// Any state outside the controller's filter (e.g. COMPLETING).
    Other(String),
}

impl JobState {
    /// Parse a SLURM state token. Annotations like `RUNNING+` or
    /// `PENDING(Dependency)` collapse to the base state.
    pub fn parse(token: &str) -> Self {
        let base = token
            .split(['+', ':', '('])
            .next()
            .unwrap_or(token)
            .trim()
            .to_ascii_uppercase();
        match base.as_str() {
            "RUNNING" => JobState::Running,
            "PENDING" => JobState::Pending,
            _ => JobState::Other(base),
        }
    }

    /// Token used in a `squeue --states` filter.
    pub fn filter_token(&self) -> &str {
        match self {
            JobState::Running => "RUNNING",
            JobState::Pending => "PENDING",
            JobState::Other(s) => s.as_str(),
        }
    }
}

/// One row of the filtered queue listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub state: JobState,
    /// Time the job has been running; `None` while pending.
    pub elapsed: Option<Duration>,
    /// Remaining walltime; `None` when the scheduler reports a marker.
    pub time_left: Option<Duration>,
    pub partition: String,
    pub qos: String,
}
