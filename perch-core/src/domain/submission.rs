//! Submission request types

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// The materialized launch action handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRequest {
    /// Logical job name every worker submission shares.
    pub job_name: String,
    /// Requested wall-clock duration, always running to the fixed daily cutoff.
    pub walltime: Duration,
    /// QoS the job is submitted under.
    pub qos: String,
    /// `sbatch --output` destination.
    pub output: String,
    /// Serialize this submission against any queued job of the same name.
    /// The scheduler enforces the mutual exclusion; the controller's queue
    /// check is only a fast path.
    pub singleton: bool,
    /// `--time-min`: the scheduler may only start the job if at least this many
    /// minutes of guaranteed runtime remain. Constrains when the job starts,
    /// not how long it may run.
    pub min_runtime_minutes: Option<i64>,
    /// Worker launch script.
    pub script: PathBuf,
    /// Arguments passed through to the script.
    pub args: Vec<String>,
}
