//! Perch SLURM Client
//!
//! A thin, bounded-latency client over the SLURM command-line control plane
//! (`squeue`, `scontrol`, `sbatch`).
//!
//! The controller depends on the [`Scheduler`] trait rather than on this client
//! directly, so tests can drive it with in-memory fakes.
//!
//! # Example
//!
//! ```no_run
//! use perch_slurm::{Scheduler, SlurmClient};
//! use perch_core::domain::job::JobState;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), perch_slurm::ClientError> {
//!     let client = SlurmClient::new(Duration::from_secs(30));
//!     let jobs = client
//!         .list_jobs("doc-worker", &[JobState::Running, JobState::Pending])
//!         .await?;
//!     println!("{} job(s) queued", jobs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod reservations;

pub use error::{ClientError, Result};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use perch_core::clock::{Clock, SystemClock};
use perch_core::domain::job::{JobId, JobRecord, JobState};
use perch_core::domain::submission::SubmissionRequest;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The scheduler surface the keep-alive controller consumes.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// List jobs with the given logical name, owned by the invoking identity,
    /// filtered to `states`. An empty result is the sole trigger for a
    /// submission; any error must abort the cycle.
    async fn list_jobs(&self, name: &str, states: &[JobState]) -> Result<Vec<JobRecord>>;

    /// Earliest upcoming maintenance reservation start matching `classes`, or
    /// `None` when the scheduler advertises no such reservation. A query
    /// failure is an error, never a silent `None`.
    async fn next_maintenance(&self, classes: &[String]) -> Result<Option<DateTime<Utc>>>;

    /// Enqueue the worker job and return the scheduler-assigned id.
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobId>;
}

/// Client for the SLURM command-line control plane.
#[derive(Clone)]
pub struct SlurmClient {
    /// Per-command deadline; a hung control plane is treated like a failed query.
    timeout: Duration,
    /// Query jobs for this user instead of the invoking identity.
    user: Option<String>,
    /// Time source for the strictly-in-the-future maintenance cut.
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SlurmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlurmClient")
            .field("timeout", &self.timeout)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl SlurmClient {
    /// Create a client with the given per-command timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            user: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Query jobs for `user` instead of the invoking identity.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Replace the time source, e.g. with a fixed clock in tests.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub(crate) fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Cut parsed scontrol output down to the earliest maintenance start that
    /// is still ahead of this client's clock.
    pub(crate) fn maintenance_from_output(
        &self,
        output: &str,
        classes: &[String],
    ) -> Result<Option<DateTime<Utc>>> {
        let parsed = reservations::parse_reservations(output)?;
        Ok(reservations::earliest_maintenance(
            &parsed,
            classes,
            self.clock.now(),
        ))
    }

    /// Run a scheduler command to completion under the client timeout and
    /// return its stdout.
    pub(crate) async fn run(&self, program: &'static str, args: &[String]) -> Result<String> {
        debug!(program, ?args, "running scheduler command");

        let output = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(program).args(args).output(),
        )
        .await
        .map_err(|_| ClientError::Timeout {
            program,
            timeout: self.timeout,
        })?
        .map_err(|source| ClientError::Spawn { program, source })?;

        if !output.status.success() {
            return Err(ClientError::CommandFailed {
                program,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Scheduler for SlurmClient {
    async fn list_jobs(&self, name: &str, states: &[JobState]) -> Result<Vec<JobRecord>> {
        let args = jobs::squeue_args(name, states, self.user());
        let output = self.run("squeue", &args).await?;
        jobs::parse_squeue(&output)
    }

    async fn next_maintenance(&self, classes: &[String]) -> Result<Option<DateTime<Utc>>> {
        let output = self.run("scontrol", &reservations::scontrol_args()).await?;
        self.maintenance_from_output(&output, classes)
    }

    async fn submit(&self, request: &SubmissionRequest) -> Result<JobId> {
        let args = jobs::sbatch_args(request);
        let output = self.run("sbatch", &args).await?;
        jobs::parse_sbatch_ack(&output)
    }
}
