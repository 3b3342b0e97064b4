//! Keep-alive cycle
//!
//! One invocation runs the whole decision procedure to completion: inspect the
//! queue, look up the next maintenance window, size the run, submit. No state
//! survives between invocations; the periodic external trigger is the retry
//! mechanism, so every failure simply ends the cycle.

use anyhow::{Context, Result};
use perch_core::clock::Clock;
use perch_core::domain::job::{JobId, JobRecord, JobState};
use perch_core::domain::submission::SubmissionRequest;
use perch_core::timefmt::format_walltime;
use perch_slurm::Scheduler;
use std::path::Path;
use tracing::{info, warn};

use crate::budget::RunBudget;
use crate::config::Config;

/// Outcome of a single keep-alive cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A worker is already running or pending; nothing to do.
    AlreadyQueued(Vec<JobRecord>),
    /// A replacement worker was submitted.
    Submitted {
        job_id: JobId,
        request: SubmissionRequest,
    },
    /// Dry run: what would have been submitted.
    WouldSubmit(SubmissionRequest),
}

/// The keep-alive controller.
pub struct Keeper<S, C> {
    scheduler: S,
    clock: C,
    config: Config,
}

impl<S: Scheduler, C: Clock> Keeper<S, C> {
    /// Creates a new keeper
    pub fn new(scheduler: S, clock: C, config: Config) -> Self {
        Self {
            scheduler,
            clock,
            config,
        }
    }

    /// Run one keep-alive cycle for the worker launched by `script`.
    ///
    /// The up-front queue check is a fast path; the submission itself carries
    /// `--dependency=singleton`, so a racing cycle that also submits ends up
    /// held by the scheduler instead of running concurrently.
    pub async fn ensure(
        &self,
        script: &Path,
        args: &[String],
        dry_run: bool,
    ) -> Result<CycleOutcome> {
        if script.as_os_str().is_empty() {
            anyhow::bail!("worker script path cannot be empty");
        }

        let jobs = self
            .scheduler
            .list_jobs(
                &self.config.job_name,
                &[JobState::Running, JobState::Pending],
            )
            .await
            .context("queue inspection failed")?;

        if !jobs.is_empty() {
            info!(
                job_name = %self.config.job_name,
                count = jobs.len(),
                "worker already running or pending; nothing to do"
            );
            return Ok(CycleOutcome::AlreadyQueued(jobs));
        }

        let maintenance = self
            .scheduler
            .next_maintenance(&self.config.reservation_classes)
            .await
            .context("maintenance reservation lookup failed")?;

        match maintenance {
            Some(start) => info!(%start, "next maintenance window"),
            None => info!("no upcoming maintenance advertised"),
        }

        // Fresh timestamp after both queries, so walltime and buffer math
        // share one "now" and cannot drift apart.
        let now = self.clock.now();
        let budget = RunBudget::compute(now, maintenance, &self.config);

        let request = SubmissionRequest {
            job_name: self.config.job_name.clone(),
            walltime: budget.walltime,
            qos: self.config.qos.clone(),
            output: self.config.output.clone(),
            singleton: true,
            min_runtime_minutes: budget.min_runtime_minutes,
            script: script.to_path_buf(),
            args: args.to_vec(),
        };

        info!(
            walltime = %format_walltime(request.walltime),
            time_min = ?request.min_runtime_minutes,
            "no worker queued; submitting replacement"
        );

        if dry_run {
            warn!("dry run: submission skipped");
            return Ok(CycleOutcome::WouldSubmit(request));
        }

        let job_id = self
            .scheduler
            .submit(&request)
            .await
            .context("worker submission rejected")?;

        info!(%job_id, "submitted worker job");
        Ok(CycleOutcome::Submitted { job_id, request })
    }
}
