//! Run budget computation
//!
//! Sizes one submission: a walltime that always runs to the next-day cutoff,
//! and a start-eligibility constraint derived from the next maintenance
//! window when one applies.

use chrono::{DateTime, Days, NaiveTime, Utc};
use std::time::Duration;

use crate::config::Config;

/// Derived sizing for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBudget {
    /// Wall-clock limit, cutoff minus now.
    pub walltime: Duration,
    /// `--time-min` minutes, when a maintenance window constrains the start.
    pub min_runtime_minutes: Option<i64>,
}

impl RunBudget {
    /// Compute the budget for a submission decided at `now`.
    ///
    /// The walltime is independent of maintenance: the window only constrains
    /// when the scheduler may start the job, never how long it runs. A
    /// buffered window of zero or less drops the constraint entirely rather
    /// than emitting an unrunnable request; maintenance may then truncate the
    /// run, which is the accepted trade-off.
    pub fn compute(
        now: DateTime<Utc>,
        maintenance: Option<DateTime<Utc>>,
        config: &Config,
    ) -> Self {
        let cutoff = next_day_cutoff(now, config.cutoff);
        let walltime = (cutoff - now).to_std().unwrap_or(Duration::ZERO);

        let min_runtime_minutes = maintenance.and_then(|start| {
            let buffered = (start - now).num_minutes() - config.safety_buffer_minutes;
            (buffered > 0).then_some(buffered)
        });

        Self {
            walltime,
            min_runtime_minutes,
        }
    }
}

/// The configured time of day on the calendar day after `now`.
fn next_day_cutoff(now: DateTime<Utc>, cutoff: NaiveTime) -> DateTime<Utc> {
    let date = now.date_naive() + Days::new(1);
    date.and_time(cutoff).and_utc()
}
