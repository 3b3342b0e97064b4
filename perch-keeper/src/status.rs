//! Queue and maintenance status display

use anyhow::{Context, Result};
use colored::*;
use perch_core::domain::job::{JobRecord, JobState};
use perch_core::timefmt::format_walltime;
use perch_slurm::Scheduler;

use crate::config::Config;

/// Show matching queue entries and the next maintenance window.
pub async fn show_status(scheduler: &impl Scheduler, config: &Config, json: bool) -> Result<()> {
    let jobs = scheduler
        .list_jobs(
            &config.job_name,
            &[JobState::Running, JobState::Pending],
        )
        .await
        .context("queue inspection failed")?;

    let maintenance = scheduler
        .next_maintenance(&config.reservation_classes)
        .await
        .context("maintenance reservation lookup failed")?;

    if json {
        let doc = serde_json::json!({
            "job_name": config.job_name,
            "jobs": jobs,
            "next_maintenance": maintenance,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!(
            "{}",
            format!("No {} job running or pending.", config.job_name).yellow()
        );
    } else {
        println!(
            "{}",
            format!("Found {} {} job(s):", jobs.len(), config.job_name).bold()
        );
        println!();
        for job in &jobs {
            print_job_summary(job);
        }
    }

    match maintenance {
        Some(start) => println!(
            "Next maintenance: {}",
            start.format("%Y-%m-%d %H:%M:%S").to_string().cyan()
        ),
        None => println!("{}", "No upcoming maintenance advertised.".dimmed()),
    }

    Ok(())
}

/// Print a job summary
fn print_job_summary(job: &JobRecord) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    State:     {}", colorize_state(&job.state));
    println!("    Partition: {}", job.partition.dimmed());
    println!("    QoS:       {}", job.qos.dimmed());
    if let Some(elapsed) = job.elapsed {
        println!("    Elapsed:   {}", format_walltime(elapsed).dimmed());
    }
    if let Some(left) = job.time_left {
        println!("    Time left: {}", format_walltime(left).dimmed());
    }
    println!();
}

/// Colorize job state for display
fn colorize_state(state: &JobState) -> colored::ColoredString {
    match state {
        JobState::Running => "RUNNING".cyan(),
        JobState::Pending => "PENDING".yellow(),
        JobState::Other(s) => s.as_str().normal(),
    }
}
