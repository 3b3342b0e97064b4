//! perch
//!
//! Keeps a singleton worker job alive on a SLURM cluster. Invoked
//! periodically (e.g. from scron): each run inspects the queue, sizes a
//! replacement against the next maintenance reservation, and submits it with
//! `--dependency=singleton`. The controller itself runs to completion every
//! time and keeps no state between invocations.

mod budget;
mod config;
mod keeper;
mod status;

use anyhow::Result;
use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use colored::*;
use perch_core::clock::SystemClock;
use perch_core::timefmt::format_walltime;
use perch_slurm::SlurmClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::keeper::{CycleOutcome, Keeper};

#[derive(Parser)]
#[command(name = "perch")]
#[command(about = "Keep a singleton worker job alive on a SLURM cluster", long_about = None)]
struct Cli {
    /// Logical job name shared by every worker submission
    #[arg(long, env = "PERCH_JOB_NAME", default_value = "perch-worker")]
    job_name: String,

    /// QoS to submit the worker under
    #[arg(long, env = "PERCH_QOS", default_value = "workflow")]
    qos: String,

    /// Minutes of guaranteed runtime required before a maintenance window
    #[arg(long, env = "PERCH_SAFETY_BUFFER_MINUTES", default_value_t = 60)]
    safety_buffer_minutes: i64,

    /// UTC time of day (HH:MM) on the following day when the session ends
    #[arg(long, env = "PERCH_CUTOFF", default_value = "01:15", value_parser = parse_cutoff)]
    cutoff: NaiveTime,

    /// sbatch --output destination (%x and %j expand to job name and id)
    #[arg(long, env = "PERCH_OUTPUT", default_value = "slurm-%x-%j.out")]
    output: String,

    /// Reservation name substrings that count as maintenance for this worker
    #[arg(
        long = "reservation-class",
        env = "PERCH_RESERVATION_CLASSES",
        value_delimiter = ',',
        default_values_t = [String::from("login"), String::from("workflow")]
    )]
    reservation_classes: Vec<String>,

    /// Query jobs for this user instead of the invoking identity
    #[arg(long, env = "PERCH_USER")]
    user: Option<String>,

    /// Per scheduler-command timeout in seconds
    #[arg(long, env = "PERCH_COMMAND_TIMEOUT_SECS", default_value_t = 30)]
    command_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one keep-alive cycle: submit a worker if none is running or pending
    Ensure {
        /// Worker launch script handed to sbatch
        script: PathBuf,

        /// Arguments passed through to the script
        #[arg(last = true)]
        args: Vec<String>,

        /// Decide and log, but do not submit
        #[arg(long)]
        dry_run: bool,
    },
    /// Show matching queue entries and the next maintenance window
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_cutoff(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|e| format!("invalid cutoff time {raw:?}: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "perch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        job_name: cli.job_name,
        qos: cli.qos,
        safety_buffer_minutes: cli.safety_buffer_minutes,
        cutoff: cli.cutoff,
        output: cli.output,
        reservation_classes: cli.reservation_classes,
        user: cli.user,
        command_timeout: Duration::from_secs(cli.command_timeout_secs),
    };
    config.validate()?;

    let mut client = SlurmClient::new(config.command_timeout);
    if let Some(user) = &config.user {
        client = client.with_user(user.clone());
    }

    match cli.command {
        Commands::Ensure {
            script,
            args,
            dry_run,
        } => {
            let keeper = Keeper::new(client, SystemClock, config);
            let outcome = keeper.ensure(&script, &args, dry_run).await?;
            report_outcome(outcome)
        }
        Commands::Status { json } => status::show_status(&client, &config, json).await,
    }
}

fn report_outcome(outcome: CycleOutcome) -> Result<()> {
    match outcome {
        CycleOutcome::AlreadyQueued(jobs) => {
            println!(
                "{}",
                format!("Worker already queued ({} job(s)); nothing to do.", jobs.len()).green()
            );
        }
        CycleOutcome::Submitted { job_id, request } => {
            println!(
                "{}",
                format!(
                    "Submitted job {} with a {} walltime.",
                    job_id,
                    format_walltime(request.walltime)
                )
                .green()
            );
        }
        CycleOutcome::WouldSubmit(request) => {
            println!("{}", "Dry run; would submit:".yellow());
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
    }
    Ok(())
}
