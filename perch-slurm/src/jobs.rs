//! Queue inspection and job submission
//!
//! The controller always filters on both RUNNING and PENDING. An earlier
//! generation of this tool checked RUNNING alone and could double-submit while
//! a previous cycle's job was still queued; that variant is a documented
//! defect, not an option.

use perch_core::domain::job::{JobId, JobRecord, JobState};
use perch_core::domain::submission::SubmissionRequest;
use perch_core::timefmt::{format_walltime, parse_slurm_duration, parse_submission_ack};

use crate::error::{ClientError, Result};

/// Pipe-delimited squeue columns: id, state, elapsed, time left, partition, qos.
const SQUEUE_FORMAT: &str = "%i|%T|%M|%L|%P|%q";

pub(crate) fn squeue_args(name: &str, states: &[JobState], user: Option<&str>) -> Vec<String> {
    let filter = states
        .iter()
        .map(JobState::filter_token)
        .collect::<Vec<_>>()
        .join(",");

    let mut args = vec![
        "--noheader".to_string(),
        format!("--format={SQUEUE_FORMAT}"),
        "--name".to_string(),
        name.to_string(),
        "--states".to_string(),
        filter,
    ];
    match user {
        Some(user) => {
            args.push("--user".to_string());
            args.push(user.to_string());
        }
        None => args.push("--me".to_string()),
    }
    args
}

/// Parse `squeue --noheader` output into job records.
///
/// A malformed line is an error: a half-readable queue is indistinguishable
/// from "a worker might already be running".
pub(crate) fn parse_squeue(output: &str) -> Result<Vec<JobRecord>> {
    let mut records = Vec::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != 6 {
            return Err(ClientError::parse(format!(
                "squeue line has {} fields, expected 6: {line:?}",
                fields.len()
            )));
        }

        let id = fields[0]
            .parse()
            .map(JobId)
            .map_err(|_| ClientError::parse(format!("bad job id {:?}", fields[0])))?;

        records.push(JobRecord {
            id,
            state: JobState::parse(fields[1]),
            elapsed: parse_slurm_duration(fields[2]),
            time_left: parse_slurm_duration(fields[3]),
            partition: fields[4].to_string(),
            qos: fields[5].to_string(),
        });
    }

    Ok(records)
}

pub(crate) fn sbatch_args(request: &SubmissionRequest) -> Vec<String> {
    let mut args = vec![
        "--job-name".to_string(),
        request.job_name.clone(),
        format!("--time={}", format_walltime(request.walltime)),
        format!("--qos={}", request.qos),
        format!("--output={}", request.output),
    ];
    if request.singleton {
        args.push("--dependency=singleton".to_string());
    }
    if let Some(minutes) = request.min_runtime_minutes {
        args.push(format!("--time-min={minutes}"));
    }
    args.push(request.script.display().to_string());
    args.extend(request.args.iter().cloned());
    args
}

/// Find the acknowledgment line in sbatch output and extract the job id.
pub(crate) fn parse_sbatch_ack(output: &str) -> Result<JobId> {
    output
        .lines()
        .rev()
        .find_map(parse_submission_ack)
        .ok_or_else(|| {
            ClientError::parse(format!("no submission acknowledgment in {output:?}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn squeue_args_filter_running_and_pending() {
        let args = squeue_args("doc-worker", &[JobState::Running, JobState::Pending], None);
        assert!(args.contains(&"--me".to_string()));
        assert!(args.contains(&"RUNNING,PENDING".to_string()));
        assert!(args.contains(&"doc-worker".to_string()));
    }

    #[test]
    fn squeue_args_with_user_override() {
        let args = squeue_args("doc-worker", &[JobState::Running], Some("svcbot"));
        assert!(args.contains(&"--user".to_string()));
        assert!(args.contains(&"svcbot".to_string()));
        assert!(!args.contains(&"--me".to_string()));
    }

    #[test]
    fn parses_empty_queue() {
        assert_eq!(parse_squeue("").unwrap(), Vec::new());
        assert_eq!(parse_squeue("\n  \n").unwrap(), Vec::new());
    }

    #[test]
    fn parses_running_and_pending_rows() {
        let output = "\
4821|RUNNING|02:10:33|21:04:27|workflow|workflow
4837|PENDING|0:00|23:15:00|workflow|workflow
";
        let records = parse_squeue(output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, JobId(4821));
        assert_eq!(records[0].state, JobState::Running);
        assert_eq!(records[0].elapsed.unwrap().as_secs(), 2 * 3600 + 10 * 60 + 33);
        assert_eq!(records[1].state, JobState::Pending);
        assert_eq!(records[1].elapsed.unwrap(), Duration::ZERO);
        assert_eq!(records[1].qos, "workflow");
    }

    #[test]
    fn malformed_row_is_an_error() {
        let err = parse_squeue("4821|RUNNING|02:10:33").unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));

        let err = parse_squeue("notanid|RUNNING|0:00|1:00|p|q").unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    fn request(min_runtime_minutes: Option<i64>) -> SubmissionRequest {
        SubmissionRequest {
            job_name: "doc-worker".to_string(),
            walltime: Duration::from_secs(23 * 3600 + 15 * 60),
            qos: "workflow".to_string(),
            output: "slurm-%x-%j.out".to_string(),
            singleton: true,
            min_runtime_minutes,
            script: PathBuf::from("/opt/worker/serve.sh"),
            args: vec!["--port".to_string(), "8080".to_string()],
        }
    }

    #[test]
    fn sbatch_args_carry_singleton_and_walltime() {
        let args = sbatch_args(&request(None));
        assert!(args.contains(&"--dependency=singleton".to_string()));
        assert!(args.contains(&"--time=23:15:00".to_string()));
        assert!(args.contains(&"--qos=workflow".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--time-min")));
        // Script and its arguments come last, in order.
        assert_eq!(
            &args[args.len() - 3..],
            &["/opt/worker/serve.sh", "--port", "8080"]
        );
    }

    #[test]
    fn sbatch_args_include_time_min_when_present() {
        let args = sbatch_args(&request(Some(70)));
        assert!(args.contains(&"--time-min=70".to_string()));
    }

    #[test]
    fn parses_ack_among_informational_lines() {
        let output = "sbatch: lua plugin loaded\nSubmitted batch job 4911\n";
        assert_eq!(parse_sbatch_ack(output).unwrap(), JobId(4911));
    }

    #[test]
    fn missing_ack_is_an_error() {
        let err = parse_sbatch_ack("sbatch: error: Batch job submission failed").unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }
}
