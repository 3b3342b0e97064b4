//! Keeper configuration
//!
//! Built once by the CLI and passed into the controller by value; nothing here
//! is ambient process state.

use chrono::NaiveTime;
use std::time::Duration;

/// Keep-alive configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Logical job name every worker submission shares. The controller only
    /// ever reasons about jobs carrying this name.
    pub job_name: String,

    /// QoS the worker is submitted under.
    pub qos: String,

    /// Minutes of guaranteed runtime required before an upcoming maintenance
    /// reservation for the scheduler to be allowed to start the job.
    pub safety_buffer_minutes: i64,

    /// UTC time of day, on the calendar day after the invocation, when the
    /// submitted session ends.
    pub cutoff: NaiveTime,

    /// `sbatch --output` destination (%x and %j expand to job name and id).
    pub output: String,

    /// Substrings matched against reservation names; empty matches every
    /// maintenance reservation.
    pub reservation_classes: Vec<String>,

    /// Query jobs for this user instead of the invoking identity.
    pub user: Option<String>,

    /// Per scheduler-command timeout.
    pub command_timeout: Duration,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.job_name.is_empty() {
            anyhow::bail!("job name cannot be empty");
        }

        if self.job_name.chars().any(char::is_whitespace) {
            anyhow::bail!("job name cannot contain whitespace");
        }

        if self.safety_buffer_minutes < 0 {
            anyhow::bail!("safety buffer cannot be negative");
        }

        if self.command_timeout.is_zero() {
            anyhow::bail!("command timeout must be greater than 0");
        }

        if self.output.is_empty() {
            anyhow::bail!("output path cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            job_name: "perch-worker".to_string(),
            qos: "workflow".to_string(),
            safety_buffer_minutes: 60,
            cutoff: NaiveTime::from_hms_opt(1, 15, 0).unwrap_or_default(),
            output: "slurm-%x-%j.out".to_string(),
            reservation_classes: vec!["login".to_string(), "workflow".to_string()],
            user: None,
            command_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.safety_buffer_minutes, 60);
        assert_eq!(config.command_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.job_name = String::new();
        assert!(config.validate().is_err());

        config.job_name = "doc worker".to_string();
        assert!(config.validate().is_err());

        config.job_name = "doc-worker".to_string();
        assert!(config.validate().is_ok());

        config.safety_buffer_minutes = -5;
        assert!(config.validate().is_err());

        config.safety_buffer_minutes = 60;
        config.command_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
