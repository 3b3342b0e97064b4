//! SLURM wire-format time handling

use crate::domain::job::JobId;
use std::time::Duration;

const ACK_PREFIX: &str = "Submitted batch job ";

/// Parse a SLURM duration: `D-HH:MM:SS`, `HH:MM:SS`, or `MM:SS`.
///
/// Markers such as `UNLIMITED`, `NONE`, `N/A`, `INVALID`, and `NOT_SET`
/// become `None`.
pub fn parse_slurm_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for marker in ["unlimited", "none", "n/a", "invalid", "not_set"] {
        if s.eq_ignore_ascii_case(marker) {
            return None;
        }
    }

    // Optional days prefix: "D-HH:MM:SS".
    let (days, rest) = match s.find('-') {
        Some(dash) => {
            let (d, rest) = s.split_at(dash);
            (d.parse::<u64>().ok()?, &rest[1..])
        }
        None => (0, s),
    };

    let parts: Vec<&str> = rest.split(':').collect();
    let (h, m, sec): (u64, u64, u64) = match parts.as_slice() {
        [h, m, sec] => (h.parse().ok()?, m.parse().ok()?, sec.parse().ok()?),
        [m, sec] if days == 0 => (0, m.parse().ok()?, sec.parse().ok()?),
        _ => return None,
    };

    // Fields can be individually parseable yet absurdly large; overflow is
    // malformed input, not a panic.
    let secs = days
        .checked_mul(86_400)
        .and_then(|total| total.checked_add(h.checked_mul(3600)?))
        .and_then(|total| total.checked_add(m.checked_mul(60)?))
        .and_then(|total| total.checked_add(sec))?;

    Some(Duration::from_secs(secs))
}

/// Format a duration as an sbatch walltime, `HH:MM:SS`. Hours may exceed 24.
pub fn format_walltime(d: Duration) -> String {
    let total = d.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Parse the sbatch acknowledgment line, `Submitted batch job N`.
pub fn parse_submission_ack(line: &str) -> Option<JobId> {
    line.trim()
        .strip_prefix(ACK_PREFIX)?
        .trim()
        .parse()
        .ok()
        .map(JobId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_with_days() {
        let d = parse_slurm_duration("3-04:05:06").unwrap();
        assert_eq!(d.as_secs(), 3 * 86_400 + 4 * 3600 + 5 * 60 + 6);
    }

    #[test]
    fn parses_hms_and_ms_forms() {
        assert_eq!(parse_slurm_duration("04:05:06").unwrap().as_secs(), 14_706);
        assert_eq!(parse_slurm_duration("15:30").unwrap().as_secs(), 930);
    }

    #[test]
    fn markers_become_none() {
        for marker in ["UNLIMITED", "NONE", "N/A", "INVALID", "NOT_SET", ""] {
            assert_eq!(parse_slurm_duration(marker), None, "{marker:?}");
        }
    }

    #[test]
    fn rejects_malformed_durations() {
        assert_eq!(parse_slurm_duration("12"), None);
        assert_eq!(parse_slurm_duration("1:2:3:4"), None);
        assert_eq!(parse_slurm_duration("aa:bb:cc"), None);
        assert_eq!(parse_slurm_duration("1-02:03"), None);
    }

    #[test]
    fn oversized_fields_are_malformed_not_wrapped() {
        // Each field parses as u64 on its own but the total overflows.
        assert_eq!(parse_slurm_duration("300000000000000000-00:00:01"), None);
        assert_eq!(
            parse_slurm_duration("18446744073709551615:00:00"),
            None
        );
        assert_eq!(parse_slurm_duration("18446744073709551615:00"), None);
    }

    #[test]
    fn formats_walltime_beyond_a_day() {
        assert_eq!(
            format_walltime(Duration::from_secs(23 * 3600 + 15 * 60)),
            "23:15:00"
        );
        assert_eq!(format_walltime(Duration::from_secs(30 * 3600)), "30:00:00");
        assert_eq!(format_walltime(Duration::ZERO), "00:00:00");
    }

    #[test]
    fn parses_submission_ack() {
        assert_eq!(
            parse_submission_ack("Submitted batch job 4821\n"),
            Some(JobId(4821))
        );
        assert_eq!(parse_submission_ack("Submitted batch job abc"), None);
        assert_eq!(parse_submission_ack("sbatch: error: invalid qos"), None);
    }
}
