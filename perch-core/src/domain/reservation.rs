//! Scheduler reservation types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reservation as parsed from `scontrol show reservation -o`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Raw flag tokens, e.g. `MAINT`, `SPEC_NODES`.
    pub flags: Vec<String>,
}

impl Reservation {
    /// Whether this reservation marks a maintenance outage.
    pub fn is_maintenance(&self) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case("MAINT"))
    }

    /// Whether the reservation name matches any of the given class substrings.
    /// An empty class list matches everything.
    pub fn matches_class(&self, classes: &[String]) -> bool {
        if classes.is_empty() {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        classes
            .iter()
            .any(|c| name.contains(&c.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reservation(name: &str, flags: &[&str]) -> Reservation {
        Reservation {
            name: name.to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 9, 3, 6, 0, 0).unwrap(),
            flags: flags.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn maintenance_flag_detection() {
        assert!(reservation("login_maint", &["MAINT", "SPEC_NODES"]).is_maintenance());
        assert!(!reservation("gpu_burst", &["SPEC_NODES"]).is_maintenance());
        assert!(!reservation("unflagged", &[]).is_maintenance());
    }

    #[test]
    fn class_matching_is_substring_and_case_insensitive() {
        let res = reservation("Workflow_Sept_Maint", &["MAINT"]);
        assert!(res.matches_class(&["workflow".to_string()]));
        assert!(res.matches_class(&["login".to_string(), "workflow".to_string()]));
        assert!(!res.matches_class(&["login".to_string()]));
    }

    #[test]
    fn empty_class_list_matches_all() {
        assert!(reservation("anything", &["MAINT"]).matches_class(&[]));
    }
}
