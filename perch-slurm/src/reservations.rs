//! Maintenance reservation lookup
//!
//! `scontrol show reservation -o` prints one `key=value` line per reservation.
//! A scheduler that genuinely advertises no reservations is a legitimate
//! "no upcoming maintenance"; anything unreadable is an error, never a silent
//! `None` — a masked window would size a full-length job straight into an
//! outage.

use chrono::{DateTime, NaiveDateTime, Utc};
use perch_core::domain::reservation::Reservation;
use std::collections::HashMap;

use crate::error::{ClientError, Result};

/// Sentinel scontrol prints instead of reservation records.
const NO_RESERVATIONS: &str = "No reservations in the system";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn scontrol_args() -> Vec<String> {
    ["show", "reservation", "-o"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Parse `scontrol show reservation -o` output.
///
/// Each non-empty line is a series of `key=value` tokens; only the first `=`
/// in a token delimits the key, so values like `TRES=cpu=4` survive.
pub(crate) fn parse_reservations(output: &str) -> Result<Vec<Reservation>> {
    let trimmed = output.trim();
    if trimmed.is_empty() || trimmed == NO_RESERVATIONS {
        return Ok(Vec::new());
    }

    let mut reservations = Vec::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut fields = HashMap::<&str, &str>::new();
        for token in line.split_whitespace() {
            if let Some(eq) = token.find('=') {
                let (key, value) = token.split_at(eq);
                fields.insert(key, &value[1..]);
            }
        }

        let name = fields
            .remove("ReservationName")
            .ok_or_else(|| ClientError::parse(format!("reservation line missing ReservationName: {line:?}")))?
            .to_string();

        let start_raw = fields.get("StartTime").ok_or_else(|| {
            ClientError::parse(format!("reservation {name:?} missing StartTime"))
        })?;
        let start_time = parse_timestamp(start_raw).ok_or_else(|| {
            ClientError::parse(format!("reservation {name:?} has bad StartTime {start_raw:?}"))
        })?;

        let flags = fields
            .get("Flags")
            .map(|raw| raw.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        reservations.push(Reservation {
            name,
            start_time,
            flags,
        });
    }

    Ok(reservations)
}

/// Earliest future maintenance start among reservations matching `classes`.
pub(crate) fn earliest_maintenance(
    reservations: &[Reservation],
    classes: &[String],
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    reservations
        .iter()
        .filter(|r| r.is_maintenance() && r.matches_class(classes) && r.start_time > now)
        .map(|r| r.start_time)
        .min()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
