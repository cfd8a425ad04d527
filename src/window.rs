//! Release date window derivation.

use crate::domain::DateWindow;
use crate::error::{ReconcileError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Date layout embedded in release identifiers, e.g. `Mobilitas 2025.04.18`.
pub const RELEASE_DATE_FORMAT: &str = "%Y.%m.%d";

/// Derive the release window using the current UTC time as the fallback release date.
pub fn derive_window(
    identifier: Option<&str>,
    prefix: &str,
    freeze_offset_days: u32,
    cutoff_offset_days: u32,
) -> Result<DateWindow> {
    derive_window_at(identifier, prefix, freeze_offset_days, cutoff_offset_days, Utc::now())
}

/// Same as [`derive_window`] with an explicit clock, used when no identifier is given.
pub fn derive_window_at(
    identifier: Option<&str>,
    prefix: &str,
    freeze_offset_days: u32,
    cutoff_offset_days: u32,
    now: DateTime<Utc>,
) -> Result<DateWindow> {
    let release_date = match identifier.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => parse_release_date(id, prefix)?.and_time(NaiveTime::MIN),
        None => now.naive_utc(),
    };
    let code_freeze_date = days_before(release_date, freeze_offset_days, "code freeze")?;
    let cutoff_date = days_before(code_freeze_date, cutoff_offset_days, "cutoff")?;

    Ok(DateWindow { release_date, code_freeze_date, cutoff_date })
}

fn days_before(moment: NaiveDateTime, days: u32, boundary: &str) -> Result<NaiveDateTime> {
    Duration::try_days(i64::from(days))
        .and_then(|offset| moment.checked_sub_signed(offset))
        .ok_or_else(|| {
            ReconcileError::Configuration(format!(
                "{boundary} offset of {days} days from {moment} is out of range"
            ))
        })
}

/// Strip `prefix` (when present) and parse the remainder as `YYYY.MM.DD`.
pub fn parse_release_date(identifier: &str, prefix: &str) -> Result<NaiveDate> {
    let trimmed = identifier.trim();
    let stripped = if prefix.is_empty() {
        trimmed
    } else {
        trimmed.strip_prefix(prefix).unwrap_or(trimmed)
    };
    NaiveDate::parse_from_str(stripped.trim(), RELEASE_DATE_FORMAT).map_err(|e| {
        ReconcileError::Parse { identifier: identifier.to_string(), reason: e.to_string() }
    })
}

/// Convert an epoch-millisecond author timestamp into a UTC calendar moment.
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn commit_moment(author_timestamp_millis: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp_millis(author_timestamp_millis).map(|dt| dt.naive_utc())
}
