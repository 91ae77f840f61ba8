//! Timestamp parsing and human-readable labels.
//!
//! Backend timestamps are RFC 3339, or zone-less `YYYY-MM-DDTHH:MM:SS[.fff]`
//! which is read as UTC. Labels are Korean, matching the rest of the product.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

/// Parse any timestamp shape the backend emits.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    let local = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, local) {
        return Some(dt.assume_utc());
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// `YYYY-MM-DD` in UTC.
#[must_use]
pub fn iso_date(dt: OffsetDateTime) -> String {
    dt.to_offset(time::UtcOffset::UTC).date().to_string()
}

/// Feed-style relative label for `created_at` as seen at `now`.
///
/// Anything under an hour reads "1시간 전"; under a day, whole hours; under
/// five days, whole days. Older or future timestamps show the date, and
/// unparseable input shows `-`.
#[must_use]
pub fn format_relative_date(created_at: &str, now: OffsetDateTime) -> String {
    let Some(target) = parse_timestamp(created_at) else {
        return "-".to_owned();
    };
    let elapsed = now - target;
    if elapsed.is_negative() {
        return iso_date(target);
    }
    if elapsed < Duration::HOUR {
        return "1시간 전".to_owned();
    }
    if elapsed < Duration::DAY {
        return format!("{}시간 전", elapsed.whole_hours().max(1));
    }
    if elapsed < Duration::days(5) {
        return format!("{}일 전", elapsed.whole_days().max(1));
    }
    iso_date(target)
}

/// [`format_relative_date`] against the current time.
#[must_use]
pub fn format_relative_date_now(created_at: &str) -> String {
    format_relative_date(created_at, OffsetDateTime::now_utc())
}

/// Badge unlock date, or `--` when unknown.
#[must_use]
pub fn format_unlocked_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp).map_or_else(|| "--".to_owned(), iso_date)
}

#[cfg(test)]
#[path = "date_test.rs"]
mod tests;
