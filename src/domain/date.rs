//! End-date parsing and the minimum-horizon rule.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

/// Date-time layouts accepted in addition to RFC 3339. Interpreted as UTC.
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Date-only layouts. A bare date means the end of that day in UTC.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Extra time added past the minimum horizon when an end date is rewritten.
pub const DEFAULT_EXTENSION_DAYS: i64 = 30;

/// Human-readable list of accepted inputs, used in rejection messages.
pub const FORMAT_HINT: &str = "Use a duration like \"3 days\", \"2 weeks\" or \"6 months\", \
or a date like 2026-03-31, 03/31/2026 or March 31, 2026.";

/// Parse an absolute date or date-time in any accepted format.
#[must_use]
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .map(|date| Utc.from_utc_datetime(&date.and_time(end_of_day)))
}

fn relative_pattern() -> &'static Regex {
    static RELATIVE: OnceLock<Regex> = OnceLock::new();
    RELATIVE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:in\s+)?(\d{1,4})\s*(day|days|week|weeks|month|months)(?:\s+from\s+now)?\s*$")
            .expect("static regex pattern")
    })
}

/// Parse a relative duration phrase such as `"3 days"` or `"in 2 weeks"`.
/// A month counts as 30 days. Zero-length durations are rejected.
#[must_use]
pub fn parse_relative(input: &str) -> Option<Duration> {
    let caps = relative_pattern().captures(input)?;
    let n: i64 = caps.get(1)?.as_str().parse().ok()?;
    if n == 0 {
        return None;
    }
    let unit = caps.get(2)?.as_str().to_ascii_lowercase();
    let days = if unit.starts_with("day") {
        n
    } else if unit.starts_with("week") {
        n * 7
    } else {
        n * 30
    };
    Some(Duration::days(days))
}

/// Earliest acceptable end date for something created at `now`.
#[must_use]
pub fn earliest_end(now: DateTime<Utc>, min_horizon: Duration) -> DateTime<Utc> {
    now + min_horizon
}

/// Replacement end date for absent or invalid values.
#[must_use]
pub fn default_end(now: DateTime<Utc>, min_horizon: Duration) -> DateTime<Utc> {
    now + min_horizon + Duration::days(DEFAULT_EXTENSION_DAYS)
}

/// Outcome of validating a candidate end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEndDate {
    pub end_date: DateTime<Utc>,
    /// True when the candidate was absent, unparsable or too soon.
    pub rewritten: bool,
}

/// Accept `raw` when it parses and lies strictly after `now + min_horizon`,
/// otherwise substitute [`default_end`].
#[must_use]
pub fn resolve_end_date(
    raw: Option<&str>,
    now: DateTime<Utc>,
    min_horizon: Duration,
) -> ResolvedEndDate {
    match raw.and_then(parse_datetime) {
        Some(end) if end > earliest_end(now, min_horizon) => ResolvedEndDate {
            end_date: end,
            rewritten: false,
        },
        _ => ResolvedEndDate {
            end_date: default_end(now, min_horizon),
            rewritten: true,
        },
    }
}
