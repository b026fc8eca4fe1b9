//! Granular date resolution and DataCite range rendering.
//!
//! Dates arrive from uploads and legacy rows at mixed precision: a bare
//! year, a year-month, a full date, or an ISO-8601 datetime with or without
//! a UTC offset. This module resolves such strings into canonical range
//! endpoints and renders stored (start, end) pairs as DataCite date strings.
//!
//! Granularity is preserved: the stored string keeps the precision it was
//! entered with and round-trips through export unchanged. Resolution only
//! widens a partial date to the correct endpoint of its range, honoring
//! leap years for February.
//!
//! # Examples
//!
//! ```
//! use metanorm::dates;
//!
//! assert_eq!(dates::resolve_granular("2020", false), Some("2020-01-01".to_string()));
//! assert_eq!(dates::resolve_granular("2020-02", true), Some("2020-02-29".to_string()));
//! assert_eq!(dates::resolve_granular("2021-02", true), Some("2021-02-28".to_string()));
//! assert_eq!(dates::resolve_granular("2024-13", true), None);
//! ```

use chrono::{Datelike, FixedOffset, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"^\d{4}$").unwrap();
    static ref YEAR_MONTH_RE: Regex = Regex::new(r"^(\d{4})-(\d{2})$").unwrap();
    static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref DATETIME_RE: Regex = Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?(Z|[+-]\d{2}:\d{2})?$"
    )
    .unwrap();
}

/// Resolve a raw date string into a canonical range endpoint.
///
/// - `None`-like input (empty or whitespace-only) yields `None`.
/// - `YYYY` widens to `YYYY-01-01` (start) or `YYYY-12-31` (end).
/// - `YYYY-MM` widens to the first day of the month (start) or the last
///   calendar day of that month (end), accounting for leap years.
/// - `YYYY-MM-DD` and full ISO-8601 datetimes (optionally with UTC offset)
///   are returned unchanged, trimmed.
///
/// A month outside `01`–`12`, a day outside the month, or any string that
/// does not classify is rejected with `None`. No guessing.
#[must_use]
pub fn resolve_granular(raw: &str, end_of_range: bool) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if YEAR_RE.is_match(trimmed) {
        return Some(if end_of_range {
            format!("{trimmed}-12-31")
        } else {
            format!("{trimmed}-01-01")
        });
    }

    if let Some(caps) = YEAR_MONTH_RE.captures(trimmed) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        return Some(if end_of_range {
            let day = last_day_of_month(year, month)?;
            format!("{trimmed}-{day:02}")
        } else {
            format!("{trimmed}-01")
        });
    }

    if DATE_RE.is_match(trimmed) {
        // Range-check day and month; 2021-02-30 is rejected, not guessed
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()?;
        return Some(trimmed.to_string());
    }

    if let Some(caps) = DATETIME_RE.captures(trimmed) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        let hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        let second: u32 = caps.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?;

        if !(1..=12).contains(&month) || day < 1 || day > last_day_of_month(year, month)? {
            return None;
        }
        if hour > 23 || minute > 59 || second > 60 {
            return None;
        }
        return Some(trimmed.to_string());
    }

    None
}

/// Whether the raw string is empty or whitespace-only.
#[must_use]
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Last calendar day of the given month, honoring leap years.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    Some(first_of_next.pred_opt()?.day())
}

/// Render a stored (start, end) pair as a DataCite date string.
///
/// Both endpoints present render as `"start/end"`. A single present
/// endpoint collapses to that value alone; an open-ended range is never
/// rendered with a trailing or leading slash. Both absent yields `None`.
///
/// A stored datetime that lacks a UTC offset gets `fallback_offset`
/// appended before rendering. The fallback is deployment configuration
/// passed in by the caller; there is no module-level default.
///
/// # Examples
///
/// ```
/// use chrono::FixedOffset;
/// use metanorm::dates;
///
/// let utc = FixedOffset::east_opt(0).unwrap();
/// assert_eq!(
///     dates::render_range(Some("2024-01-15"), None, utc),
///     Some("2024-01-15".to_string())
/// );
/// assert_eq!(
///     dates::render_range(Some("2020-01-01"), Some("2020-12-31"), utc),
///     Some("2020-01-01/2020-12-31".to_string())
/// );
/// ```
#[must_use]
pub fn render_range(
    start: Option<&str>,
    end: Option<&str>,
    fallback_offset: FixedOffset,
) -> Option<String> {
    let start = start.filter(|s| !is_blank(s));
    let end = end.filter(|s| !is_blank(s));

    match (start, end) {
        (Some(s), Some(e)) => Some(format!(
            "{}/{}",
            with_offset_fallback(s, fallback_offset),
            with_offset_fallback(e, fallback_offset)
        )),
        (Some(s), None) => Some(with_offset_fallback(s, fallback_offset)),
        (None, Some(e)) => Some(with_offset_fallback(e, fallback_offset)),
        (None, None) => None,
    }
}

/// Split an exported date string back into (start, end) endpoints.
///
/// A single value is an open-ended start; `"a/b"` is a closed range.
/// Inverse of [`render_range`] up to the collapsed open side.
#[must_use]
pub fn split_range(value: &str) -> (Option<String>, Option<String>) {
    let non_blank = |part: &str| {
        let trimmed = part.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };
    match value.split_once('/') {
        Some((start, end)) => (non_blank(start), non_blank(end)),
        None => (non_blank(value), None),
    }
}

/// Append the fallback UTC offset to a datetime that lacks one.
///
/// Dates without a time component and datetimes that already carry an
/// offset (or `Z`) pass through unchanged.
#[must_use]
pub fn with_offset_fallback(value: &str, fallback_offset: FixedOffset) -> String {
    let value = value.trim();
    if has_time_component(value) && !has_utc_offset(value) {
        // FixedOffset displays as "+HH:MM"
        format!("{value}{fallback_offset}")
    } else {
        value.to_string()
    }
}

fn has_time_component(value: &str) -> bool {
    value.contains('T')
}

fn has_utc_offset(value: &str) -> bool {
    let Some(time_part) = value.split('T').nth(1) else {
        return false;
    };
    time_part.ends_with('Z') || {
        lazy_static! {
            static ref OFFSET_RE: Regex = Regex::new(r"[+-]\d{2}:\d{2}$").unwrap();
        }
        OFFSET_RE.is_match(time_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn berlin() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(resolve_granular("", false), None);
        assert_eq!(resolve_granular("   ", true), None);
    }

    #[test]
    fn test_year_widening() {
        assert_eq!(resolve_granular("1995", false), Some("1995-01-01".to_string()));
        assert_eq!(resolve_granular("1995", true), Some("1995-12-31".to_string()));
    }

    #[test]
    fn test_year_month_start() {
        assert_eq!(resolve_granular("2023-06", false), Some("2023-06-01".to_string()));
    }

    #[test]
    fn test_year_month_end_leap_years() {
        assert_eq!(resolve_granular("2020-02", true), Some("2020-02-29".to_string()));
        assert_eq!(resolve_granular("2021-02", true), Some("2021-02-28".to_string()));
        // Century rule: 2000 is a leap year, 1900 is not
        assert_eq!(resolve_granular("2000-02", true), Some("2000-02-29".to_string()));
        assert_eq!(resolve_granular("1900-02", true), Some("1900-02-28".to_string()));
    }

    #[test]
    fn test_year_month_end_month_lengths() {
        assert_eq!(resolve_granular("2023-04", true), Some("2023-04-30".to_string()));
        assert_eq!(resolve_granular("2023-12", true), Some("2023-12-31".to_string()));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert_eq!(resolve_granular("2024-13", false), None);
        assert_eq!(resolve_granular("2024-00", true), None);
    }

    #[test]
    fn test_full_date_passthrough() {
        assert_eq!(
            resolve_granular("2024-01-15", true),
            Some("2024-01-15".to_string())
        );
        assert_eq!(
            resolve_granular("  2024-01-15 ", false),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_invalid_day_rejected() {
        assert_eq!(resolve_granular("2021-02-30", false), None);
        assert_eq!(resolve_granular("2023-04-31", false), None);
    }

    #[test]
    fn test_datetime_passthrough() {
        assert_eq!(
            resolve_granular("2024-01-15T08:30:00", false),
            Some("2024-01-15T08:30:00".to_string())
        );
        assert_eq!(
            resolve_granular("2024-01-15T08:30:00+02:00", false),
            Some("2024-01-15T08:30:00+02:00".to_string())
        );
        assert_eq!(
            resolve_granular("2024-01-15T08:30:00Z", false),
            Some("2024-01-15T08:30:00Z".to_string())
        );
    }

    #[test]
    fn test_datetime_invalid_components() {
        assert_eq!(resolve_granular("2024-01-15T25:00:00", false), None);
        assert_eq!(resolve_granular("2024-02-30T08:00:00", false), None);
    }

    #[test]
    fn test_unclassifiable_rejected() {
        assert_eq!(resolve_granular("January 2024", false), None);
        assert_eq!(resolve_granular("15.01.2024", false), None);
    }

    #[test]
    fn test_render_both_endpoints() {
        assert_eq!(
            render_range(Some("2020-01-01"), Some("2020-12-31"), utc()),
            Some("2020-01-01/2020-12-31".to_string())
        );
    }

    #[test]
    fn test_render_open_end_collapses() {
        assert_eq!(
            render_range(Some("2024-01-15"), None, utc()),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_render_open_start_collapses() {
        assert_eq!(
            render_range(None, Some("2024-01-15"), utc()),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_render_neither() {
        assert_eq!(render_range(None, None, utc()), None);
        assert_eq!(render_range(Some("  "), None, utc()), None);
    }

    #[test]
    fn test_offset_fallback_applied() {
        assert_eq!(
            render_range(Some("2024-01-15T08:30:00"), None, berlin()),
            Some("2024-01-15T08:30:00+01:00".to_string())
        );
    }

    #[test]
    fn test_offset_fallback_not_applied_when_present() {
        assert_eq!(
            render_range(Some("2024-01-15T08:30:00+02:00"), None, berlin()),
            Some("2024-01-15T08:30:00+02:00".to_string())
        );
        assert_eq!(
            render_range(Some("2024-01-15T08:30:00Z"), None, berlin()),
            Some("2024-01-15T08:30:00Z".to_string())
        );
    }

    #[test]
    fn test_offset_fallback_plain_date_untouched() {
        assert_eq!(
            render_range(Some("2024-01-15"), None, berlin()),
            Some("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2020, 2), Some(29));
        assert_eq!(last_day_of_month(2021, 2), Some(28));
        assert_eq!(last_day_of_month(2023, 9), Some(30));
        assert_eq!(last_day_of_month(2023, 12), Some(31));
    }
}
