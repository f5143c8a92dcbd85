//! Date and timestamp parsing for the inconsistent formats the sources use.
//!
//! Calendar pages print report dates as "Monday, February 5th", "May 1, 2024",
//! "05/01/2024" and so on; news listings print "2 hours ago" or RFC 2822
//! timestamps. Everything funnels through here so parsers stay small.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(st|nd|rd|th)\b").expect("valid ordinal regex"));

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(minute|min|m|hour|hr|h|day|d|week|w)s?\b")
        .expect("valid relative regex")
});

/// Full-date formats, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
];

/// Formats without a year; the year is inferred from `today`.
const YEARLESS_FORMATS: &[&str] = &["%A, %B %d", "%a, %b %d", "%B %d", "%b %d", "%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%b. %d, %Y at %I:%M %p",
    "%B %d, %Y at %I:%M %p",
    "%b %d, %Y at %I:%M %p",
];

/// Parse a calendar date as printed by an earnings site.
///
/// Returns `None` for anything that does not resolve to a concrete date;
/// callers drop such rows rather than guessing.
pub fn parse_calendar_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let cleaned = normalize(raw);
    if cleaned.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(date);
        }
    }

    for fmt in YEARLESS_FORMATS {
        if let Some(date) = parse_yearless(&cleaned, fmt, today) {
            return Some(date);
        }
    }

    let lower = cleaned.to_lowercase();
    if lower.contains("today") {
        Some(today)
    } else if lower.contains("tomorrow") {
        today.succ_opt()
    } else if lower.contains("yesterday") {
        today.pred_opt()
    } else {
        None
    }
}

/// Parse a month/day without a year.
///
/// Calendars only list upcoming weeks, so a month/day more than six months
/// in the past belongs to next year ("January 3" seen in late December).
fn parse_yearless(cleaned: &str, fmt: &str, today: NaiveDate) -> Option<NaiveDate> {
    let year = today.year();
    let date = NaiveDate::parse_from_str(&format!("{cleaned} {year}"), &format!("{fmt} %Y"))
        .ok()
        .or_else(|| parse_without_weekday(cleaned, fmt, year))?;

    if date < today - Duration::days(183) {
        date.with_year(year + 1)
    } else {
        Some(date)
    }
}

/// `%A` must agree with the date, and sites print the weekday for the
/// current year; retry on the month/day alone.
fn parse_without_weekday(cleaned: &str, fmt: &str, year: i32) -> Option<NaiveDate> {
    let (_, rest) = cleaned.split_once(", ")?;
    let (_, fmt_rest) = fmt.split_once(", ")?;
    NaiveDate::parse_from_str(&format!("{rest} {year}"), &format!("{fmt_rest} %Y")).ok()
}

/// Parse a news timestamp into UTC.
///
/// Handles RFC 3339, RFC 2822 (RSS `pubDate`), a handful of site formats, and
/// relative phrases like "3 hours ago" or "2d ago" (measured from `now`).
pub fn parse_news_timestamp(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let cleaned = normalize(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    // MarketWatch appends a zone abbreviation ("... 4:05 p.m. ET"); the
    // remaining formats treat the wall-clock time as UTC.
    let without_zone = strip_zone_suffix(&cleaned.replace("a.m.", "AM").replace("p.m.", "PM"));
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&without_zone, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&without_zone, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
        }
    }

    parse_relative(&cleaned, now)
}

fn parse_relative(cleaned: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = cleaned.to_lowercase();
    if lower.contains("just now") {
        return Some(now);
    }
    if lower.contains("yesterday") {
        return now.checked_sub_signed(TimeDelta::days(1));
    }
    let caps = RELATIVE.captures(&lower)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    // page text is untrusted; out-of-range amounts are unparseable, not fatal
    let delta = match caps.get(2)?.as_str() {
        "minute" | "min" | "m" => TimeDelta::try_minutes(amount)?,
        "hour" | "hr" | "h" => TimeDelta::try_hours(amount)?,
        "day" | "d" => TimeDelta::try_days(amount)?,
        "week" | "w" => TimeDelta::try_weeks(amount)?,
        _ => return None,
    };
    now.checked_sub_signed(delta)
}

/// ISO `YYYY-MM-DD`, the display format used everywhere.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn normalize(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    ORDINAL.replace_all(&collapsed, "$1").into_owned()
}

fn strip_zone_suffix(s: &str) -> String {
    const ZONES: &[&str] = &[" ET", " EST", " EDT", " UTC", " GMT"];
    for zone in ZONES {
        if let Some(stripped) = s.strip_suffix(zone) {
            return stripped.to_string();
        }
    }
    s.to_string()
}
