//! iCalendar (RFC 5545) export of earnings records.
//!
//! | Report time | Event |
//! |-------------|-------|
//! | before market | 13:00-14:00 UTC |
//! | during market | 14:30-15:30 UTC |
//! | after market | 21:00-22:00 UTC |
//! | unknown | all-day on the report date |
//!
//! Lines end in CRLF and are folded at 75 octets.

use crate::models::{EarningsRecord, ReportTime};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

const LINE_LIMIT: usize = 75;

/// Render `records` as a `VCALENDAR`; `stamp` becomes every event's `DTSTAMP`.
pub fn records_to_ical(records: &[EarningsRecord], stamp: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//EarningsRadar//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        "X-WR-CALNAME:Earnings Calendar".to_string(),
    ];
    let stamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    for record in records {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!(
            "UID:{}-{}-{}@earnings-radar",
            record.ticker,
            record.report_date.format("%Y%m%d"),
            record.source
        ));
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.extend(event_times(record.report_date, record.report_time));
        lines.push(format!("SUMMARY:{} Earnings", escape_text(&record.ticker)));
        lines.push(format!(
            "DESCRIPTION:{}",
            escape_text(&format!(
                "Earnings report for {} ({}), {}. Source: {}",
                record.company_name, record.ticker, record.report_time, record.source
            ))
        ));
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());

    lines.iter().map(|l| fold_line(l)).map(|l| l + "\r\n").collect()
}

fn event_times(date: NaiveDate, time: ReportTime) -> Vec<String> {
    let start = match time {
        ReportTime::BeforeMarket => NaiveTime::from_hms_opt(13, 0, 0),
        ReportTime::DuringMarket => NaiveTime::from_hms_opt(14, 30, 0),
        ReportTime::AfterMarket => NaiveTime::from_hms_opt(21, 0, 0),
        ReportTime::Unknown => None,
    };
    match start {
        Some(start) => {
            let start = date.and_time(start);
            let end = start + chrono::Duration::hours(1);
            vec![
                format!("DTSTART:{}", start.format("%Y%m%dT%H%M%SZ")),
                format!("DTEND:{}", end.format("%Y%m%dT%H%M%SZ")),
            ]
        }
        None => {
            let next = date.succ_opt().unwrap_or(date);
            vec![
                format!("DTSTART;VALUE=DATE:{}", date.format("%Y%m%d")),
                format!("DTEND;VALUE=DATE:{}", next.format("%Y%m%d")),
            ]
        }
    }
}

/// Escape a TEXT value: backslash, semicolon, comma, newline.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Split a content line into 75-octet pieces joined by CRLF + space,
/// never inside a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    if line.len() <= LINE_LIMIT {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / LINE_LIMIT * 3);
    let mut used = 0;
    for c in line.chars() {
        // continuation lines start with a space, which counts toward the limit
        if used + c.len_utf8() > LINE_LIMIT {
            out.push_str("\r\n ");
            used = 1;
        }
        out.push(c);
        used += c.len_utf8();
    }
    out
}
