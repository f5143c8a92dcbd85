//! Plain-text tables for the terminal.

use crate::analytics::CalendarSummary;
use crate::dates::format_date;
use crate::filters::{days_until, quarter_label};
use crate::models::{EarningsRecord, NewsArticle};
use chrono::NaiveDate;
use std::fmt::Write;

const COMPANY_WIDTH: usize = 32;
const SUMMARY_WIDTH: usize = 280;

/// Cut `s` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// One line per record with the days remaining relative to `today`.
pub fn records_table(records: &[EarningsRecord], today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>4}  {:<7}  {:<6}  {:<COMPANY_WIDTH$}  {:<13}  {}",
        "DATE", "DAYS", "QUARTER", "TICKER", "COMPANY", "TIME", "SOURCE"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:<10}  {:>4}  {:<7}  {:<6}  {:<COMPANY_WIDTH$}  {:<13}  {}",
            format_date(r.report_date),
            days_until(r.report_date, today),
            quarter_label(r.report_date),
            r.ticker,
            truncate(&r.company_name, COMPANY_WIDTH),
            r.report_time.as_str(),
            r.source
        );
    }
    out
}

/// Headline metrics followed by the weekday and per-date breakdowns.
pub fn summary_table(summary: &CalendarSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total earnings    {}", summary.total);
    let _ = writeln!(out, "Today             {}", summary.today);
    let _ = writeln!(out, "This week         {}", summary.this_week);
    let _ = writeln!(out, "Unique companies  {}", summary.unique_companies);

    if !summary.by_weekday.is_empty() {
        let _ = writeln!(out, "\nBy day of week");
        for day in &summary.by_weekday {
            let _ = writeln!(out, "  {:<10}  {:>4}", day.weekday, day.count);
        }
    }
    if !summary.by_date.is_empty() {
        let _ = writeln!(out, "\nBy date");
        for (date, count) in &summary.by_date {
            let _ = writeln!(out, "  {}  {:>4}", format_date(*date), count);
        }
    }
    out
}

/// Title, byline, and summary block per article.
pub fn articles_table(articles: &[NewsArticle]) -> String {
    let mut out = String::new();
    for a in articles {
        let when = a
            .published_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "undated".to_string());
        let _ = writeln!(out, "{}", a.title);
        let _ = writeln!(out, "  {} | {} | {}", a.ticker, a.source, when);
        let _ = writeln!(out, "  {}", a.url);
        if !a.summary.is_empty() {
            let _ = writeln!(out, "  {}", truncate(&a.summary, SUMMARY_WIDTH));
        }
        out.push('\n');
    }
    out
}
