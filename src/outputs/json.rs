//! JSON rendering.

use crate::analytics::CalendarSummary;
use crate::error::ExportError;
use crate::models::{CalendarReport, NewsArticle};

/// Pretty-printed report, records and per-source status included.
pub fn report_to_json(report: &CalendarReport) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn articles_to_json(articles: &[NewsArticle]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(articles)?)
}

pub fn summary_to_json(summary: &CalendarSummary) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(summary)?)
}
