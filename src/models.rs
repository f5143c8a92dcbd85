//! Data models for earnings records, news articles, and per-call reports.
//!
//! - [`EarningsRecord`]: one normalized row of the earnings calendar
//! - [`ReportTime`]: when during the trading day a company reports
//! - [`SourceId`]: the earnings sources, in fixed dedup priority order
//! - [`NewsArticle`]: a downloaded and summarized article for a ticker
//! - [`CalendarReport`]: records plus the status of every source for one call

use crate::error::AggregationDegraded;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An earnings website. The declaration order is the dedup priority:
/// when two sources report the same `(ticker, report_date)`, the one that
/// sorts first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Finviz,
    Investing,
    Yahoo,
    MarketWatch,
}

impl SourceId {
    /// All earnings sources, highest priority first.
    pub const ALL: [SourceId; 4] = [
        SourceId::Finviz,
        SourceId::Investing,
        SourceId::Yahoo,
        SourceId::MarketWatch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SourceId::Finviz => "finviz",
            SourceId::Investing => "investing",
            SourceId::Yahoo => "yahoo",
            SourceId::MarketWatch => "marketwatch",
        }
    }

    /// Lower rank wins during dedup.
    pub fn priority(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Time of day a company reports relative to the US session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportTime {
    BeforeMarket,
    AfterMarket,
    DuringMarket,
    Unknown,
}

impl ReportTime {
    /// Classify a free-form time label scraped from a calendar cell.
    ///
    /// Matches whole words so that e.g. a company name containing "am" is
    /// never mistaken for a morning report.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(w));

        if has(&["pre", "before", "bmo", "am", "premarket"]) {
            ReportTime::BeforeMarket
        } else if has(&["after", "close", "amc", "pm", "afterhours", "post"]) {
            ReportTime::AfterMarket
        } else if has(&["during", "market", "open", "dmh", "intraday"]) {
            ReportTime::DuringMarket
        } else {
            ReportTime::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportTime::BeforeMarket => "before-market",
            ReportTime::AfterMarket => "after-market",
            ReportTime::DuringMarket => "during-market",
            ReportTime::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReportTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One company's upcoming report, normalized across sources.
///
/// Identity for dedup is `(ticker, report_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsRecord {
    /// Uppercase symbol, 1-5 alphanumeric characters.
    pub ticker: String,
    pub company_name: String,
    pub report_date: NaiveDate,
    pub report_time: ReportTime,
    pub source: SourceId,
}

impl EarningsRecord {
    /// Dedup identity, owned so it can outlive the record in iterator adapters.
    pub fn key(&self) -> (String, NaiveDate) {
        (self.ticker.clone(), self.report_date)
    }
}

/// A news article about a ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Ticker the article was collected for.
    pub ticker: String,
    pub title: String,
    /// Normalized URL; the identity key for dedup.
    pub url: String,
    /// Extractive summary. Empty when the page downloaded but had no usable text.
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Name of the endpoint that listed the article.
    pub source: String,
}

/// Result of one source within a single aggregation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceStatus {
    Success { records: usize },
    Failure { reason: String },
}

impl SourceStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceStatus::Success { .. })
    }
}

/// What `get_earnings_calendar` hands back to the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarReport {
    pub records: Vec<EarningsRecord>,
    pub source_status: BTreeMap<SourceId, SourceStatus>,
}

impl CalendarReport {
    /// True when at least one source was asked and none succeeded.
    ///
    /// Lets the UI tell "data unavailable" apart from "no matching records".
    pub fn is_degraded(&self) -> bool {
        !self.source_status.is_empty() && self.source_status.values().all(|s| !s.is_success())
    }

    pub fn degraded(&self) -> Option<AggregationDegraded> {
        if !self.is_degraded() {
            return None;
        }
        let failures = self
            .source_status
            .iter()
            .map(|(source, status)| {
                let reason = match status {
                    SourceStatus::Failure { reason } => reason.clone(),
                    SourceStatus::Success { .. } => String::new(),
                };
                (source.name().to_string(), reason)
            })
            .collect();
        Some(AggregationDegraded { failures })
    }

    /// Sources that failed on this call, even when the report is not fully degraded.
    pub fn failed_sources(&self) -> Vec<SourceId> {
        self.source_status
            .iter()
            .filter(|(_, s)| !s.is_success())
            .map(|(id, _)| *id)
            .collect()
    }
}
