//! Earnings calendar scrapers, one per source site.
//!
//! Each scraper implements [`EarningsSite`]: it names the calendar URL for a
//! date window and turns that page's HTML into [`EarningsRecord`]s. Fetching
//! is left to the aggregator so every site shares one rate-limited client.
//!
//! # Supported Sources
//!
//! | Source | Module | Markup |
//! |--------|--------|--------|
//! | Finviz | [`finviz`] | `table.calendar` with date header rows |
//! | Investing.com | [`investing`] | `table#earningsCalendarData` with `td.theDay` rows |
//! | Yahoo Finance | [`yahoo`] | header-mapped `table` columns |
//! | MarketWatch | [`marketwatch`] | one `table` per `data-tab-pane` day |
//!
//! # Common Rules
//!
//! - A missing calendar table is a [`ParseError`]; a table with no usable rows
//!   is an empty list
//! - Rows without a valid ticker or a parseable date are skipped
//! - Tickers are upper-cased and company names whitespace-collapsed here, so
//!   individual scrapers cannot drift

pub mod finviz;
pub mod investing;
pub mod marketwatch;
pub mod yahoo;

use crate::error::ParseError;
use crate::filters::parse_ticker;
use crate::models::{EarningsRecord, ReportTime, SourceId};
use chrono::{Duration, NaiveDate};
use scraper::ElementRef;

/// The `[today, today + days]` window a calendar call covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub today: NaiveDate,
    pub end: NaiveDate,
}

impl CalendarWindow {
    pub fn new(today: NaiveDate, days_ahead: i64) -> Self {
        Self {
            today,
            end: today + Duration::days(days_ahead.max(0)),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.today <= date && date <= self.end
    }
}

/// One earnings website.
pub trait EarningsSite: Send + Sync {
    fn id(&self) -> SourceId;

    /// Page to fetch for `window`.
    fn calendar_url(&self, window: &CalendarWindow) -> String;

    /// Extract records from the fetched page.
    fn parse(&self, html: &str, window: &CalendarWindow) -> Result<Vec<EarningsRecord>, ParseError>;
}

/// Build the scrapers for `ids` against the live sites.
pub fn default_sites(ids: &[SourceId]) -> Vec<Box<dyn EarningsSite>> {
    ids.iter()
        .map(|id| -> Box<dyn EarningsSite> {
            match id {
                SourceId::Finviz => Box::new(finviz::Finviz::default()),
                SourceId::Investing => Box::new(investing::Investing::default()),
                SourceId::Yahoo => Box::new(yahoo::Yahoo::default()),
                SourceId::MarketWatch => Box::new(marketwatch::MarketWatch::default()),
            }
        })
        .collect()
}

/// Visible text of an element, whitespace-collapsed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a record from raw cell text, or `None` when the ticker is unusable.
pub(crate) fn make_record(
    source: SourceId,
    raw_ticker: &str,
    raw_company: &str,
    report_date: NaiveDate,
    raw_time: &str,
) -> Option<EarningsRecord> {
    let ticker = parse_ticker(raw_ticker).ok()?;
    let company_name = raw_company.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(EarningsRecord {
        ticker,
        company_name,
        report_date,
        report_time: ReportTime::from_label(raw_time),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let window = CalendarWindow::new(today, 10);
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert!(window.contains(today));
        assert!(window.contains(window.end));
        assert!(!window.contains(today.pred_opt().unwrap()));
    }

    #[test]
    fn make_record_normalizes_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let record =
            make_record(SourceId::Yahoo, " aapl ", "  Apple\n  Inc. ", date, "AMC").unwrap();
        assert_eq!(record.ticker, "AAPL");
        assert_eq!(record.company_name, "Apple Inc.");
        assert_eq!(record.report_time, ReportTime::AfterMarket);
        assert!(make_record(SourceId::Yahoo, "", "Apple", date, "").is_none());
        assert!(make_record(SourceId::Yahoo, "TOOLONG", "Apple", date, "").is_none());
    }

    #[test]
    fn default_sites_follow_requested_ids() {
        let sites = default_sites(&[SourceId::Yahoo, SourceId::Finviz]);
        let ids: Vec<SourceId> = sites.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![SourceId::Yahoo, SourceId::Finviz]);
    }
}
