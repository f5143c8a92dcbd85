//! Ticker validation and the pure filter predicates the dashboard uses.
//!
//! Nothing here touches the network; validation failures come back as
//! [`ValidationError`] synchronously.

use crate::error::ValidationError;
use crate::models::EarningsRecord;
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

const MAX_TICKER_LEN: usize = 5;

/// Exchange suffixes stripped before validation.
const TICKER_SUFFIXES: &[&str] = &["-USD", "-US", ".US", ".TO", ".L"];

/// Standardize a ticker symbol: trim, uppercase, drop exchange suffixes and dots.
///
/// ```ignore
/// assert_eq!(clean_ticker(" aapl.us "), "AAPL");
/// assert_eq!(clean_ticker("msft-usd"), "MSFT");
/// ```
pub fn clean_ticker(raw: &str) -> String {
    let mut ticker = raw.trim().to_uppercase();
    for suffix in TICKER_SUFFIXES {
        if let Some(stripped) = ticker.strip_suffix(suffix) {
            ticker = stripped.to_string();
            break;
        }
    }
    ticker.replace('.', "")
}

/// True when the cleaned symbol is 1-5 ASCII alphanumerics with at least one letter.
pub fn validate_ticker(symbol: &str) -> bool {
    parse_ticker(symbol).is_ok()
}

/// Clean and validate a ticker, returning the normalized symbol.
pub fn parse_ticker(symbol: &str) -> Result<String, ValidationError> {
    if symbol.trim().is_empty() {
        return Err(ValidationError::EmptyTicker);
    }
    let cleaned = clean_ticker(symbol);
    let valid = !cleaned.is_empty()
        && cleaned.len() <= MAX_TICKER_LEN
        && cleaned.chars().all(|c| c.is_ascii_alphanumeric())
        && cleaned.chars().any(|c| c.is_ascii_alphabetic());
    if valid {
        Ok(cleaned)
    } else {
        Err(ValidationError::InvalidTicker(symbol.trim().to_string()))
    }
}

/// Inclusive date range picked in the dashboard sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Narrow a record set the way the dashboard sidebar does.
///
/// An empty `tickers` slice keeps every ticker. `name_query` is a
/// case-insensitive substring match against the company name or the ticker.
pub fn filter_records(
    records: &[EarningsRecord],
    tickers: &[String],
    date_range: Option<DateRange>,
    name_query: Option<&str>,
) -> Vec<EarningsRecord> {
    let wanted: HashSet<String> = tickers.iter().map(|t| clean_ticker(t)).collect();
    let query = name_query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    records
        .iter()
        .filter(|r| wanted.is_empty() || wanted.contains(&r.ticker))
        .filter(|r| date_range.is_none_or(|range| range.contains(r.report_date)))
        .filter(|r| {
            query.as_deref().is_none_or(|q| {
                r.company_name.to_lowercase().contains(q) || r.ticker.to_lowercase().contains(q)
            })
        })
        .cloned()
        .collect()
}

/// Tickers from `available` containing `query`; all of them when nothing matches.
pub fn search_tickers(available: &[String], query: &str) -> Vec<String> {
    let needle = query.trim().to_uppercase();
    if needle.is_empty() {
        return available.to_vec();
    }
    let hits: Vec<String> = available
        .iter()
        .filter(|t| t.to_uppercase().contains(&needle))
        .cloned()
        .collect();
    if hits.is_empty() {
        available.to_vec()
    } else {
        hits
    }
}

/// Widely followed symbols offered as a preset selection.
pub const POPULAR_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "DIS", "PYPL",
];

/// Number of tickers used when none of the popular ones report.
const POPULAR_FALLBACK: usize = 10;

/// Popular tickers present in `available`, in preset order.
///
/// When none of them report in the window, the first ten of `available`
/// stand in so the selection is never silently empty.
pub fn popular_tickers(available: &[String]) -> Vec<String> {
    let present: Vec<String> = POPULAR_TICKERS
        .iter()
        .filter(|p| available.iter().any(|a| a == *p))
        .map(|p| p.to_string())
        .collect();
    if present.is_empty() {
        available.iter().take(POPULAR_FALLBACK).cloned().collect()
    } else {
        present
    }
}

/// Whole days from `today` until `date`; negative for past dates.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Calendar quarter label, e.g. "Q2 2024".
pub fn quarter_label(date: NaiveDate) -> String {
    let quarter = (date.month() - 1) / 3 + 1;
    format!("Q{quarter} {}", date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportTime, SourceId};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(ticker: &str, company: &str, date: NaiveDate) -> EarningsRecord {
        EarningsRecord {
            ticker: ticker.to_string(),
            company_name: company.to_string(),
            report_date: date,
            report_time: ReportTime::Unknown,
            source: SourceId::Finviz,
        }
    }

    #[test]
    fn validates_tickers() {
        assert!(validate_ticker("AAPL"));
        assert!(validate_ticker("brk.b"));
        assert!(validate_ticker("msft-usd"));
        assert!(!validate_ticker(""));
        assert!(!validate_ticker("   "));
        assert!(!validate_ticker("123456"));
        assert!(!validate_ticker("12345"));
        assert!(!validate_ticker("GOOGLEX"));
        assert!(!validate_ticker("AA PL"));
    }

    #[test]
    fn parse_ticker_reports_reason() {
        assert_eq!(parse_ticker(""), Err(ValidationError::EmptyTicker));
        assert_eq!(
            parse_ticker("123456"),
            Err(ValidationError::InvalidTicker("123456".into()))
        );
        assert_eq!(parse_ticker(" aapl.us "), Ok("AAPL".to_string()));
    }

    #[test]
    fn cleans_ticker_suffixes() {
        assert_eq!(clean_ticker("AAPL.US"), "AAPL");
        assert_eq!(clean_ticker("msft-usd"), "MSFT");
        assert_eq!(clean_ticker("SHOP.TO"), "SHOP");
        assert_eq!(clean_ticker("GOOGL"), "GOOGL");
    }

    #[test]
    fn popular_tickers_keep_preset_order() {
        let available: Vec<String> =
            ["ZM", "NVDA", "AAPL", "CMG"].iter().map(|s| s.to_string()).collect();
        assert_eq!(popular_tickers(&available), vec!["AAPL", "NVDA"]);
    }

    #[test]
    fn popular_tickers_fall_back_to_first_available() {
        let available: Vec<String> = (0..12).map(|i| format!("T{i}")).collect();
        let picked = popular_tickers(&available);
        assert_eq!(picked.len(), 10);
        assert_eq!(picked[0], "T0");
        assert!(popular_tickers(&[]).is_empty());
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(day(2024, 5, 2), day(2024, 5, 1)).is_err());
        let range = DateRange::new(day(2024, 5, 1), day(2024, 5, 3)).unwrap();
        assert!(range.contains(day(2024, 5, 1)));
        assert!(range.contains(day(2024, 5, 3)));
        assert!(!range.contains(day(2024, 5, 4)));
    }

    #[test]
    fn filters_by_ticker_range_and_name() {
        let records = vec![
            record("AAPL", "Apple Inc.", day(2024, 5, 1)),
            record("MSFT", "Microsoft Corp", day(2024, 5, 3)),
            record("AMZN", "Amazon.com Inc", day(2024, 5, 10)),
        ];

        let by_ticker = filter_records(&records, &["msft".to_string()], None, None);
        assert_eq!(by_ticker.len(), 1);
        assert_eq!(by_ticker[0].ticker, "MSFT");

        let range = DateRange::new(day(2024, 5, 1), day(2024, 5, 5)).unwrap();
        let by_range = filter_records(&records, &[], Some(range), None);
        assert_eq!(by_range.len(), 2);

        let by_name = filter_records(&records, &[], None, Some("amazon"));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].ticker, "AMZN");

        let blank_query = filter_records(&records, &[], None, Some("  "));
        assert_eq!(blank_query.len(), 3);
    }

    #[test]
    fn search_falls_back_to_everything() {
        let available = vec!["AAPL".to_string(), "AMZN".to_string(), "MSFT".to_string()];
        assert_eq!(search_tickers(&available, "a"), vec!["AAPL", "AMZN"]);
        assert_eq!(search_tickers(&available, "zzz"), available);
    }

    #[test]
    fn quarters_and_days() {
        assert_eq!(quarter_label(day(2024, 5, 1)), "Q2 2024");
        assert_eq!(quarter_label(day(2024, 12, 31)), "Q4 2024");
        assert_eq!(days_until(day(2024, 5, 3), day(2024, 4, 30)), 3);
        assert_eq!(days_until(day(2024, 4, 29), day(2024, 4, 30)), -1);
    }
}
