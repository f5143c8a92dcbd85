//! # EarningsRadar
//!
//! Aggregates upcoming company earnings dates and related news by scraping
//! public financial websites, with graceful degradation when a source fails.
//!
//! ## Features
//!
//! - Earnings calendars from Finviz, Investing.com, Yahoo Finance, and
//!   MarketWatch, fetched concurrently and merged by fixed source priority
//! - Per-ticker news from Yahoo Finance, MarketWatch, and Google News RSS,
//!   with article download and extractive summaries
//! - Per-host rate limiting, retry with backoff, and a TTL cache with
//!   single-flight per key
//! - Calendar analytics: headline counts plus per-weekday and per-date totals
//! - JSON, CSV, and iCalendar export
//!
//! ## Architecture
//!
//! ```text
//! EarningsAggregator ──▶ [Fetch ──▶ EarningsSite::parse] × sites
//!                        ──▶ merge ──▶ TtlCache
//! NewsFetcher        ──▶ [Fetch ──▶ NewsEndpoint::parse_listing] × endpoints
//!                        ──▶ dedup ──▶ [Fetch ──▶ extract ──▶ summarize] × articles
//!                        ──▶ TtlCache
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use earnings_radar::{EarningsAggregator, HttpFetcher, RadarConfig, RetryFetch, SystemClock};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RadarConfig::default();
//! let fetcher = RetryFetch::new(
//!     HttpFetcher::new(&config.fetch)?,
//!     config.fetch.max_retries,
//!     config.fetch.retry_base_delay(),
//! );
//! let aggregator = EarningsAggregator::from_config(fetcher, &config, Arc::new(SystemClock))?;
//! let report = aggregator.get_earnings_calendar(7, false).await;
//! for record in &report.records {
//!     println!("{} {} {}", record.report_date, record.ticker, record.company_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod analytics;
pub mod cache;
pub mod config;
pub mod dates;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod models;
pub mod news;
pub mod outputs;
pub mod scrapers;

pub use aggregator::{EarningsAggregator, SourceOutcome, merge_records};
pub use analytics::{CalendarSummary, calendar_summary};
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use config::RadarConfig;
pub use error::{
    AggregationDegraded, ConfigError, ExportError, FetchError, FetchFailure, ParseError,
    SourceFailure, ValidationError,
};
pub use fetch::{Fetch, HttpFetcher, RetryFetch};
pub use filters::{DateRange, filter_records, popular_tickers, validate_ticker};
pub use models::{CalendarReport, EarningsRecord, NewsArticle, ReportTime, SourceId, SourceStatus};
pub use news::{NewsEndpoint, NewsFetcher};
pub use scrapers::{CalendarWindow, EarningsSite};
