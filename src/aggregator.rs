//! Multi-source earnings calendar aggregation.
//!
//! # Pipeline
//!
//! ```text
//! sites ──(concurrent fetch + parse)──▶ outcomes ──▶ priority dedup
//!     ──▶ window filter ──▶ sort ──▶ cache
//! ```
//!
//! Each site is fetched and parsed on its own; a failure is logged, recorded
//! in the report's `source_status`, and otherwise ignored. Only when every
//! site fails is the report degraded, and degraded reports are not cached so
//! the next call tries again.

use crate::cache::{Clock, TtlCache};
use crate::config::RadarConfig;
use crate::dates::format_date;
use crate::error::{ConfigError, SourceFailure};
use crate::fetch::Fetch;
use crate::models::{CalendarReport, EarningsRecord, SourceId, SourceStatus};
use crate::scrapers::{CalendarWindow, EarningsSite, default_sites};
use futures::future::join_all;
use itertools::Itertools;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// What one site produced during a single call.
pub type SourceOutcome = (SourceId, Result<Vec<EarningsRecord>, SourceFailure>);

const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_MAX_DAYS_AHEAD: i64 = 90;

/// Fetches, merges, and caches the earnings calendar across sites.
pub struct EarningsAggregator<F> {
    fetcher: F,
    sites: Vec<Box<dyn EarningsSite>>,
    cache: TtlCache<CalendarReport>,
    ttl: Duration,
    max_days_ahead: i64,
}

impl<F: Fetch> EarningsAggregator<F> {
    pub fn new(fetcher: F, sites: Vec<Box<dyn EarningsSite>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            sites,
            cache: TtlCache::new(clock),
            ttl: DEFAULT_TTL,
            max_days_ahead: DEFAULT_MAX_DAYS_AHEAD,
        }
    }

    /// Aggregator over the live sites named in `config`.
    pub fn from_config(
        fetcher: F,
        config: &RadarConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let mut ids = config.earnings_source_ids()?;
        ids.sort();
        ids.dedup();
        Ok(Self::new(fetcher, default_sites(&ids), clock)
            .with_ttl(config.earnings_ttl())
            .with_max_days_ahead(config.max_days_ahead))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_days_ahead(mut self, days: i64) -> Self {
        self.max_days_ahead = days.max(1);
        self
    }

    pub fn cache(&self) -> &TtlCache<CalendarReport> {
        &self.cache
    }

    /// Upcoming earnings for `[today, today + days_ahead]`.
    ///
    /// `days_ahead <= 0` yields an empty, non-degraded report without any
    /// network access. Larger values are clamped to `max_days_ahead`.
    /// `bypass_cache` drops the cached report for this window first, and the
    /// refreshed report replaces it.
    #[instrument(level = "info", skip(self))]
    pub async fn get_earnings_calendar(
        &self,
        days_ahead: i64,
        bypass_cache: bool,
    ) -> CalendarReport {
        if days_ahead <= 0 {
            return CalendarReport::default();
        }
        let days = days_ahead.min(self.max_days_ahead);
        let window = CalendarWindow::new(self.cache.clock().today(), days);
        let key = format!("calendar:{}:{}", format_date(window.today), days);

        if bypass_cache {
            self.cache.invalidate(&key);
        }

        let result = self
            .cache
            .try_get_or_compute(&key, self.ttl, || async {
                let outcomes = self.collect(&window).await;
                let report = merge_records(outcomes, &window);
                if report.is_degraded() {
                    Err(report)
                } else {
                    Ok(report)
                }
            })
            .await;

        match result {
            Ok(report) => report,
            Err(report) => {
                if let Some(degraded) = report.degraded() {
                    warn!(error = %degraded, "Earnings calendar degraded; not caching");
                }
                report
            }
        }
    }

    /// Fetch and parse every site concurrently.
    async fn collect(&self, window: &CalendarWindow) -> Vec<SourceOutcome> {
        let tasks = self.sites.iter().map(|site| async move {
            let id = site.id();
            let url = site.calendar_url(window);
            let outcome = match self.fetcher.fetch(id.name(), &url).await {
                Ok(html) => site.parse(&html, window).map_err(SourceFailure::from),
                Err(e) => Err(SourceFailure::from(e)),
            };
            if let Err(e) = &outcome {
                warn!(source = %id, error = %e, "Earnings source failed");
            }
            (id, outcome)
        });
        join_all(tasks).await
    }
}

/// Merge per-site outcomes into a report.
///
/// Records are taken in fixed source priority, deduplicated on
/// `(ticker, report_date)` keeping the first, restricted to `window`, and
/// sorted by date then ticker. The result does not depend on the order of
/// `outcomes`.
pub fn merge_records(mut outcomes: Vec<SourceOutcome>, window: &CalendarWindow) -> CalendarReport {
    outcomes.sort_by_key(|(id, _)| id.priority());

    let mut report = CalendarReport::default();
    let mut all = Vec::new();
    for (id, outcome) in outcomes {
        let status = match outcome {
            Ok(records) => {
                let status = SourceStatus::Success {
                    records: records.len(),
                };
                all.extend(records);
                status
            }
            Err(e) => SourceStatus::Failure {
                reason: e.to_string(),
            },
        };
        report.source_status.insert(id, status);
    }

    let parsed = all.len();
    report.records = all
        .into_iter()
        .unique_by(EarningsRecord::key)
        .filter(|r| window.contains(r.report_date))
        .sorted_by(|a, b| (a.report_date, &a.ticker).cmp(&(b.report_date, &b.ticker)))
        .collect();

    info!(
        parsed,
        kept = report.records.len(),
        failed = report.failed_sources().len(),
        "Merged earnings calendar"
    );
    report
}
