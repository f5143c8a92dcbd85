//! Per-ticker news: listing fetch, article download, summary, cache.
//!
//! # Pipeline
//!
//! ```text
//! endpoints ──(concurrent listing fetch)──▶ items ──▶ age filter
//!     ──▶ URL dedup ──(bounded article downloads)──▶ extract + summarize
//!     ──▶ newest first ──▶ cache
//! ```
//!
//! # Endpoints
//!
//! | Name | Module | Listing |
//! |------|--------|---------|
//! | `yahoo` | [`yahoo`] | `finance.yahoo.com/quote/{T}/news` |
//! | `marketwatch` | [`marketwatch`] | `marketwatch.com/investing/stock/{T}/news` |
//! | `google_news` | [`google`] | Google News RSS search |
//!
//! A failing endpoint or article is logged and skipped. An article that
//! downloads but has no usable prose is kept with an empty summary.

pub mod article;
pub mod google;
pub mod marketwatch;
pub mod summarize;
pub mod urls;
pub mod yahoo;

use crate::cache::{Clock, TtlCache};
use crate::config::{NewsSettings, RadarConfig};
use crate::error::{ConfigError, ParseError, SourceFailure, ValidationError};
use crate::fetch::Fetch;
use crate::filters::parse_ticker;
use crate::models::NewsArticle;
use article::extract_article;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::cmp::Ordering;
use std::sync::Arc;
use summarize::summarize;
use tracing::{debug, info, instrument, warn};
use urls::normalize_url;

/// Most tickers fetched by one [`NewsFetcher::get_news_for_tickers`] call.
pub const MAX_NEWS_TICKERS: usize = 5;

/// One entry on a news listing page, before the article is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub title: String,
    /// Absolute http(s) URL as listed.
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// A site that lists news for a ticker.
pub trait NewsEndpoint: Send + Sync {
    fn name(&self) -> &'static str;

    fn listing_url(&self, ticker: &str) -> String;

    /// Listing items in page order. Relative links are resolved; items
    /// without a usable link are dropped.
    fn parse_listing(&self, body: &str, now: DateTime<Utc>) -> Result<Vec<ListingItem>, ParseError>;
}

/// Build the live endpoints named in `names`.
pub fn default_endpoints(names: &[String]) -> Result<Vec<Box<dyn NewsEndpoint>>, ConfigError> {
    names
        .iter()
        .map(|name| -> Result<Box<dyn NewsEndpoint>, ConfigError> {
            match name.trim().to_ascii_lowercase().as_str() {
                "yahoo" => Ok(Box::new(yahoo::YahooNews::default())),
                "marketwatch" => Ok(Box::new(marketwatch::MarketWatchNews::default())),
                "google_news" | "google" => Ok(Box::new(google::GoogleNews::default())),
                _ => Err(ConfigError::UnknownSource(name.clone())),
            }
        })
        .collect()
}

/// Fetches, summarizes, and caches news per ticker.
pub struct NewsFetcher<F> {
    fetcher: F,
    endpoints: Vec<Box<dyn NewsEndpoint>>,
    cache: TtlCache<Vec<NewsArticle>>,
    settings: NewsSettings,
}

impl<F: Fetch> NewsFetcher<F> {
    pub fn new(
        fetcher: F,
        endpoints: Vec<Box<dyn NewsEndpoint>>,
        settings: NewsSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            endpoints,
            cache: TtlCache::new(clock),
            settings,
        }
    }

    pub fn from_config(
        fetcher: F,
        config: &RadarConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let endpoints = default_endpoints(&config.news.sources)?;
        Ok(Self::new(fetcher, endpoints, config.news.clone(), clock))
    }

    pub fn cache(&self) -> &TtlCache<Vec<NewsArticle>> {
        &self.cache
    }

    /// Up to `max_articles` recent articles about `ticker`, newest first.
    ///
    /// An invalid ticker yields an empty list without network access.
    pub async fn get_news(&self, ticker: &str, max_articles: usize) -> Vec<NewsArticle> {
        match self.try_get_news(ticker, max_articles).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(%ticker, error = %e, "Rejected news request");
                Vec::new()
            }
        }
    }

    /// Like [`NewsFetcher::get_news`], but reports an invalid ticker.
    #[instrument(level = "info", skip(self))]
    pub async fn try_get_news(
        &self,
        ticker: &str,
        max_articles: usize,
    ) -> Result<Vec<NewsArticle>, ValidationError> {
        let ticker = parse_ticker(ticker)?;
        if max_articles == 0 {
            return Ok(Vec::new());
        }

        let key = format!("news:{ticker}");
        let result = self
            .cache
            .try_get_or_compute(&key, self.settings.ttl(), || self.fetch_articles(&ticker))
            .await;

        let mut articles = match result {
            Ok(articles) => articles,
            Err(articles) => {
                warn!(%ticker, "Every news endpoint failed; not caching");
                articles
            }
        };
        articles.truncate(max_articles);
        Ok(articles)
    }

    /// News for several tickers merged into one list, newest first.
    ///
    /// Invalid tickers are skipped with a warning and at most
    /// [`MAX_NEWS_TICKERS`] distinct tickers are fetched, concurrently and
    /// through the per-ticker cache. A story listed for more than one ticker
    /// is kept once, under the first ticker that requested it.
    #[instrument(level = "info", skip(self, tickers), fields(requested = tickers.len()))]
    pub async fn get_news_for_tickers(
        &self,
        tickers: &[String],
        max_per_ticker: usize,
    ) -> Vec<NewsArticle> {
        let valid: Vec<String> = tickers
            .iter()
            .filter_map(|raw| match parse_ticker(raw) {
                Ok(ticker) => Some(ticker),
                Err(e) => {
                    warn!(ticker = %raw, error = %e, "Skipping invalid ticker");
                    None
                }
            })
            .unique()
            .collect();
        if valid.len() > MAX_NEWS_TICKERS {
            warn!(
                requested = valid.len(),
                kept = MAX_NEWS_TICKERS,
                "Too many tickers for one news request; keeping the first"
            );
        }
        let valid = &valid[..valid.len().min(MAX_NEWS_TICKERS)];

        let per_ticker =
            join_all(valid.iter().map(|ticker| self.get_news(ticker, max_per_ticker))).await;
        let mut merged: Vec<NewsArticle> = per_ticker
            .into_iter()
            .flatten()
            .unique_by(|a| a.url.clone())
            .collect();
        merged.sort_by(newest_first);

        info!(tickers = valid.len(), count = merged.len(), "Collected news for tickers");
        merged
    }

    /// Full uncapped article list for `ticker`.
    ///
    /// `Err` carries the (empty) result when every endpoint failed, so the
    /// cache does not keep it.
    async fn fetch_articles(&self, ticker: &str) -> Result<Vec<NewsArticle>, Vec<NewsArticle>> {
        let now = self.cache.clock().now();

        let listings = join_all(self.endpoints.iter().map(|endpoint| async move {
            let url = endpoint.listing_url(ticker);
            let outcome = match self.fetcher.fetch(endpoint.name(), &url).await {
                Ok(body) => endpoint.parse_listing(&body, now).map_err(SourceFailure::from),
                Err(e) => Err(SourceFailure::from(e)),
            };
            (endpoint.name(), outcome)
        }))
        .await;

        let mut failed = 0usize;
        let mut items = Vec::new();
        for (name, outcome) in listings {
            match outcome {
                Ok(listed) => {
                    debug!(endpoint = name, count = listed.len(), "Parsed news listing");
                    items.extend(
                        listed
                            .into_iter()
                            .filter(|item| self.is_recent(item.published_at, now))
                            .take(self.settings.max_articles_per_source)
                            .map(|item| (name, item)),
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(endpoint = name, error = %e, "News endpoint failed");
                }
            }
        }

        let unique: Vec<(&'static str, String, ListingItem)> = items
            .into_iter()
            .filter_map(|(name, item)| normalize_url(&item.url).map(|key| (name, key, item)))
            .unique_by(|(_, key, _)| key.clone())
            .collect();

        let concurrency = self.settings.download_concurrency.max(1);
        let mut articles: Vec<NewsArticle> = stream::iter(unique)
            .map(|(name, key, item)| self.download(ticker, name, key, item, now))
            .buffer_unordered(concurrency)
            .filter_map(|article| async move { article })
            .collect()
            .await;

        articles.retain(|a| self.is_recent(a.published_at, now));
        articles.sort_by(newest_first);

        info!(%ticker, count = articles.len(), failed_endpoints = failed, "Collected news");
        if !self.endpoints.is_empty() && failed == self.endpoints.len() {
            Err(articles)
        } else {
            Ok(articles)
        }
    }

    /// Download and summarize one article; `None` when the page cannot be fetched.
    async fn download(
        &self,
        ticker: &str,
        source: &'static str,
        url: String,
        item: ListingItem,
        now: DateTime<Utc>,
    ) -> Option<NewsArticle> {
        let html = match self.fetcher.fetch(source, &item.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%url, error = %e, "Skipping article that failed to download");
                return None;
            }
        };

        let extracted = extract_article(&html, now);
        let title = if item.title.is_empty() {
            extracted.title.unwrap_or_default()
        } else {
            item.title
        };
        let summary = summarize(&title, &extracted.text, self.settings.summary_sentences);
        if summary.is_empty() {
            debug!(%url, "No summarizable text");
        }

        Some(NewsArticle {
            ticker: ticker.to_string(),
            title,
            url,
            summary,
            published_at: item.published_at.or(extracted.published_at),
            source: source.to_string(),
        })
    }

    fn is_recent(&self, published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        published_at.is_none_or(|ts| ts >= now - Duration::days(self.settings.max_age_days))
    }
}

/// Newest first, undated last, URL as the tie-break.
fn newest_first(a: &NewsArticle, b: &NewsArticle) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.url.cmp(&b.url))
}
