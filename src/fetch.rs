//! Rate-limited HTTP GET with browser-like headers and retry.
//!
//! # Architecture
//!
//! - [`Fetch`]: the capability every source needs, "give me this URL as text"
//! - [`HttpFetcher`]: the `reqwest` implementation, spacing requests per host
//! - [`RetryFetch`]: a decorator that adds exponential backoff to any [`Fetch`]
//!
//! # Rate limiting
//!
//! Each destination host gets its own schedule. A request reserves the next
//! free slot for its host (`last slot + min interval + jitter`) and sleeps
//! until it arrives, so concurrent requests to one host are spaced while
//! requests to different hosts proceed independently.
//!
//! # Retry strategy
//!
//! - Only transient failures (timeout, connect, 429, 5xx) are retried
//! - Exponential backoff from `base_delay`, capped at 30 seconds
//! - Random jitter (0-250ms) added to every delay

use crate::config::FetchSettings;
use crate::error::{FetchError, FetchFailure};
use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration as StdDuration, Instant as StdInstant};
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Fetch a URL as text on behalf of a named source.
pub trait Fetch {
    /// GET `url` and return the body.
    ///
    /// `source_name` is only used to label errors and log lines.
    async fn fetch(&self, source_name: &str, url: &str) -> Result<String, FetchError>;
}

impl<T: Fetch> Fetch for &T {
    async fn fetch(&self, source_name: &str, url: &str) -> Result<String, FetchError> {
        (**self).fetch(source_name, url).await
    }
}

/// Per-host request spacing.
#[derive(Debug)]
pub struct HostRateLimiter {
    min_interval: StdDuration,
    jitter_ms: u64,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostRateLimiter {
    pub fn new(min_interval: StdDuration, jitter_ms: u64) -> Self {
        Self {
            min_interval,
            jitter_ms,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Claim the next slot for `host` and return when it starts.
    ///
    /// The first request to a host goes immediately.
    pub async fn reserve(&self, host: &str) -> Instant {
        let now = Instant::now();
        let mut slots = self.next_slot.lock().await;
        let slot = match slots.get(host) {
            Some(next) if *next > now => *next,
            _ => now,
        };
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=self.jitter_ms)
        };
        slots.insert(
            host.to_string(),
            slot + self.min_interval + StdDuration::from_millis(jitter),
        );
        slot
    }

    /// Wait until `host` may be contacted again.
    pub async fn wait(&self, host: &str) {
        let slot = self.reserve(host).await;
        if slot > Instant::now() {
            let delay_ms = (slot - Instant::now()).as_millis() as u64;
            debug!(%host, delay_ms, "Rate limiting host");
            sleep_until(slot).await;
        }
    }
}

/// `reqwest`-backed fetcher with browser headers, timeout, and host spacing.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    limiter: HostRateLimiter,
}

impl HttpFetcher {
    /// Build the client from settings.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the client cannot be constructed
    /// (e.g. an invalid TLS setup or a user agent that is not a valid header).
    pub fn new(settings: &FetchSettings) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.timeout())
            .connect_timeout(settings.timeout().min(StdDuration::from_secs(10)))
            .build()?;

        Ok(Self {
            client,
            limiter: HostRateLimiter::new(settings.min_host_interval(), settings.host_jitter_ms),
        })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip(self), fields(source = %source_name))]
    async fn fetch(&self, source_name: &str, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| {
            FetchError::new(source_name, url, FetchFailure::InvalidUrl(e.to_string()))
        })?;
        let host = parsed.host_str().unwrap_or_default().to_string();
        self.limiter.wait(&host).await;

        let t0 = StdInstant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(source_name, url, &e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                %url,
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Non-success status"
            );
            return Err(FetchError::new(source_name, url, FetchFailure::Status(status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(source_name, url, &e))?;
        info!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry to any [`Fetch`] implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T: Fetch> RetryFetch<T> {
    /// Wrap `inner`; `max_retries` is the number of attempts after the first.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: Fetch> Fetch for RetryFetch<T> {
    #[instrument(level = "debug", skip(self), fields(source = %source_name))]
    async fn fetch(&self, source_name: &str, url: &str) -> Result<String, FetchError> {
        let total_t0 = StdInstant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(source_name, url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if !e.reason.is_transient() || attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "fetch gave up"
                        );
                        return Err(e);
                    }

                    let shift = (attempt - 1).min(16) as u32;
                    let delay = self
                        .base_delay
                        .saturating_mul(1u32 << shift)
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
