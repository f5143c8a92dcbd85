//! Yahoo Finance quote news listing.

use super::urls::resolve_url;
use super::{ListingItem, NewsEndpoint};
use crate::dates::parse_news_timestamp;
use crate::error::ParseError;
use crate::scrapers::text_of;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static ITEM: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[class~="Ov(h)"], section[data-testid="storyitem"], li.stream-item"#)
        .expect("valid selector")
});
/// Stream containers that exist even when a ticker has no stories.
static STREAM: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"div[id^="quoteNewsStream"], div[id^="latestQuoteNewsStream"],
           [data-testid="news-stream"], ul.stream-items"#,
    )
    .expect("valid selector")
});
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("h3, h2").expect("valid selector"));
static TIMESTAMP: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"span[class~="C(#959595)"], div.publishing, time"#).expect("valid selector")
});

const DEFAULT_BASE: &str = "https://finance.yahoo.com";

#[derive(Debug, Clone)]
pub struct YahooNews {
    base: String,
}

impl Default for YahooNews {
    fn default() -> Self {
        Self::with_base(DEFAULT_BASE)
    }
}

impl YahooNews {
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }
}

impl NewsEndpoint for YahooNews {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn listing_url(&self, ticker: &str) -> String {
        format!("{}/quote/{}/news", self.base, ticker)
    }

    fn parse_listing(
        &self,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ListingItem>, ParseError> {
        let document = Html::parse_document(body);
        let has_stream = document.select(&STREAM).next().is_some();
        if !has_stream && document.select(&ITEM).next().is_none() {
            return Err(ParseError::new(self.name(), "no news stream on quote page"));
        }
        let items = document
            .select(&ITEM)
            .filter_map(|item| {
                let href = item.select(&LINK).next()?.value().attr("href")?;
                let url = resolve_url(&self.base, href)?;
                let title = item.select(&HEADLINE).next().map(text_of).unwrap_or_default();
                if title.is_empty() {
                    return None;
                }
                let published_at = item
                    .select(&TIMESTAMP)
                    .next()
                    .and_then(|ts| {
                        ts.value()
                            .attr("datetime")
                            .map(str::to_string)
                            .or_else(|| Some(text_of(ts)))
                    })
                    .and_then(|raw| parse_news_timestamp(&raw, now));
                Some(ListingItem {
                    title,
                    url,
                    published_at,
                })
            })
            .collect();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn parses_stream_items() {
        let now = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap();
        let html = r#"
<ul>
  <div class="Ov(h) Pend(14px) Pstart(14px)">
    <a href="/news/apple-earnings-preview-123.html"><h3>Apple earnings preview</h3></a>
    <span class="C(#959595) Fz(11px)">3 hours ago</span>
  </div>
  <div class="Ov(h) Pend(14px) Pstart(14px)">
    <a href="https://www.reuters.com/technology/apple-supplier/"><h3>Apple supplier update</h3></a>
  </div>
  <div class="Ov(h) Pend(14px) Pstart(14px)"><h3>No link</h3></div>
  <div class="Ov(h) Pend(14px) Pstart(14px)"><a href="/ad"></a></div>
</ul>"#;
        let items = YahooNews::default().parse_listing(html, now).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://finance.yahoo.com/news/apple-earnings-preview-123.html");
        assert_eq!(items[0].title, "Apple earnings preview");
        assert_eq!(items[0].published_at, Some(now - Duration::hours(3)));
        assert_eq!(items[1].url, "https://www.reuters.com/technology/apple-supplier/");
        assert_eq!(items[1].published_at, None);
    }

    #[test]
    fn empty_stream_is_empty_listing() {
        let now = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap();
        let html = r#"<div id="quoteNewsStream-0-Stream"><ul class="My(0) P(0)"></ul></div>"#;
        let items = YahooNews::default().parse_listing(html, now).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn consent_page_is_parse_error() {
        let now = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap();
        let html = r#"<html><body><form class="consent-form">
<button name="agree">Accept all</button></form></body></html>"#;
        let err = YahooNews::default().parse_listing(html, now).unwrap_err();
        assert_eq!(err.source_name, "yahoo");
    }

    #[test]
    fn listing_url_uses_ticker() {
        assert_eq!(
            YahooNews::with_base("http://127.0.0.1:9999/").listing_url("MSFT"),
            "http://127.0.0.1:9999/quote/MSFT/news"
        );
    }
}
