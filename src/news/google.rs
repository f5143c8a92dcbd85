//! Google News RSS search.
//!
//! The feed is deserialized with `quick-xml`'s serde support. Links point at
//! Google redirect pages; they are kept as-is and resolve on download.

use super::{ListingItem, NewsEndpoint};
use crate::dates::parse_news_timestamp;
use crate::error::ParseError;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

const DEFAULT_BASE: &str = "https://news.google.com/rss/search";

/// Google returns dozens of loosely related hits; only the top few are useful.
const LISTING_LIMIT: usize = 3;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleNews {
    base: String,
}

impl Default for GoogleNews {
    fn default() -> Self {
        Self::with_base(DEFAULT_BASE)
    }
}

impl GoogleNews {
    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl NewsEndpoint for GoogleNews {
    fn name(&self) -> &'static str {
        "google_news"
    }

    fn listing_url(&self, ticker: &str) -> String {
        let query = format!("{ticker} stock earnings financial news");
        format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            self.base,
            urlencoding::encode(&query)
        )
    }

    fn parse_listing(
        &self,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ListingItem>, ParseError> {
        let rss: Rss = from_str(body)
            .map_err(|e| ParseError::new(self.name(), format!("invalid RSS: {e}")))?;
        let items = rss
            .channel
            .items
            .into_iter()
            .filter_map(|item| {
                let url = item.link?.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return None;
                }
                let title = item.title.unwrap_or_default().trim().to_string();
                let published_at = item.pub_date.and_then(|raw| parse_news_timestamp(&raw, now));
                Some(ListingItem {
                    title,
                    url,
                    published_at,
                })
            })
            .take(LISTING_LIMIT)
            .collect();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"AAPL stock earnings financial news" - Google News</title>
    <link>https://news.google.com/search?q=AAPL</link>
    <item>
      <title>Apple earnings: what to expect - Reuters</title>
      <link>https://news.google.com/rss/articles/CBMi1</link>
      <pubDate>Tue, 30 Apr 2024 14:00:00 GMT</pubDate>
    </item>
    <item>
      <title>No link here</title>
    </item>
    <item>
      <title>Second</title>
      <link>https://news.google.com/rss/articles/CBMi2</link>
    </item>
    <item><title>Third</title><link>https://news.google.com/rss/articles/CBMi3</link></item>
    <item><title>Fourth</title><link>https://news.google.com/rss/articles/CBMi4</link></item>
  </channel>
</rss>"#;

    #[test]
    fn parses_feed_and_caps_items() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let items = GoogleNews::default().parse_listing(FEED, now).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Apple earnings: what to expect - Reuters");
        assert_eq!(
            items[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 4, 30, 14, 0, 0).unwrap())
        );
        assert_eq!(items[2].url, "https://news.google.com/rss/articles/CBMi3");
    }

    #[test]
    fn empty_channel_is_empty_listing() {
        let xml = "<rss><channel><title>nothing</title></channel></rss>";
        let items = GoogleNews::default().parse_listing(xml, Utc::now()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn html_error_page_is_parse_error() {
        let err = GoogleNews::default()
            .parse_listing("<html><body>unusual traffic</body></html>", Utc::now())
            .unwrap_err();
        assert_eq!(err.source_name, "google_news");
    }

    #[test]
    fn query_is_url_encoded() {
        let url = GoogleNews::default().listing_url("AAPL");
        assert_eq!(
            url,
            "https://news.google.com/rss/search?q=AAPL%20stock%20earnings%20financial%20news&hl=en-US&gl=US&ceid=US:en"
        );
    }
}
