//! MarketWatch stock news listing.

use super::urls::resolve_url;
use super::{ListingItem, NewsEndpoint};
use crate::dates::parse_news_timestamp;
use crate::error::ParseError;
use crate::scrapers::text_of;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.article__content").expect("valid selector"));
/// List root of the news tab, present even when it holds no articles.
static LIST_ROOT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.collection__elements").expect("valid selector"));
static LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.link[href]").expect("valid selector"));
static TIMESTAMP: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.article__timestamp").expect("valid selector"));

const DEFAULT_BASE: &str = "https://www.marketwatch.com";

#[derive(Debug, Clone)]
pub struct MarketWatchNews {
    base: String,
}

impl Default for MarketWatchNews {
    fn default() -> Self {
        Self::with_base(DEFAULT_BASE)
    }
}

impl MarketWatchNews {
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }
}

impl NewsEndpoint for MarketWatchNews {
    fn name(&self) -> &'static str {
        "marketwatch"
    }

    fn listing_url(&self, ticker: &str) -> String {
        format!("{}/investing/stock/{}/news", self.base, ticker.to_lowercase())
    }

    fn parse_listing(
        &self,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ListingItem>, ParseError> {
        let document = Html::parse_document(body);
        let has_list = document.select(&LIST_ROOT).next().is_some();
        if !has_list && document.select(&ITEM).next().is_none() {
            return Err(ParseError::new(self.name(), "no article list on news tab"));
        }
        let items = document
            .select(&ITEM)
            .filter_map(|item| {
                let link = item.select(&LINK).next()?;
                let url = resolve_url(&self.base, link.value().attr("href")?)?;
                let title = text_of(link);
                if title.is_empty() {
                    return None;
                }
                // data-est carries an ISO timestamp; the text is "Apr. 30, 2024 at 4:05 p.m. ET"
                let published_at = item.select(&TIMESTAMP).next().and_then(|ts| {
                    ts.value()
                        .attr("data-est")
                        .and_then(|raw| parse_news_timestamp(raw, now))
                        .or_else(|| parse_news_timestamp(&text_of(ts), now))
                });
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
    use chrono::TimeZone;

    #[test]
    fn parses_article_content_blocks() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let html = r#"
<div class="article__content">
  <h3 class="article__headline"><a class="link" href="https://www.marketwatch.com/story/amd-stock-falls-after-earnings-11714508">AMD stock falls after earnings</a></h3>
  <div class="content--secondary"><span class="article__timestamp">Apr. 30, 2024 at 4:05 p.m. ET</span></div>
</div>
<div class="article__content">
  <h3><a class="link" href="/story/chip-stocks">Chip stocks rally</a></h3>
</div>
<div class="article__content"><h3><a href="/story/no-class">Ignored</a></h3></div>"#;
        let items = MarketWatchNews::default().parse_listing(html, now).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "AMD stock falls after earnings");
        assert_eq!(
            items[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 4, 30, 16, 5, 0).unwrap())
        );
        assert_eq!(items[1].url, "https://www.marketwatch.com/story/chip-stocks");
    }

    #[test]
    fn empty_list_root_is_empty_listing() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let html = r#"<div class="collection__elements j-scrollElement"></div>"#;
        let items = MarketWatchNews::default().parse_listing(html, now).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn captcha_page_is_parse_error() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let html = r#"<html><body><h1>Please verify you are a human</h1>
<div id="px-captcha"></div></body></html>"#;
        let err = MarketWatchNews::default().parse_listing(html, now).unwrap_err();
        assert_eq!(err.source_name, "marketwatch");
    }

    #[test]
    fn listing_url_lowercases_ticker() {
        assert_eq!(
            MarketWatchNews::default().listing_url("AMD"),
            "https://www.marketwatch.com/investing/stock/amd/news"
        );
    }
}
