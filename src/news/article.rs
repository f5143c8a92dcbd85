//! Article page extraction: body text, title, and publish time.
//!
//! Body text is the article's paragraphs (`article p`, else every `p`),
//! keeping only those long enough to be prose. The publish time is looked up
//! in this order:
//!
//! 1. `<meta>` tags (`article:published_time`, `pubdate`, `datePublished`, ...)
//! 2. the first `<time datetime>`
//! 3. `datePublished` in a JSON-LD block, including `@graph` arrays

use crate::dates::parse_news_timestamp;
use crate::scrapers::text_of;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

static ARTICLE_PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article p").expect("valid selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));
static PUBLISHED_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"meta[property="article:published_time"], meta[name="article:published_time"],
           meta[name="pubdate"], meta[name="publishdate"], meta[itemprop="datePublished"],
           meta[name="parsely-pub-date"], meta[name="date"]"#,
    )
    .expect("valid selector")
});
static TIME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("valid selector"));
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector"));

/// Paragraphs shorter than this are navigation, captions, or share links.
const MIN_PARAGRAPH_CHARS: usize = 40;

/// What could be pulled out of one article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: Option<String>,
    /// Paragraphs separated by blank lines. Empty when nothing looked like prose.
    pub text: String,
    pub published_at: Option<DateTime<Utc>>,
}

pub fn extract_article(html: &str, now: DateTime<Utc>) -> ExtractedArticle {
    let document = Html::parse_document(html);

    let paragraphs = |selector: &Selector| -> Vec<String> {
        document
            .select(selector)
            .map(text_of)
            .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
            .collect()
    };
    let mut body = paragraphs(&ARTICLE_PARAGRAPH);
    if body.is_empty() {
        body = paragraphs(&PARAGRAPH);
    }

    let title = document
        .select(&OG_TITLE)
        .find_map(|m| m.value().attr("content"))
        .map(|t| t.trim().to_string())
        .or_else(|| document.select(&TITLE).next().map(text_of))
        .filter(|t| !t.is_empty());

    ExtractedArticle {
        title,
        text: body.join("\n\n"),
        published_at: published_at(&document, now),
    }
}

fn published_at(document: &Html, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    document
        .select(&PUBLISHED_META)
        .filter_map(|m| m.value().attr("content"))
        .find_map(|raw| parse_news_timestamp(raw, now))
        .or_else(|| {
            document
                .select(&TIME)
                .filter_map(|t| t.value().attr("datetime"))
                .find_map(|raw| parse_news_timestamp(raw, now))
        })
        .or_else(|| {
            document
                .select(&JSON_LD)
                .filter_map(|script| {
                    serde_json::from_str::<Value>(&script.text().collect::<String>()).ok()
                })
                .find_map(|value| json_ld_date(&value))
                .and_then(|raw| parse_news_timestamp(&raw, now))
        })
}

/// First `datePublished` in a JSON-LD value, searching arrays and `@graph`.
fn json_ld_date(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("datePublished")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| map.get("@graph").and_then(json_ld_date)),
        Value::Array(items) => items.iter().find_map(json_ld_date),
        _ => None,
    }
}
