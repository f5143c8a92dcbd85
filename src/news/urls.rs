//! URL normalization for news dedup.
//!
//! The same story reaches us through several listings with different
//! tracking parameters. The normalized form is the article's identity:
//!
//! - scheme and host lower-cased (the `url` crate does this on parse)
//! - fragment removed, trailing slash removed from the path
//! - tracking parameters dropped, the rest sorted by name then value

use url::{Url, form_urlencoded};

/// Exact parameter names that only carry tracking information.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "guccounter", "ncid", "mod", "yptr", "cmpid", "ref", "src", ".tsrc",
    "soc_src", "soc_trk", "mc_cid", "mc_eid", "ocid",
];

/// Parameter name prefixes that only carry tracking information.
const TRACKING_PREFIXES: &[&str] = &["utm_", "guce_referrer"];

fn is_tracking(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&lower.as_str())
        || TRACKING_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Canonical form of an absolute http(s) URL, or `None` if it is not one.
pub fn normalize_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    let mut out = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        out.push_str(&format!(":{port}"));
    }
    out.push_str(url.path().trim_end_matches('/'));
    if !params.is_empty() {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        out.push('?');
        out.push_str(&query);
    }
    Some(out)
}

/// Resolve `href` against the listing page it came from; only http(s) results count.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let joined = Url::parse(base).ok()?.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}
