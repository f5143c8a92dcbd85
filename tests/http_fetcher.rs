//! Integration tests for `HttpFetcher` and `RetryFetch` against a local
//! `wiremock` server, so no real network traffic is made.

use std::time::Duration;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use earnings_radar::config::{DEFAULT_USER_AGENT, FetchSettings};
use earnings_radar::{Fetch, FetchFailure, HttpFetcher, RetryFetch};

/// Compares the raw header value. `matchers::header` splits values on
/// commas, which breaks on user agents like "(KHTML, like Gecko)".
struct ExactHeader(&'static str, &'static str);

impl Match for ExactHeader {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .get(self.0)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == self.1)
    }
}

/// No host spacing, short timeout.
fn settings() -> FetchSettings {
    FetchSettings {
        request_timeout_secs: 5,
        min_host_interval_ms: 0,
        host_jitter_ms: 0,
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendar.ashx"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<table class=\"calendar\"></table>"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&settings()).unwrap();
    let body = fetcher
        .fetch("finviz", &format!("{}/calendar.ashx", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<table class=\"calendar\"></table>");
}

#[tokio::test]
async fn sends_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("user-agent"))
        .and(ExactHeader("user-agent", DEFAULT_USER_AGENT))
        .and(header_exists("accept-language"))
        .and(header_exists("accept"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&settings()).unwrap();
    let body = fetcher.fetch("yahoo", &server.uri()).await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn non_success_status_is_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&settings()).unwrap();

    let err = fetcher
        .fetch("investing", &format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.reason, FetchFailure::Status(404));
    assert_eq!(err.source_name, "investing");

    let err = fetcher
        .fetch("investing", &format!("{}/broken", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.reason, FetchFailure::Status(500));
    assert!(err.reason.is_transient());
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&FetchSettings {
        request_timeout_secs: 1,
        ..settings()
    })
    .unwrap();
    let err = fetcher.fetch("marketwatch", &server.uri()).await.unwrap_err();
    assert_eq!(err.reason, FetchFailure::Timeout);
}

#[tokio::test]
async fn retry_recovers_from_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let fetcher = RetryFetch::new(HttpFetcher::new(&settings()).unwrap(), 2, Duration::ZERO);
    let body = fetcher.fetch("yahoo", &server.uri()).await.unwrap();
    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn retry_does_not_repeat_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = RetryFetch::new(HttpFetcher::new(&settings()).unwrap(), 3, Duration::ZERO);
    let err = fetcher.fetch("finviz", &server.uri()).await.unwrap_err();
    assert_eq!(err.reason, FetchFailure::Status(403));
}
