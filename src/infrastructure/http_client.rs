//! HTTP fetch capability
//!
//! Every outbound request of the crawler goes through the [`Fetcher`] trait so
//! that the discoverer, resolver and scraper can be exercised against a mock
//! server or an in-memory double. [`HttpFetcher`] is the reqwest-backed
//! implementation; it never retries and applies the timeout of each request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use tracing::{debug, warn};

use crate::infrastructure::config::HttpConfig;
use crate::infrastructure::crawl_error::{CrawlError, CrawlResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMethod {
    Get,
    Head,
}

/// One outbound request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: FetchMethod,
    pub url: String,
    pub timeout: Duration,
    pub headers: HeaderMap,
}

impl FetchRequest {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(FetchMethod::Get, url)
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(FetchMethod::Head, url)
    }

    fn new(method: FetchMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(self, user_agent: &str) -> Self {
        self.with_header(USER_AGENT, user_agent)
    }

    /// Set a header; a value that is not a valid header is dropped with a warning
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(e) => warn!("Ignoring invalid {} header value {:?}: {}", name, value, e),
        }
        self
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }
}

/// Status and raw body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-2xx response into `CrawlError::HttpStatus`
    pub fn error_for_status(self, url: &str) -> CrawlResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CrawlError::HttpStatus {
                status: self.status,
                url: url.to_string(),
            })
        }
    }
}

/// Request/response capability shared by every crawler component
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue the request. Transport failures are `CrawlError::Network`; any
    /// HTTP status, including 4xx/5xx, is returned as a response.
    async fn fetch(&self, request: FetchRequest) -> CrawlResult<FetchResponse>;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> CrawlResult<Self> {
        let client = Client::builder()
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .cookie_store(true)
            .gzip(true)
            .build()
            .map_err(|e| CrawlError::Network {
                url: String::new(),
                reason: format!("Failed to create HTTP client: {e}"),
                timed_out: false,
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> CrawlResult<FetchResponse> {
        let method = match request.method {
            FetchMethod::Get => Method::GET,
            FetchMethod::Head => Method::HEAD,
        };

        debug!("{} {}", method, request.url);

        let response = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout)
            .headers(request.headers)
            .send()
            .await
            .map_err(|e| CrawlError::from_reqwest(&request.url, &e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| CrawlError::from_reqwest(&request.url, &e))?
            .to_vec();

        debug!("{} {} ({} bytes)", status, request.url, body.len());
        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_request_builder() {
        let request = FetchRequest::head("https://example.com/sitemap.xml")
            .with_timeout(Duration::from_secs(8))
            .with_user_agent("Mozilla/5.0");
        assert_eq!(request.method, FetchMethod::Head);
        assert_eq!(request.timeout, Duration::from_secs(8));
        assert_eq!(request.user_agent(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_invalid_header_value_is_dropped() {
        let request = FetchRequest::get("https://example.com").with_user_agent("bad\nagent");
        assert_eq!(request.user_agent(), None);
    }

    #[test]
    fn test_error_for_status() {
        let ok = FetchResponse { status: 204, body: Vec::new() };
        assert!(ok.error_for_status("https://example.com").is_ok());

        let missing = FetchResponse { status: 404, body: b"gone".to_vec() };
        let err = missing.error_for_status("https://example.com/x").unwrap_err();
        assert_eq!(err.to_string(), "404 for url: https://example.com/x");
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent_and_returns_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "TestAgent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();

        let response = fetcher
            .fetch(FetchRequest::get(format!("{}/page", server.uri())).with_user_agent("TestAgent/1.0"))
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(response.text(), "hello");

        let response = fetcher
            .fetch(FetchRequest::get(format!("{}/missing", server.uri())))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let err = fetcher
            .fetch(FetchRequest::get(server.uri()).with_timeout(Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Network { timed_out: true, .. }));
    }
}
