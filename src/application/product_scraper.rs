//! Sequential product page scraping
//!
//! Pages are fetched one at a time with a fixed pause after each. A page that
//! cannot be fetched becomes an empty record; the batch always has one record
//! per processed URL, in input order.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::product::{ProductRecord, ScrapeBatch};
use crate::infrastructure::config::{HttpConfig, ScrapingConfig};
use crate::infrastructure::crawl_error::CrawlResult;
use crate::infrastructure::http_client::{FetchRequest, Fetcher};
use crate::infrastructure::parsing::ProductPageParser;

pub struct ProductScraper {
    fetcher: Arc<dyn Fetcher>,
    parser: ProductPageParser,
    user_agent: String,
    timeout: Duration,
    delay: Duration,
}

impl ProductScraper {
    pub fn new(fetcher: Arc<dyn Fetcher>, http: &HttpConfig, scraping: &ScrapingConfig) -> CrawlResult<Self> {
        Ok(Self {
            fetcher,
            parser: ProductPageParser::with_config(&scraping.selectors)?,
            user_agent: http.browser_user_agent.clone(),
            timeout: http.request_timeout(),
            delay: scraping.request_delay(),
        })
    }

    /// Fetch and parse one page; any failure yields an empty record
    pub async fn scrape_page(&self, url: &str) -> ProductRecord {
        let request = FetchRequest::get(url)
            .with_timeout(self.timeout)
            .with_user_agent(&self.user_agent);

        let response = match self.fetcher.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                return ProductRecord::empty(url);
            }
        };

        match response.error_for_status(url) {
            Ok(response) => self.parser.parse(url, &response.text()),
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                ProductRecord::empty(url)
            }
        }
    }

    /// Scrape `urls` in order, stopping after `limit` pages when given
    pub async fn scrape_all(&self, urls: &[String], limit: Option<usize>) -> ScrapeBatch {
        let started_at = Utc::now();

        let selected = match limit {
            Some(limit) => {
                let count = limit.min(urls.len());
                info!("🧪 TEST MODE ACTIVE: scraping first {} of {} URLs", count, urls.len());
                &urls[..count]
            }
            None => urls,
        };

        info!("🚀 Scraping {} product page(s)", selected.len());

        let mut records = Vec::with_capacity(selected.len());
        for (i, url) in selected.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, selected.len(), url);
            records.push(self.scrape_page(url).await);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        let batch = ScrapeBatch::new(records, started_at);
        match batch.average_price {
            Some(average) => info!(
                "💰 Average price: {:.2} ({} of {} priced)",
                average,
                batch.priced_count(),
                batch.len()
            ),
            None => info!("💰 No prices found in {} record(s)", batch.len()),
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::FibreCount;
    use crate::infrastructure::crawl_error::CrawlError;
    use crate::infrastructure::http_client::FetchResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves a fixed body for URLs containing "/ok", fails everything else
    struct StubFetcher {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, request: FetchRequest) -> CrawlResult<FetchResponse> {
            self.seen.lock().unwrap().push(request.url.clone());
            if request.url.contains("/ok") {
                Ok(FetchResponse {
                    status: 200,
                    body: br#"<html><body><h1>Scarf</h1><span class="price">$10.00</span></body></html>"#.to_vec(),
                })
            } else if request.url.contains("/gone") {
                Ok(FetchResponse { status: 404, body: Vec::new() })
            } else {
                Err(CrawlError::Network {
                    url: request.url,
                    reason: "connection refused".to_string(),
                    timed_out: false,
                })
            }
        }
    }

    fn scraper(fetcher: Arc<StubFetcher>) -> ProductScraper {
        let scraping = ScrapingConfig {
            request_delay_ms: 0,
            ..ScrapingConfig::default()
        };
        ProductScraper::new(fetcher, &HttpConfig::default(), &scraping).unwrap()
    }

    #[tokio::test]
    async fn test_failures_become_empty_records_and_batch_continues() {
        let fetcher = Arc::new(StubFetcher { seen: Mutex::new(Vec::new()) });
        let scraper = scraper(fetcher.clone());

        let urls = vec![
            "https://example.com/down/1".to_string(),
            "https://example.com/gone/2".to_string(),
            "https://example.com/ok/3".to_string(),
        ];
        let batch = scraper.scrape_all(&urls, None).await;

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records[0], ProductRecord::empty("https://example.com/down/1"));
        assert_eq!(batch.records[1].fibre_count, FibreCount::NotAvailable);
        assert_eq!(batch.records[2].name.as_deref(), Some("Scarf"));
        assert_eq!(batch.average_price, Some(10.0));
        assert_eq!(fetcher.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_limit_caps_processed_urls() {
        let fetcher = Arc::new(StubFetcher { seen: Mutex::new(Vec::new()) });
        let scraper = scraper(fetcher.clone());

        let urls: Vec<String> = (0..15).map(|i| format!("https://example.com/ok/{i}")).collect();
        let batch = scraper.scrape_all(&urls, Some(10)).await;

        assert_eq!(batch.len(), 10);
        assert_eq!(batch.records[9].url, "https://example.com/ok/9");
        assert_eq!(fetcher.seen.lock().unwrap().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_follows_every_page() {
        let fetcher = Arc::new(StubFetcher { seen: Mutex::new(Vec::new()) });
        let scraping = ScrapingConfig {
            request_delay_ms: 500,
            ..ScrapingConfig::default()
        };
        let scraper = ProductScraper::new(fetcher, &HttpConfig::default(), &scraping).unwrap();

        let urls: Vec<String> = (0..3).map(|i| format!("https://example.com/ok/{i}")).collect();
        let start = tokio::time::Instant::now();
        let batch = scraper.scrape_all(&urls, None).await;

        assert_eq!(batch.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_browser_user_agent_is_sent() {
        struct AgentCheck;

        #[async_trait]
        impl Fetcher for AgentCheck {
            async fn fetch(&self, request: FetchRequest) -> CrawlResult<FetchResponse> {
                assert!(request.user_agent().is_some_and(|ua| ua.contains("Chrome")));
                Ok(FetchResponse { status: 200, body: Vec::new() })
            }
        }

        let scraper = ProductScraper::new(Arc::new(AgentCheck), &HttpConfig::default(), &ScrapingConfig::default())
            .unwrap();
        let record = scraper.scrape_page("https://example.com/p/1").await;
        assert!(record.is_empty());
    }
}
