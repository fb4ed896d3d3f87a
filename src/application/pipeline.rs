//! One scrape request end to end: discovery, resolution, classification,
//! scraping and persistence

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::product::ScrapeBatch;
use crate::domain::url_classifier::classify_urls;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::crawl_error::CrawlResult;
use crate::infrastructure::export::{BatchSink, CsvSink, JsonSink};
use crate::infrastructure::http_client::Fetcher;
use crate::infrastructure::robots::RobotsDiscoverer;
use crate::infrastructure::site_url::{normalize_url, origin_of};
use crate::infrastructure::sitemap_resolver::SitemapResolver;

use super::product_scraper::ProductScraper;

/// A sitemap that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapFailure {
    pub url: String,
    pub error: String,
}

/// Everything a scrape request produced
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub target_url: String,
    /// Sitemaps found via robots.txt and path probing
    pub sitemaps: Vec<String>,
    pub sitemap_errors: Vec<SitemapFailure>,
    pub page_url_count: usize,
    pub buckets: BTreeMap<&'static str, usize>,
    pub product_url_count: usize,
    pub batch: ScrapeBatch,
    /// Primary (CSV) export
    pub output_path: PathBuf,
}

pub struct ScrapePipeline {
    discoverer: RobotsDiscoverer,
    resolver: SitemapResolver,
    scraper: ProductScraper,
    sinks: Vec<Box<dyn BatchSink>>,
    url_limit: Option<usize>,
    output_path: PathBuf,
}

impl ScrapePipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &AppConfig) -> CrawlResult<Self> {
        let mut sinks: Vec<Box<dyn BatchSink>> = vec![Box::new(CsvSink::new(&config.output.csv_path))];
        if let Some(json_path) = &config.output.json_path {
            sinks.push(Box::new(JsonSink::new(json_path)));
        }

        Ok(Self {
            discoverer: RobotsDiscoverer::new(fetcher.clone(), config.http.clone()),
            resolver: SitemapResolver::new(fetcher.clone(), config.http.clone()),
            scraper: ProductScraper::new(fetcher, &config.http, &config.scraping)?,
            sinks,
            url_limit: config.scraping.url_limit(),
            output_path: config.output.csv_path.clone(),
        })
    }

    /// Run the whole pipeline for `target`.
    ///
    /// Only an unusable target URL or a failing sink is an error; sitemap
    /// and page failures are reported inside the result.
    pub async fn run(&self, target: &str) -> CrawlResult<ScrapeReport> {
        let target_url = normalize_url(target)?;
        let origin = origin_of(&target_url);
        info!("🔍 Starting scrape for {}", origin);

        let sitemaps = self.discoverer.discover(target_url.as_str()).await;

        let mut page_urls = Vec::new();
        let mut sitemap_errors = Vec::new();

        let results = if sitemaps.is_empty() {
            info!("No sitemaps discovered, resolving {} directly", target_url);
            vec![self.resolver.resolve(target_url.as_str(), true).await]
        } else {
            let mut results = Vec::with_capacity(sitemaps.len());
            for sitemap in &sitemaps {
                results.push(self.resolver.resolve_sitemap(sitemap, true).await);
            }
            results
        };

        for result in results {
            if let Some(error) = result.error {
                warn!("Sitemap {} failed: {}", result.source_url, error);
                sitemap_errors.push(SitemapFailure {
                    url: result.source_url,
                    error,
                });
            }
            page_urls.extend(result.page_urls);
        }
        info!("📄 Collected {} page URL(s)", page_urls.len());

        let buckets = classify_urls(&page_urls);
        let bucket_counts: BTreeMap<&'static str, usize> = buckets.counts().into_iter().collect();
        let product_urls = buckets.products;
        info!("🛒 {} product URL(s) after classification", product_urls.len());

        let batch = self.scraper.scrape_all(&product_urls, self.url_limit).await;

        let mut output_path = self.output_path.clone();
        for (i, sink) in self.sinks.iter().enumerate() {
            let written = sink.write_batch(&batch)?;
            if i == 0 {
                output_path = written;
            }
        }

        info!("✅ Scrape finished: {} record(s)", batch.len());

        Ok(ScrapeReport {
            target_url: target_url.to_string(),
            sitemaps,
            sitemap_errors,
            page_url_count: page_urls.len(),
            buckets: bucket_counts,
            product_url_count: product_urls.len(),
            batch,
            output_path,
        })
    }
}
