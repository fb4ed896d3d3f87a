//! sitemap-scout: sitemap discovery, URL classification and product scraping
//!
//! A site's sitemaps are found through robots.txt and conventional paths,
//! flattened into page URLs, filtered down to likely product pages, and each
//! product page is scraped for name, price, brand and fibre count.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ScrapePipeline;
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::http_client::HttpFetcher;
use crate::infrastructure::logging::{init_logging_with_config, log_system_info};
use crate::web::HttpServer;

/// Load configuration, initialize logging and serve until shutdown
pub async fn run() -> Result<()> {
    let config = ConfigManager::new().load().context("Failed to load configuration")?;

    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();

    if config.scraping.test_mode {
        info!(
            "🧪 Test mode is on: at most {} product pages per request",
            config.scraping.test_mode_limit
        );
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.http).context("Failed to create HTTP client")?);
    let pipeline = Arc::new(ScrapePipeline::new(fetcher, &config).context("Failed to build scrape pipeline")?);

    HttpServer::new(&config, pipeline).run().await
}
