//! Infrastructure layer: HTTP, sitemap and HTML parsing, configuration,
//! logging and export sinks

pub mod config;
pub mod crawl_error;
pub mod export;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod robots;
pub mod site_url;
pub mod sitemap_resolver;

pub use config::{AppConfig, ConfigError, ConfigManager, HttpConfig, LoggingConfig, ScrapingConfig};
pub use crawl_error::{CrawlError, CrawlResult};
pub use export::{BatchSink, CsvSink, JsonSink};
pub use http_client::{FetchMethod, FetchRequest, FetchResponse, Fetcher, HttpFetcher};
pub use logging::{init_logging_with_config, log_system_info};
pub use parsing::ProductPageParser;
pub use robots::RobotsDiscoverer;
pub use site_url::{normalize_url, origin_of};
pub use sitemap_resolver::{SitemapDocument, SitemapResolver, parse_sitemap_document};
