//! Domain module - scrape records, sitemap results and URL classification
//!
//! Everything here is pure data and pure functions; network access lives in
//! the infrastructure layer.

pub mod product;
pub mod sitemap;
pub mod url_classifier;

pub use product::{FibreCount, ProductRecord, ScrapeBatch, average_price};
pub use sitemap::SitemapResult;
pub use url_classifier::{Bucket, ClassificationBuckets, classify_urls, filter_urls, product_urls};
