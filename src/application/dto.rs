//! Data Transfer Objects for the web boundary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductRecord;

use super::pipeline::{ScrapeReport, SitemapFailure};

/// `POST /scrape` form body
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequestDto {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResponseDto {
    pub message: String,
    pub total_count: usize,
    pub preview: Vec<ProductRecord>,
    pub average_price: Option<f64>,
    pub product_url_count: usize,
    pub page_url_count: usize,
    pub sitemaps: Vec<String>,
    pub sitemap_errors: Vec<SitemapFailure>,
    pub buckets: BTreeMap<&'static str, usize>,
    pub output_path: String,
}

impl ScrapeResponseDto {
    /// Summarize a report, echoing at most `preview_limit` records
    pub fn from_report(report: ScrapeReport, preview_limit: usize) -> Self {
        let total_count = report.batch.len();
        let message = if total_count == 0 {
            format!("No product pages found for {}", report.target_url)
        } else {
            format!(
                "Scraped {} product page(s), saved to {}",
                total_count,
                report.output_path.display()
            )
        };

        Self {
            message,
            total_count,
            preview: report.batch.records.into_iter().take(preview_limit).collect(),
            average_price: report.batch.average_price,
            product_url_count: report.product_url_count,
            page_url_count: report.page_url_count,
            sitemaps: report.sitemaps,
            sitemap_errors: report.sitemap_errors,
            buckets: report.buckets,
            output_path: report.output_path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub version: String,
}

impl Default for HealthDto {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
