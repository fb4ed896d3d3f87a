//! Application layer module
//!
//! Use cases that orchestrate the domain and infrastructure layers for one
//! scrape request, plus the DTOs handed to the web boundary.

pub mod dto;
pub mod pipeline;
pub mod product_scraper;

pub use dto::{HealthDto, ScrapeRequestDto, ScrapeResponseDto};
pub use pipeline::{ScrapePipeline, ScrapeReport, SitemapFailure};
pub use product_scraper::ProductScraper;
