//! Product page parser: structured data first, CSS selectors second
//!
//! Name, price and brand come from the first JSON-LD Product block when it
//! has them; each missing field falls back to its own prioritized selector
//! list. The fibre count is selector-only.

#![allow(clippy::uninlined_format_args)]

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::config::ProductPageSelectors;
use super::price::parse_price;
use super::structured_data::extract_structured_product;
use crate::domain::product::{FibreCount, ProductRecord};
use crate::infrastructure::crawl_error::{CrawlError, CrawlResult};

static FIRST_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// Parser for extracting product fields from a product detail page
pub struct ProductPageParser {
    name_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    brand_selectors: Vec<Selector>,
    fibre_count_selectors: Vec<Selector>,
}

impl ProductPageParser {
    /// Create a parser with the default selector lists
    pub fn new() -> CrawlResult<Self> {
        Self::with_config(&ProductPageSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &ProductPageSelectors) -> CrawlResult<Self> {
        Ok(Self {
            name_selectors: Self::compile_selectors(&selectors.name)?,
            price_selectors: Self::compile_selectors(&selectors.price)?,
            brand_selectors: Self::compile_selectors(&selectors.brand)?,
            fibre_count_selectors: Self::compile_selectors(&selectors.fibre_count)?,
        })
    }

    /// Compile selector strings, skipping invalid ones unless none survive
    fn compile_selectors(selector_strings: &[String]) -> CrawlResult<Vec<Selector>> {
        let mut selectors = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => selectors.push(selector),
                Err(e) => {
                    warn!("Failed to compile selector '{}': {}", selector_str, e);
                    errors.push(format!("'{}': {}", selector_str, e));
                }
            }
        }

        if selectors.is_empty() && !selector_strings.is_empty() {
            return Err(CrawlError::Selector {
                selector: selector_strings.join(", "),
                reason: errors.join(", "),
            });
        }

        Ok(selectors)
    }

    /// Parse a fetched page body into a record for `url`
    pub fn parse(&self, url: &str, body: &str) -> ProductRecord {
        let html = Html::parse_document(body);
        self.parse_document(url, &html)
    }

    pub fn parse_document(&self, url: &str, html: &Html) -> ProductRecord {
        debug!("Parsing product page: {}", url);

        let structured = extract_structured_product(html).unwrap_or_default();

        let name = structured
            .name
            .or_else(|| Self::first_text(html, "name", &self.name_selectors));
        let price_text = structured
            .price
            .or_else(|| Self::first_text(html, "price", &self.price_selectors));
        let brand = structured
            .brand
            .or_else(|| Self::first_text(html, "brand", &self.brand_selectors));
        let fibre_text = Self::first_text(html, "fibre_count", &self.fibre_count_selectors);

        let price = price_text.as_deref().and_then(|text| {
            let parsed = parse_price(text);
            if parsed.is_none() {
                debug!("Unparsable price text on {}: {:?}", url, text);
            }
            parsed
        });

        ProductRecord {
            url: url.to_string(),
            name,
            price,
            brand,
            fibre_count: fibre_count_from_text(fibre_text),
        }
    }

    /// First selector whose first match has non-empty trimmed text
    fn first_text(html: &Html, field_name: &str, selectors: &[Selector]) -> Option<String> {
        for (i, selector) in selectors.iter().enumerate() {
            if let Some(element) = html.select(selector).next() {
                let text = element.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    debug!("Extracted {} using selector {}: {}", field_name, i, text);
                    return Some(text);
                }
            }
        }

        debug!("Failed to extract {} using {} selectors", field_name, selectors.len());
        None
    }
}

/// First run of digits as a count, digit-free text verbatim, absence as NA
pub fn fibre_count_from_text(text: Option<String>) -> FibreCount {
    let Some(text) = text else {
        return FibreCount::NotAvailable;
    };

    match FIRST_DIGITS.find(&text).and_then(|m| m.as_str().parse::<u64>().ok()) {
        Some(count) => FibreCount::Count(count),
        None => FibreCount::Text(text),
    }
}
