//! Selector configuration for product page extraction
//!
//! Each field carries an ordered list of CSS selectors. The first selector
//! whose first match has non-empty text wins.

use serde::{Deserialize, Serialize};

/// CSS selectors for product detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPageSelectors {
    pub name: Vec<String>,
    pub price: Vec<String>,
    pub brand: Vec<String>,

    /// Fibre count has no structured-data source, selectors are the only path
    pub fibre_count: Vec<String>,
}

impl ProductPageSelectors {
    /// Field name and selector list pairs, in record column order
    pub fn fields(&self) -> [(&'static str, &[String]); 4] {
        [
            ("name", &self.name),
            ("price", &self.price),
            ("brand", &self.brand),
            ("fibre_count", &self.fibre_count),
        ]
    }
}

impl Default for ProductPageSelectors {
    fn default() -> Self {
        Self {
            name: vec![
                "h1.product-title".to_string(),
                "h1.product-name".to_string(),
                "h1.product_title".to_string(),
                "[itemprop='name']".to_string(),
                ".product-title".to_string(),
                ".product-name".to_string(),
                "h1".to_string(),
            ],
            price: vec![
                "[itemprop='price']".to_string(),
                ".price .amount".to_string(),
                ".product-price".to_string(),
                ".price-current".to_string(),
                ".sale-price".to_string(),
                "span.price".to_string(),
                ".price".to_string(),
            ],
            brand: vec![
                "[itemprop='brand']".to_string(),
                ".product-brand".to_string(),
                ".brand-name".to_string(),
                ".brand".to_string(),
                "a[href*='/brand']".to_string(),
            ],
            fibre_count: vec![
                ".fibre-count".to_string(),
                ".fiber-count".to_string(),
                "[data-attribute='fibre-count']".to_string(),
                ".fibre-content".to_string(),
                ".fiber-content".to_string(),
                ".product-composition".to_string(),
            ],
        }
    }
}
