//! HTML and structured-data parsing for product pages
//!
//! Selector lists are configuration, JSON-LD is tried before selectors, and
//! price text is normalized to a float in one place.

pub mod config;
pub mod price;
pub mod product_page_parser;
pub mod structured_data;

pub use config::ProductPageSelectors;
pub use price::parse_price;
pub use product_page_parser::{ProductPageParser, fibre_count_from_text};
pub use structured_data::{StructuredProduct, extract_structured_product};
