//! Embedded product metadata (JSON-LD) extraction
//!
//! Scans `script[type='application/ld+json']` blocks in document order and
//! stops at the first object typed `Product`. Fields that object lacks are
//! left empty for the selector fallback; later Product blocks are never
//! consulted, even when they would be more complete.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

static LD_JSON_SCRIPT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("ld+json selector is valid")
});

/// Fields read from the first Product block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredProduct {
    pub name: Option<String>,

    /// Raw price text, numbers are stringified and normalized later
    pub price: Option<String>,
    pub brand: Option<String>,
}

/// Find the first Product-typed JSON-LD object in the page
pub fn extract_structured_product(html: &Html) -> Option<StructuredProduct> {
    for script in html.select(&LD_JSON_SCRIPT) {
        let raw = script.text().collect::<String>();
        let Ok(document) = serde_json::from_str::<Value>(raw.trim()) else {
            debug!("Skipping unparsable ld+json block ({} bytes)", raw.len());
            continue;
        };

        if let Some(product) = candidate_objects(&document).into_iter().find(|item| is_product(item)) {
            return Some(read_product(product));
        }
    }

    None
}

/// Top-level objects of a block in order, with `@graph` members expanded in place
fn candidate_objects(document: &Value) -> Vec<&Value> {
    let top_level: Vec<&Value> = match document {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut objects = Vec::new();
    for item in top_level {
        objects.push(item);
        if let Some(Value::Array(graph)) = item.get("@graph") {
            objects.extend(graph.iter());
        }
    }
    objects
}

fn is_product(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(kind)) => kind == "Product",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some("Product")),
        _ => false,
    }
}

fn read_product(item: &Value) -> StructuredProduct {
    let offer = match item.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        other => other,
    };

    let brand = match item.get("brand") {
        Some(Value::String(name)) => Some(name.clone()),
        Some(Value::Object(brand)) => brand.get("name").and_then(non_empty_text),
        _ => None,
    };

    StructuredProduct {
        name: item.get("name").and_then(non_empty_text),
        price: offer.and_then(|o| o.get("price")).and_then(non_empty_text),
        brand: brand.filter(|b| !b.trim().is_empty()),
    }
}

/// Strings and numbers as trimmed text, anything else as missing
fn non_empty_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}
