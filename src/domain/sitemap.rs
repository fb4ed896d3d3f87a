use serde::{Deserialize, Serialize};

/// Outcome of resolving one sitemap URL
///
/// `page_urls` keeps discovery order and is not deduplicated: the same page
/// listed by two child sitemaps appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapResult {
    /// Sitemap document that was actually requested
    pub source_url: String,
    pub page_urls: Vec<String>,
    /// `<loc>` of each `<sitemap>` entry when the document was an index
    pub child_sitemap_urls: Vec<String>,
    pub error: Option<String>,
}

impl SitemapResult {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Self::default()
        }
    }

    pub fn failed(source_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
