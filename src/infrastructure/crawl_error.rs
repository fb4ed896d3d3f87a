//! Error taxonomy for fetching, sitemap parsing and export
//!
//! Extraction misses are not errors: a field that cannot be found is an
//! `Option::None` on the record. Everything here either becomes the `error`
//! string of a sitemap result or is absorbed into an empty product record,
//! except `InvalidUrl` on the inbound target and sink failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    Network {
        url: String,
        reason: String,
        timed_out: bool,
    },

    #[error("{status} for url: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("{reason}")]
    XmlParse { reason: String },

    #[error("Invalid CSS selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CrawlError {
    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn xml_parse(reason: impl ToString) -> Self {
        Self::XmlParse {
            reason: reason.to_string(),
        }
    }

    /// Build a network error from a reqwest failure, keeping the timeout flag
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }
}

pub type CrawlResult<T> = Result<T, CrawlError>;
