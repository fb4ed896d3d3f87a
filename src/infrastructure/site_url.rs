//! Entry URL normalization
//!
//! Inbound targets may be bare hosts ("example.com"); they get `https://`
//! prepended. Everything downstream works on the `scheme://host[:port]`
//! origin of that URL.

use url::Url;

use crate::infrastructure::crawl_error::{CrawlError, CrawlResult};

/// Parse an inbound target, prepending `https://` when no scheme is given
pub fn normalize_url(input: &str) -> CrawlResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CrawlError::invalid_url(input, "empty URL"));
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        return Err(CrawlError::invalid_url(input, "only http and https are supported"));
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| CrawlError::invalid_url(input, e))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(CrawlError::invalid_url(input, "missing host"));
    }
    Ok(url)
}

/// `scheme://host[:port]` without a trailing slash
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Resolve `href` against `origin`; absolute hrefs are returned unchanged
pub fn resolve_against(origin: &str, href: &str) -> String {
    let href = href.trim();
    match Url::parse(origin).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}
