//! Sitemap resolution
//!
//! A sitemap URL is fetched and parsed either as a `<sitemapindex>` or as a
//! `<urlset>`. Indexes are followed exactly one level deep. When the top-level
//! fetch fails, the first `Sitemap:` line of the site's robots.txt is tried
//! once, without following indexes.

use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, info, warn};

use crate::domain::sitemap::SitemapResult;
use crate::infrastructure::config::HttpConfig;
use crate::infrastructure::crawl_error::{CrawlError, CrawlResult};
use crate::infrastructure::http_client::{FetchRequest, Fetcher};
use crate::infrastructure::site_url::{normalize_url, origin_of, resolve_against};

/// `<loc>` values of one sitemap document, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// From `<sitemap><loc>` entries (index documents)
    pub sitemap_locs: Vec<String>,
    /// From `<url><loc>` entries (urlset documents)
    pub page_locs: Vec<String>,
}

impl SitemapDocument {
    pub fn is_index(&self) -> bool {
        !self.sitemap_locs.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Entry {
    Sitemap,
    Url,
}

/// Parse a sitemap body. Elements are matched by local name, so both the
/// `sitemaps.org` namespace and bare documents are accepted.
///
/// An empty or whitespace-only body is an empty document. Anything that is
/// not a single well-formed root element is an error; gzip bodies are not
/// decompressed and fail here.
pub fn parse_sitemap_document(body: &[u8]) -> CrawlResult<SitemapDocument> {
    let mut document = SitemapDocument::default();
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(document);
    }

    let mut reader = Reader::from_reader(body);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut roots = 0usize;
    // Entry kind plus the depth of its element; only direct <loc> children count
    let mut entry: Option<(Entry, usize)> = None;
    let mut loc: Option<String> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            CrawlError::xml_parse(format!("{} at position {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    roots += 1;
                    if roots > 1 {
                        return Err(CrawlError::xml_parse("junk after document element"));
                    }
                }
                depth += 1;
                match e.local_name().as_ref() {
                    b"sitemap" => entry = Some((Entry::Sitemap, depth)),
                    b"url" => entry = Some((Entry::Url, depth)),
                    b"loc" if entry.is_some_and(|(_, level)| depth == level + 1) => loc = Some(String::new()),
                    _ => {}
                }
            }
            Event::Empty(_) => {
                if depth == 0 {
                    roots += 1;
                    if roots > 1 {
                        return Err(CrawlError::xml_parse("junk after document element"));
                    }
                }
            }
            Event::Text(t) => {
                if depth == 0 {
                    return Err(CrawlError::xml_parse("text outside the root element"));
                }
                if let Some(current) = loc.as_mut() {
                    let text = t.unescape().map_err(|e| CrawlError::xml_parse(e.to_string()))?;
                    current.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(current) = loc.as_mut() {
                    current.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                let closing = depth;
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"loc" => {
                        if let (Some(value), Some((kind, _))) = (loc.take(), entry) {
                            let value = value.trim();
                            if !value.is_empty() {
                                match kind {
                                    Entry::Sitemap => document.sitemap_locs.push(value.to_string()),
                                    Entry::Url => document.page_locs.push(value.to_string()),
                                }
                            }
                        }
                    }
                    b"sitemap" | b"url" if entry.is_some_and(|(_, level)| level == closing) => entry = None,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if roots == 0 {
        return Err(CrawlError::xml_parse("no element found"));
    }
    if depth > 0 {
        return Err(CrawlError::xml_parse("unclosed element at end of document"));
    }

    Ok(document)
}

/// Sitemap URL actually requested for an input, plus its site origin.
///
/// The input is used as-is only when it mentions "sitemap"; otherwise
/// `/sitemap.xml` on its origin is assumed.
pub fn sitemap_target(input: &str) -> CrawlResult<(String, String)> {
    let url = normalize_url(input)?;
    let origin = origin_of(&url);
    let sitemap_url = if url.as_str().to_lowercase().contains("sitemap") {
        url.to_string()
    } else {
        format!("{origin}/sitemap.xml")
    };
    Ok((sitemap_url, origin))
}

/// First `sitemap:` line of a robots.txt body, resolved against `origin`
pub fn first_robots_sitemap(robots_txt: &str, origin: &str) -> Option<String> {
    robots_txt.lines().find_map(|line| {
        let line = line.trim();
        let (key, value) = line.split_once(':')?;
        if !key.eq_ignore_ascii_case("sitemap") {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| resolve_against(origin, value))
    })
}

enum ResolveState {
    DirectFetch {
        url: String,
        follow_index: bool,
        allow_fallback: bool,
    },
    RobotsFallback {
        origin: String,
        cause: CrawlError,
    },
}

pub struct SitemapResolver {
    fetcher: Arc<dyn Fetcher>,
    config: HttpConfig,
}

impl SitemapResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: HttpConfig) -> Self {
        Self { fetcher, config }
    }

    /// Resolve an entry URL into its page URLs.
    ///
    /// Inputs that do not mention "sitemap" are replaced by `/sitemap.xml` on
    /// their origin. Failures are reported through `SitemapResult::error`,
    /// never as `Err`. Page URLs are concatenated in child order without
    /// deduplication.
    pub async fn resolve(&self, url: &str, follow_index: bool) -> SitemapResult {
        match sitemap_target(url) {
            Ok((sitemap_url, origin)) => self.resolve_from(sitemap_url, origin, follow_index).await,
            Err(e) => SitemapResult::failed(url, format!("Error fetching sitemap: {e}")),
        }
    }

    /// Resolve a known sitemap URL, fetched exactly as given
    pub async fn resolve_sitemap(&self, url: &str, follow_index: bool) -> SitemapResult {
        match normalize_url(url) {
            Ok(sitemap_url) => {
                let origin = origin_of(&sitemap_url);
                self.resolve_from(sitemap_url.to_string(), origin, follow_index).await
            }
            Err(e) => SitemapResult::failed(url, format!("Error fetching sitemap: {e}")),
        }
    }

    async fn resolve_from(&self, sitemap_url: String, origin: String, follow_index: bool) -> SitemapResult {
        let mut state = ResolveState::DirectFetch {
            url: sitemap_url,
            follow_index,
            allow_fallback: true,
        };

        loop {
            state = match state {
                ResolveState::DirectFetch {
                    url,
                    follow_index,
                    allow_fallback,
                } => match self.fetch_body(&url).await {
                    Ok(body) => return self.read_document(&url, &origin, &body, follow_index).await,
                    Err(cause) if allow_fallback => {
                        debug!("Sitemap fetch failed for {}, trying robots.txt: {}", url, cause);
                        ResolveState::RobotsFallback {
                            origin: origin.clone(),
                            cause,
                        }
                    }
                    Err(cause) => {
                        return SitemapResult::failed(url, format!("Error fetching sitemap: {cause}"));
                    }
                },
                ResolveState::RobotsFallback { origin, cause } => match self.robots_sitemap(&origin).await {
                    Some(found) => {
                        info!("Falling back to robots.txt sitemap {}", found);
                        ResolveState::DirectFetch {
                            url: found,
                            follow_index: false,
                            allow_fallback: false,
                        }
                    }
                    None => {
                        return SitemapResult::failed(
                            format!("{origin}/sitemap.xml"),
                            format!("Error fetching sitemap: {cause}"),
                        );
                    }
                },
            };
        }
    }

    async fn read_document(&self, url: &str, origin: &str, body: &[u8], follow_index: bool) -> SitemapResult {
        let document = match parse_sitemap_document(body) {
            Ok(document) => document,
            Err(e) => return SitemapResult::failed(url, format!("Error parsing XML: {e}")),
        };

        let mut result = SitemapResult::new(url);

        if document.is_index() && follow_index {
            for child in &document.sitemap_locs {
                let child = resolve_against(origin, child);
                result.child_sitemap_urls.push(child.clone());

                let child_result = self.resolve_leaf(&child, origin).await;
                if let Some(error) = &child_result.error {
                    warn!("Error in child sitemap {}: {}", child, error);
                }
                result.page_urls.extend(child_result.page_urls);
            }
            info!(
                "📑 Sitemap index {}: {} children, {} page URLs",
                url,
                result.child_sitemap_urls.len(),
                result.page_urls.len()
            );
        } else {
            result.page_urls = document
                .page_locs
                .iter()
                .map(|loc| resolve_against(origin, loc))
                .collect();
            debug!("Sitemap {}: {} page URLs", url, result.page_urls.len());
        }

        result
    }

    /// Child sitemap: urlset branch only, no fallback
    async fn resolve_leaf(&self, url: &str, origin: &str) -> SitemapResult {
        let body = match self.fetch_body(url).await {
            Ok(body) => body,
            Err(e) => return SitemapResult::failed(url, format!("Error fetching sitemap: {e}")),
        };

        match parse_sitemap_document(&body) {
            Ok(document) => SitemapResult {
                page_urls: document
                    .page_locs
                    .iter()
                    .map(|loc| resolve_against(origin, loc))
                    .collect(),
                ..SitemapResult::new(url)
            },
            Err(e) => SitemapResult::failed(url, format!("Error parsing XML: {e}")),
        }
    }

    async fn fetch_body(&self, url: &str) -> CrawlResult<Vec<u8>> {
        let request = FetchRequest::get(url)
            .with_timeout(self.config.request_timeout())
            .with_user_agent(&self.config.sitemap_user_agent);
        let response = self.fetcher.fetch(request).await?.error_for_status(url)?;
        Ok(response.body)
    }

    async fn robots_sitemap(&self, origin: &str) -> Option<String> {
        let robots_url = format!("{origin}/robots.txt");
        let request = FetchRequest::get(&robots_url)
            .with_timeout(self.config.robots_timeout())
            .with_user_agent(&self.config.robots_user_agent);

        match self.fetcher.fetch(request).await {
            Ok(response) if response.status == 200 => first_robots_sitemap(&response.text(), origin),
            Ok(response) => {
                debug!("{} returned {}", robots_url, response.status);
                None
            }
            Err(e) => {
                debug!("robots.txt unavailable: {}", e);
                None
            }
        }
    }
}
