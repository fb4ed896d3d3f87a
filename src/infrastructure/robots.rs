//! Sitemap discovery from robots.txt and conventional paths

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::infrastructure::config::HttpConfig;
use crate::infrastructure::http_client::{FetchRequest, Fetcher};
use crate::infrastructure::site_url::{normalize_url, origin_of};

static SITEMAP_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^Sitemap:\s*(https?://\S+)").expect("sitemap directive pattern is valid"));

/// Paths probed with HEAD on every discovery, in order
pub const CONVENTIONAL_SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemap.xml.gz",
    "/sitemaps/sitemap-index.xml.gz",
    "/sitemaps/sitemap.xml.gz",
];

/// Every absolute `Sitemap:` directive in a robots.txt body
pub fn sitemap_directives(robots_txt: &str) -> Vec<String> {
    SITEMAP_DIRECTIVE
        .captures_iter(robots_txt)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

pub struct RobotsDiscoverer {
    fetcher: Arc<dyn Fetcher>,
    config: HttpConfig,
}

impl RobotsDiscoverer {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: HttpConfig) -> Self {
        Self { fetcher, config }
    }

    /// Collect sitemap URLs for the site of `homepage`.
    ///
    /// Never fails: an unreachable robots.txt or probe simply contributes
    /// nothing. The result is sorted and free of duplicates.
    pub async fn discover(&self, homepage: &str) -> Vec<String> {
        let origin = match normalize_url(homepage) {
            Ok(url) => origin_of(&url),
            Err(e) => {
                warn!("Cannot discover sitemaps for {:?}: {}", homepage, e);
                return Vec::new();
            }
        };

        let mut found = BTreeSet::new();

        let robots_url = format!("{origin}/robots.txt");
        let request = FetchRequest::get(&robots_url)
            .with_timeout(self.config.robots_timeout())
            .with_user_agent(&self.config.robots_user_agent);
        match self.fetcher.fetch(request).await {
            Ok(response) if response.status == 200 => {
                let directives = sitemap_directives(&response.text());
                debug!("{} lists {} sitemap(s)", robots_url, directives.len());
                found.extend(directives);
            }
            Ok(response) => debug!("{} returned {}", robots_url, response.status),
            Err(e) => debug!("robots.txt unavailable: {}", e),
        }

        for path in CONVENTIONAL_SITEMAP_PATHS {
            let candidate = format!("{origin}{path}");
            let request = FetchRequest::head(&candidate)
                .with_timeout(self.config.probe_timeout())
                .with_user_agent(&self.config.robots_user_agent);
            match self.fetcher.fetch(request).await {
                Ok(response) if response.status == 200 => {
                    debug!("Probe hit: {}", candidate);
                    found.insert(candidate);
                }
                Ok(_) => {}
                Err(e) => debug!("Probe failed for {}: {}", candidate, e),
            }
        }

        info!("🗺️ Discovered {} sitemap(s) for {}", found.len(), origin);
        found.into_iter().collect()
    }
}
