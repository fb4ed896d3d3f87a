//! Robots discovery and sitemap resolution against a mock site
use std::sync::Arc;

use sitemap_scout_lib::infrastructure::config::HttpConfig;
use sitemap_scout_lib::infrastructure::http_client::{Fetcher, HttpFetcher};
use sitemap_scout_lib::infrastructure::robots::RobotsDiscoverer;
use sitemap_scout_lib::infrastructure::sitemap_resolver::SitemapResolver;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> Arc<dyn Fetcher> {
    Arc::new(HttpFetcher::new(&HttpConfig::default()).unwrap())
}

fn urlset(locs: &[String]) -> String {
    let entries: String = locs.iter().map(|l| format!("<url><loc>{l}</loc></url>")).collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#)
}

fn sitemap_index(locs: &[String]) -> String {
    let entries: String = locs.iter().map(|l| format!("<sitemap><loc>{l}</loc></sitemap>")).collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</sitemapindex>"#)
}

async fn mount_get(server: &MockServer, at: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn discover_uses_probes_when_robots_is_unavailable() {
    let server = MockServer::start().await;
    mount_get(&server, "/robots.txt", 500, String::new()).await;
    Mock::given(method("HEAD"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let discoverer = RobotsDiscoverer::new(fetcher(), HttpConfig::default());
    let found = discoverer.discover(&format!("{}/some/page", server.uri())).await;

    assert_eq!(found, vec![format!("{}/sitemap.xml", server.uri())]);
}

#[tokio::test]
async fn discover_merges_robots_and_probes_without_duplicates() {
    let server = MockServer::start().await;
    let robots = format!(
        "User-agent: *\nSitemap: {uri}/sitemap.xml\nSitemap: {uri}/b-products.xml\n",
        uri = server.uri()
    );
    mount_get(&server, "/robots.txt", 200, robots).await;
    Mock::given(method("HEAD"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let discoverer = RobotsDiscoverer::new(fetcher(), HttpConfig::default());
    let found = discoverer.discover(&server.uri()).await;

    assert_eq!(
        found,
        vec![
            format!("{}/b-products.xml", server.uri()),
            format!("{}/sitemap.xml", server.uri()),
        ]
    );
}

#[tokio::test]
async fn discover_never_fails_for_unreachable_host() {
    let discoverer = RobotsDiscoverer::new(fetcher(), HttpConfig::default());
    assert!(discoverer.discover("http://127.0.0.1:1").await.is_empty());
    assert!(discoverer.discover("not a url at all").await.is_empty());
}

#[tokio::test]
async fn index_with_two_children_yields_pages_in_child_order() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let children = vec![format!("{uri}/sitemap-a.xml"), format!("{uri}/sitemap-b.xml")];

    mount_get(&server, "/sitemap_index.xml", 200, sitemap_index(&children)).await;
    let a: Vec<String> = (1..=3).map(|i| format!("{uri}/product/a{i}")).collect();
    let b: Vec<String> = (1..=3).map(|i| format!("{uri}/product/b{i}")).collect();
    mount_get(&server, "/sitemap-a.xml", 200, urlset(&a)).await;
    mount_get(&server, "/sitemap-b.xml", 200, urlset(&b)).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&format!("{uri}/sitemap_index.xml"), true).await;

    assert!(result.is_ok());
    assert_eq!(result.child_sitemap_urls, children);
    assert_eq!(result.page_urls, [a, b].concat());
}

#[tokio::test]
async fn failing_child_does_not_abort_aggregation() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let children = vec![format!("{uri}/sitemap-broken.xml"), format!("{uri}/sitemap-good.xml")];

    mount_get(&server, "/sitemap_index.xml", 200, sitemap_index(&children)).await;
    mount_get(&server, "/sitemap-broken.xml", 503, String::new()).await;
    let good: Vec<String> = (1..=3).map(|i| format!("{uri}/p/{i}")).collect();
    mount_get(&server, "/sitemap-good.xml", 200, urlset(&good)).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&format!("{uri}/sitemap_index.xml"), true).await;

    assert!(result.error.is_none());
    assert_eq!(result.page_urls, good);
}

#[tokio::test]
async fn index_is_not_followed_when_disabled() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_get(&server, "/sitemap_index.xml", 200, sitemap_index(&[format!("{uri}/sitemap-a.xml")])).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&format!("{uri}/sitemap_index.xml"), false).await;

    assert!(result.is_ok());
    assert!(result.page_urls.is_empty());
    assert!(result.child_sitemap_urls.is_empty());
}

async fn mount_mixed_document(server: &MockServer) -> String {
    let uri = server.uri();
    let body = format!(
        "<sitemapindex><sitemap><loc>{uri}/child.xml</loc></sitemap>\
         <url><loc>{uri}/p/listed</loc></url></sitemapindex>"
    );
    mount_get(server, "/sitemap_mixed.xml", 200, body).await;
    mount_get(server, "/child.xml", 200, urlset(&[format!("{uri}/p/from-child")])).await;
    format!("{uri}/sitemap_mixed.xml")
}

#[tokio::test]
async fn mixed_document_follows_index_entries_when_enabled() {
    let server = MockServer::start().await;
    let url = mount_mixed_document(&server).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&url, true).await;

    assert!(result.is_ok());
    assert_eq!(result.child_sitemap_urls, vec![format!("{}/child.xml", server.uri())]);
    assert_eq!(result.page_urls, vec![format!("{}/p/from-child", server.uri())]);
}

#[tokio::test]
async fn mixed_document_reads_url_entries_when_index_disabled() {
    let server = MockServer::start().await;
    let url = mount_mixed_document(&server).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&url, false).await;

    assert!(result.is_ok());
    assert!(result.child_sitemap_urls.is_empty());
    assert_eq!(result.page_urls, vec![format!("{}/p/listed", server.uri())]);
}

#[tokio::test]
async fn listed_sitemap_is_fetched_at_its_own_path() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let pages = vec![format!("{uri}/product/feed")];
    mount_get(&server, "/feeds/products.xml", 200, urlset(&pages)).await;
    mount_get(&server, "/sitemap.xml", 200, urlset(&[format!("{uri}/product/main")])).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve_sitemap(&format!("{uri}/feeds/products.xml"), true).await;

    assert!(result.is_ok());
    assert_eq!(result.source_url, format!("{uri}/feeds/products.xml"));
    assert_eq!(result.page_urls, pages);
}

#[tokio::test]
async fn bare_host_resolves_default_sitemap_path() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let pages = vec![format!("{uri}/item/1")];
    mount_get(&server, "/sitemap.xml", 200, urlset(&pages)).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&format!("{uri}/shop/home"), true).await;

    assert_eq!(result.source_url, format!("{uri}/sitemap.xml"));
    assert_eq!(result.page_urls, pages);
}

#[tokio::test]
async fn fetch_failure_falls_back_to_first_robots_sitemap() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_get(&server, "/sitemap.xml", 404, String::new()).await;
    mount_get(
        &server,
        "/robots.txt",
        200,
        format!("User-agent: *\nSitemap: {uri}/real-sitemap.xml\nSitemap: {uri}/ignored.xml\n"),
    )
    .await;
    let pages = vec![format!("{uri}/products/1"), format!("{uri}/products/2")];
    mount_get(&server, "/real-sitemap.xml", 200, urlset(&pages)).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&uri, true).await;

    assert!(result.is_ok());
    assert_eq!(result.source_url, format!("{uri}/real-sitemap.xml"));
    assert_eq!(result.page_urls, pages);
}

#[tokio::test]
async fn fallback_sitemap_index_is_not_followed() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_get(&server, "/sitemap.xml", 500, String::new()).await;
    mount_get(&server, "/robots.txt", 200, format!("Sitemap: {uri}/index.xml\n")).await;
    mount_get(&server, "/index.xml", 200, sitemap_index(&[format!("{uri}/child.xml")])).await;
    mount_get(&server, "/child.xml", 200, urlset(&[format!("{uri}/p/1")])).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&uri, true).await;

    assert!(result.is_ok());
    assert!(result.page_urls.is_empty());
}

#[tokio::test]
async fn fetch_failure_without_robots_sitemap_reports_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_get(&server, "/sitemap.xml", 404, String::new()).await;
    mount_get(&server, "/robots.txt", 200, "User-agent: *\nDisallow:\n".to_string()).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&uri, true).await;

    let error = result.error.expect("resolution should fail");
    assert!(error.starts_with("Error fetching sitemap: 404"), "{error}");
    assert!(result.page_urls.is_empty());
}

#[tokio::test]
async fn malformed_xml_is_a_parse_error_without_fallback() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_get(&server, "/sitemap.xml", 200, "<html><body>Not a sitemap".to_string()).await;
    mount_get(&server, "/robots.txt", 200, format!("Sitemap: {uri}/other.xml\n")).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&format!("{uri}/sitemap.xml"), true).await;

    let error = result.error.expect("parse should fail");
    assert!(error.starts_with("Error parsing XML:"), "{error}");
    assert_eq!(result.source_url, format!("{uri}/sitemap.xml"));
}

#[tokio::test]
async fn empty_body_is_an_empty_result() {
    let server = MockServer::start().await;
    mount_get(&server, "/sitemap.xml", 200, "  \n".to_string()).await;

    let resolver = SitemapResolver::new(fetcher(), HttpConfig::default());
    let result = resolver.resolve(&format!("{}/sitemap.xml", server.uri()), true).await;

    assert!(result.is_ok());
    assert!(result.page_urls.is_empty());
}
