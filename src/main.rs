#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sitemap_scout_lib::run().await
}
