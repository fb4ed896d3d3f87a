//! HTTP server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::application::ScrapePipeline;
use crate::infrastructure::config::AppConfig;

use super::handlers::AppState;
use super::routes::create_router;

pub struct HttpServer {
    listen_addr: String,
    preview_limit: usize,
    pipeline: Arc<ScrapePipeline>,
}

impl HttpServer {
    pub fn new(config: &AppConfig, pipeline: Arc<ScrapePipeline>) -> Self {
        Self {
            listen_addr: config.server.listen_addr.clone(),
            preview_limit: config.scraping.preview_limit,
            pipeline,
        }
    }

    /// Serve until Ctrl+C
    pub async fn run(&self) -> Result<()> {
        let addr: SocketAddr = self
            .listen_addr
            .parse()
            .context("Invalid HTTP listen address")?;

        let app = create_router(AppState::new(self.pipeline.clone(), self.preview_limit));

        let listener = TcpListener::bind(&addr)
            .await
            .context("Failed to bind HTTP server")?;

        info!("🌐 Listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("HTTP server shutting down");
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}
