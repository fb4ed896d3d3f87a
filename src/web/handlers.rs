//! Request handlers

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::application::{HealthDto, ScrapePipeline, ScrapeRequestDto, ScrapeResponseDto};
use crate::infrastructure::crawl_error::CrawlError;
use crate::infrastructure::site_url::normalize_url;

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Sitemap Scout</title>
</head>
<body>
  <h1>Sitemap Scout</h1>
  <form method="post" action="/scrape">
    <label for="url">Site URL</label>
    <input id="url" name="url" type="text" placeholder="https://example.com" required>
    <button type="submit">Scrape</button>
  </form>
</body>
</html>
"#;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScrapePipeline>,
    /// Held for a whole pipeline run so scrape requests queue
    pub run_lock: Arc<Mutex<()>>,
    pub preview_limit: usize,
}

impl AppState {
    pub fn new(pipeline: Arc<ScrapePipeline>, preview_limit: usize) -> Self {
        Self {
            pipeline,
            run_lock: Arc::new(Mutex::new(())),
            preview_limit,
        }
    }
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new("INVALID_URL", message)
    }

    pub fn invalid_form(message: impl Into<String>) -> Self {
        Self::new("INVALID_FORM", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn health() -> impl IntoResponse {
    Json(HealthDto::default())
}

/// Run the pipeline for the submitted site
pub async fn scrape(
    State(state): State<AppState>,
    form: Result<Form<ScrapeRequestDto>, FormRejection>,
) -> Response {
    let request = match form {
        Ok(Form(request)) => request,
        Err(rejection) => {
            warn!("Rejected scrape form: {}", rejection.body_text());
            return (rejection.status(), Json(ErrorResponse::invalid_form(rejection.body_text()))).into_response();
        }
    };

    if let Err(e) = normalize_url(&request.url) {
        warn!("Rejected scrape request: {}", e);
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse::invalid_url(e.to_string()))).into_response();
    }

    let _running = state.run_lock.lock().await;
    info!("Scrape requested for {}", request.url);

    match state.pipeline.run(&request.url).await {
        Ok(report) => Json(ScrapeResponseDto::from_report(report, state.preview_limit)).into_response(),
        Err(e @ CrawlError::InvalidUrl { .. }) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::invalid_url(e.to_string()))).into_response()
        }
        Err(e) => {
            error!("Scrape failed for {}: {}", request.url, e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal_error(e.to_string()))).into_response()
        }
    }
}
