//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

/// Create the router with all routes
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/scrape", post(handlers::scrape))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
