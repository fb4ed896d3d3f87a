//! HTTP front-end: a form page, the scrape endpoint and a health check

pub mod handlers;
pub mod routes;
pub mod server;

pub use handlers::{AppState, ErrorResponse};
pub use routes::create_router;
pub use server::HttpServer;
