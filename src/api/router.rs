//! API router.
//!
//! Routes are nested under `/api/`. The body limit sits above the upload
//! cap so oversized uploads fail the explicit size check with a
//! structured error instead of a bare rejection.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::AppContext;
use crate::api::validate::MAX_UPLOAD_BYTES;

/// Build the API router over the shared context.
pub fn api_router(ctx: AppContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/chat", post(endpoints::chat::send))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        // Multipart framing overhead on top of the upload cap.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .layer(CorsLayer::permissive())
}
