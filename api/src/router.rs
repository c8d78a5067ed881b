use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::process_pdf::{process_pdf, AppState};

/// Build the application router.
///
/// Axum's default 2MB body cap is lifted: the upload handler enforces the
/// 10MB PDF limit itself so oversize files get the proper error body.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/process-pdf", post(process_pdf))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
