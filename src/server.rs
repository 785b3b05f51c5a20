use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Keep-alive surface required by the hosting environment. Nothing served
/// here affects the watcher.
pub fn keep_alive_routes() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
