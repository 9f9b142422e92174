//! Health check endpoint

use axum::response::Response;

use crate::response;

/// Liveness probe: always answers with the ok-envelope.
pub async fn health() -> Response {
    response::ok(serde_json::json!({ "status": "ok" }))
}
