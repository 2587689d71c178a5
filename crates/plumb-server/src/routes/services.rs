use axum::Json;
use plumb_core::catalog::SERVICES;

/// GET /api/services: display metadata for known classification codes.
pub async fn list_services() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "services": SERVICES }))
}
