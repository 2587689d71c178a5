use axum::body::Bytes;
use axum::Json;
use plumb_core::catalog;
use plumb_core::classify::classify;
use plumb_core::normalize::{normalize, Answers};
use plumb_core::translate::translate;
use serde::Deserialize;

use crate::error::AppError;

#[derive(Deserialize)]
pub struct ClassifyBody {
    #[serde(default)]
    pub answers: Answers,
}

/// POST /api/classify
///
/// Never fails on content: missing answers classify as general plumbing.
pub async fn classify_answers(body: Bytes) -> Result<Json<serde_json::Value>, AppError> {
    let body: ClassifyBody = super::parse_body(&body)?;
    let normalized = normalize(&body.answers);
    let result = classify(&normalized.diagnostic_input());
    let capability = translate(&result.service_code);
    let service = catalog::lookup(result.service_code.as_str());

    tracing::info!(
        code = %result.service_code,
        capability = %capability,
        severity = result.severity.as_str(),
        "classified answers"
    );

    Ok(Json(serde_json::json!({
        "ok": true,
        "normalized": normalized,
        "result": result,
        "capability": capability,
        "service": service,
    })))
}
