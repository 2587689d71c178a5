use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use plumb_core::matcher::MatchRequest;
use plumb_core::provider::ProviderCatalog;
use plumb_core::PlumbError;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub debug: bool,
}

/// POST /api/match[?debug=true]
///
/// The body is validated before the ranker runs. The catalog is read from
/// disk on every call. An empty provider list is a success.
pub async fn match_providers(
    State(app): State<AppState>,
    Query(query): Query<MatchQuery>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = MatchRequest::from_slice(&body).map_err(PlumbError::from)?;
    let catalog_path = app.config.catalog_path(&app.root);
    let matcher = app.matcher.clone();

    let result = tokio::task::spawn_blocking(move || {
        let catalog = ProviderCatalog::load(&catalog_path)?;
        let providers = matcher.rank_request(&catalog.providers, &request);
        tracing::info!(
            required = request.service_codes().len(),
            severity = request.severity().as_str(),
            matched = providers.len(),
            catalog = catalog.providers.len(),
            "match request"
        );

        let mut json = serde_json::json!({ "ok": true, "providers": providers });
        if query.debug {
            json["debug"] = serde_json::to_value(matcher.debug_request(&catalog.providers, &request))?;
        }
        Ok::<_, PlumbError>(json)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
