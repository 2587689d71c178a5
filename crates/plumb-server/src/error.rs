use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use plumb_core::error::PlumbError;

// ---------------------------------------------------------------------------
// Sentinel for request bodies that never reach the engines
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        match self.0.downcast_ref::<PlumbError>() {
            Some(e) => match e {
                PlumbError::MalformedMatchRequest(_)
                | PlumbError::InvalidSeverity(_)
                | PlumbError::NotInitialized => StatusCode::BAD_REQUEST,
                PlumbError::InvalidTraversalState { .. } => StatusCode::CONFLICT,
                PlumbError::NodeNotFound(_) | PlumbError::IssueNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                PlumbError::InvalidTree(_)
                | PlumbError::CatalogNotFound(_)
                | PlumbError::Io(_)
                | PlumbError::Yaml(_)
                | PlumbError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "ok": false, "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_core::error::MatchRequestError;

    fn status_of(e: PlumbError) -> StatusCode {
        AppError(e.into()).into_response().status()
    }

    #[test]
    fn malformed_match_request_maps_to_400() {
        assert_eq!(
            status_of(MatchRequestError::EmptyServiceCodes.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PlumbError::InvalidSeverity("soon".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn invalid_traversal_maps_to_409() {
        let e = PlumbError::InvalidTraversalState {
            node: "location".into(),
            option: "Attic".into(),
        };
        assert_eq!(status_of(e), StatusCode::CONFLICT);
    }

    #[test]
    fn node_not_found_maps_to_404() {
        assert_eq!(
            status_of(PlumbError::NodeNotFound("nowhere".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn missing_catalog_maps_to_500() {
        assert_eq!(
            status_of(PlumbError::CatalogNotFound("providers.json".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_sentinel_maps_to_400() {
        let err = AppError::bad_request("invalid request body: expected value");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.0.to_string(), "invalid request body: expected value");
    }

    #[test]
    fn foreign_errors_map_to_500() {
        let err = AppError(anyhow::anyhow!("boom"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
