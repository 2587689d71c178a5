pub mod classify;
pub mod health;
pub mod matching;
pub mod services;
pub mod tree;

use crate::error::AppError;
use serde::de::DeserializeOwned;

/// Decode a JSON request body. Failures answer 400 with the usual
/// `{"ok": false, "error": ..}` shape.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::bad_request(format!("invalid request body: {e}")))
}
