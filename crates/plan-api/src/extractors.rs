//! # Request Extraction Helpers
//!
//! Maps body rejections and header lookups onto [`AppError`] so handlers
//! stay linear.

use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderMap};
use axum::Json;

use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to [`AppError::InvalidInput`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
///     // use req...
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::InvalidInput(err.body_text()))
}

/// The raw `If-None-Match` value, if present and visible ASCII.
///
/// The value is returned verbatim: quotes, `W/` prefixes, lists and `*`
/// are left for the byte-exact comparison to reject.
pub fn if_none_match(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
}
