//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps plan-store, plan-schema and plan-core errors to HTTP status codes
//! and JSON bodies of the form `{"error": {"code", "message", "details"?}}`.
//! Server-side failures are logged and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use plan_schema::{SchemaError, SchemaViolation};
use plan_store::PlanError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_INPUT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Schema violations, present only for rejected plan documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Body is not JSON or lacks a usable object id (400).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Body is JSON but violates the plan schema (400).
    #[error("plan document failed schema validation ({} violation(s))", .0.len())]
    SchemaRejected(Vec<SchemaViolation>),

    /// A plan with the requested id already exists (409).
    #[error("{0}")]
    AlreadyExists(String),

    /// No plan is stored under the requested id (404).
    #[error("{0}")]
    NotFound(String),

    /// The backing store failed or timed out (500). Message is logged only.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    /// The plan could not be serialized for storage (500). Message is logged only.
    #[error("serialization failure: {0}")]
    SerializationFailure(String),

    /// A dependency is not ready to serve (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidInput(_) | Self::SchemaRejected(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            Self::AlreadyExists(_) => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::StorageFailure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_FAILURE"),
            Self::SerializationFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_FAILURE")
            }
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::SchemaRejected(violations) => Some(serde_json::Value::Array(
                violations
                    .iter()
                    .map(|v| {
                        serde_json::json!({
                            "path": v.instance_path,
                            "message": v.message,
                        })
                    })
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::StorageFailure(_) | Self::SerializationFailure(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::AlreadyExists(_) => Self::AlreadyExists(err.to_string()),
            PlanError::NotFound(_) => Self::NotFound(err.to_string()),
            PlanError::ReservedId(_) => Self::InvalidInput(err.to_string()),
            PlanError::Storage(inner) => Self::StorageFailure(inner.to_string()),
            PlanError::Serialization(inner) => Self::SerializationFailure(inner.to_string()),
        }
    }
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::ValidationFailed { details, .. } => Self::SchemaRejected(details),
            unavailable => Self::ServiceUnavailable(unavailable.to_string()),
        }
    }
}

impl From<plan_core::ValidationError> for AppError {
    fn from(err: plan_core::ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_core::ObjectId;
    use plan_store::StoreError;
    use std::time::Duration;

    fn p1() -> ObjectId {
        ObjectId::new("p1").unwrap()
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            (AppError::SchemaRejected(vec![]), StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            (AppError::AlreadyExists("x".into()), StatusCode::CONFLICT, "ALREADY_EXISTS"),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::StorageFailure("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_FAILURE",
            ),
            (
                AppError::SerializationFailure("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERIALIZATION_FAILURE",
            ),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err:?}");
        }
    }

    #[test]
    fn plan_errors_convert() {
        let err = AppError::from(PlanError::AlreadyExists(p1()));
        assert!(matches!(err, AppError::AlreadyExists(ref m) if m.contains("p1")));

        let err = AppError::from(PlanError::NotFound(p1()));
        assert!(matches!(err, AppError::NotFound(_)));

        let reserved = ObjectId::new("p1:etag").unwrap();
        let err = AppError::from(PlanError::ReservedId(reserved));
        assert!(matches!(err, AppError::InvalidInput(ref m) if m.contains(":etag")));

        let err = AppError::from(PlanError::Storage(StoreError::Timeout(
            Duration::from_secs(5),
        )));
        assert!(matches!(err, AppError::StorageFailure(ref m) if m.contains("timed out")));
    }

    #[test]
    fn schema_errors_convert() {
        let violation = SchemaViolation {
            instance_path: "/objectId".into(),
            message: "bad".into(),
        };
        let err = AppError::from(SchemaError::ValidationFailed {
            count: 1,
            details: vec![violation.clone()],
        });
        assert!(matches!(err, AppError::SchemaRejected(ref v) if v == &vec![violation]));

        let err = AppError::from(SchemaError::Load {
            source_name: "plan.schema.json".into(),
            reason: "missing".into(),
        });
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[test]
    fn empty_object_id_is_invalid_input() {
        let err = AppError::from(ObjectId::new("").unwrap_err());
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_body_omits_absent_details() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message: "plan p1 not found".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("NOT_FOUND"));
        assert!(!json.contains("details"));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, body) = response_parts(PlanError::NotFound(p1()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert_eq!(body.error.message, "plan p1 not found");
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_schema_rejection_carries_violations() {
        let err = AppError::SchemaRejected(vec![SchemaViolation {
            instance_path: "/planType".into(),
            message: "5 is not of type \"string\"".into(),
        }]);
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "INVALID_INPUT");
        let details = body.error.details.unwrap();
        assert_eq!(details[0]["path"], "/planType");
    }

    #[tokio::test]
    async fn into_response_storage_failure_hides_details() {
        let (status, body) =
            response_parts(AppError::StorageFailure("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "STORAGE_FAILURE");
        assert!(
            !body.error.message.contains("connection"),
            "internal error details must not leak: {}",
            body.error.message
        );
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn into_response_serialization_failure_hides_details() {
        let (_, body) =
            response_parts(AppError::SerializationFailure("key must be a string".into())).await;
        assert_eq!(body.error.code, "SERIALIZATION_FAILURE");
        assert_eq!(body.error.message, "An internal error occurred");
    }
}
