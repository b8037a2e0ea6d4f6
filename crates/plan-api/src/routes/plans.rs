//! # Plan Resource API
//!
//! | Method   | Path         | Success                                  |
//! |----------|--------------|------------------------------------------|
//! | `POST`   | `/plans`     | 201 + `ETag`                             |
//! | `GET`    | `/plans/:id` | 200 stored JSON + `ETag`, or 304 + `ETag` |
//! | `DELETE` | `/plans/:id` | 204                                      |
//!
//! The `ETag` value is the bare 64-character hex tag. `If-None-Match` must
//! repeat it exactly to get a 304.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use plan_core::ObjectId;
use plan_store::ReadOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_json, if_none_match};
use crate::state::AppState;

/// Plan document accepted by `POST /plans`.
///
/// Only `objectId` is required; any other members are stored as sent.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    /// Caller-chosen unique id, used as the storage key.
    pub object_id: String,
    pub object_type: Option<String>,
    pub plan_type: Option<String>,
    pub creation_date: Option<String>,
    #[serde(rename = "_org")]
    pub org: Option<String>,
}

/// Response body for a created plan.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanCreatedResponse {
    pub message: String,
    pub object_id: String,
}

/// Build the plans router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan))
        .route("/plans/:id", get(get_plan).delete(delete_plan))
}

/// Ids that fail [`ObjectId`] validation can never have been stored.
fn path_id(raw: String) -> Result<ObjectId, AppError> {
    ObjectId::new(raw).map_err(|_| AppError::NotFound("plan not found".to_string()))
}

/// POST /plans — Validate and store a new plan.
#[utoipa::path(
    post,
    path = "/plans",
    request_body = PlanDocument,
    responses(
        (status = 201, description = "Plan created", body = PlanCreatedResponse,
            headers(("ETag" = String, description = "Integrity tag of the stored plan"))),
        (status = 400, description = "Invalid JSON or schema violation", body = crate::error::ErrorBody),
        (status = 409, description = "Plan already exists", body = crate::error::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::error::ErrorBody),
    ),
    tag = "plans"
)]
async fn create_plan(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let plan = extract_json(body)?;
    state.schema.validate(&plan)?;

    let raw_id = plan
        .get("objectId")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::InvalidInput("objectId must be a string".to_string()))?;
    let id = ObjectId::new(raw_id)?;

    let created = state.plans.create(&id, &plan).await?;

    let body = PlanCreatedResponse {
        message: "Plan created".to_string(),
        object_id: created.object_id.into_inner(),
    };
    Ok((
        StatusCode::CREATED,
        [(header::ETAG, created.tag.to_string())],
        Json(body),
    )
        .into_response())
}

/// GET /plans/:id — Fetch a plan, honoring `If-None-Match`.
#[utoipa::path(
    get,
    path = "/plans/{id}",
    params(
        ("id" = String, Path, description = "Plan objectId"),
        ("If-None-Match" = Option<String>, Header, description = "Tag from a previous response"),
    ),
    responses(
        (status = 200, description = "Stored plan document", body = PlanDocument,
            headers(("ETag" = String, description = "Integrity tag of the stored plan"))),
        (status = 304, description = "Tag matched, body omitted",
            headers(("ETag" = String, description = "Integrity tag of the stored plan"))),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::error::ErrorBody),
    ),
    tag = "plans"
)]
async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = path_id(id)?;

    let response = match state.plans.read(&id, if_none_match(&headers)).await? {
        ReadOutcome::NotModified { tag } => {
            (StatusCode::NOT_MODIFIED, [(header::ETAG, tag.to_string())]).into_response()
        }
        ReadOutcome::Fresh { body, tag } => (
            [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (header::ETAG, tag.to_string()),
            ],
            body,
        )
            .into_response(),
    };
    Ok(response)
}

/// DELETE /plans/:id — Remove a plan.
#[utoipa::path(
    delete,
    path = "/plans/{id}",
    params(("id" = String, Path, description = "Plan objectId")),
    responses(
        (status = 204, description = "Plan deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::error::ErrorBody),
    ),
    tag = "plans"
)]
async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = path_id(id)?;
    state.plans.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
