//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented plan routes into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the plan API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Plan Service API",
        version = "0.1.0",
        description = "Create, conditionally read and delete JSON plan documents. Reads carry an ETag derived from the stored bytes.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::plans::create_plan,
        crate::routes::plans::get_plan,
        crate::routes::plans::delete_plan,
    ),
    components(schemas(
        crate::routes::plans::PlanDocument,
        crate::routes::plans::PlanCreatedResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "plans", description = "Plan documents with ETag-based conditional reads"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
