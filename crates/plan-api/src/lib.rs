//! # plan-api — HTTP Gateway for the Plan Service
//!
//! Exposes the conditional resource store over HTTP: plan documents are
//! validated against the plan schema, stored with a SHA-256 integrity tag,
//! and served with that tag as the `ETag`.
//!
//! ## API Surface
//!
//! | Path                 | Module               | Purpose                  |
//! |----------------------|----------------------|--------------------------|
//! | `/plans`, `/plans/:id` | [`routes::plans`]  | Create / read / delete   |
//! | `/openapi.json`      | [`openapi`]          | OpenAPI document         |
//! | `/health/*`          | this module          | Liveness and readiness   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the application router with all routes and middleware.
///
/// Health probes sit outside the metrics and trace layers so probe
/// traffic does not skew the request counters.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::plans::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(state.metrics.clone()));

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api).with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 once the backing store answers a ping.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.plans.ping().await.map_err(|e| {
        tracing::warn!("Backing store health check failed: {e}");
        AppError::ServiceUnavailable("backing store unreachable".to_string())
    })?;
    Ok("ready")
}
