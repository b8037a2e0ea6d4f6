//! # Request Metrics
//!
//! In-process atomic counters, updated by [`metrics_middleware`] for every
//! request that reaches the plan routes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

/// Shared counters. Clones observe the same values.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    request_count: Arc<AtomicU64>,
    error_count: Arc<AtomicU64>,
    not_modified_count: Arc<AtomicU64>,
}

impl ApiMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests answered so far.
    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Requests answered with a 4xx or 5xx status.
    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Conditional reads answered with 304.
    pub fn not_modified(&self) -> u64 {
        self.not_modified_count.load(Ordering::Relaxed)
    }

    fn record(&self, status: StatusCode) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        if status.is_client_error() || status.is_server_error() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        if status == StatusCode::NOT_MODIFIED {
            self.not_modified_count.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Middleware that records each response status in the [`ApiMetrics`]
/// request extension, when one is installed.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.record(response.status());
    }

    response
}
