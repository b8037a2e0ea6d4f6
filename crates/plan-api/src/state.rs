//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Cloning is cheap: every field is a handle.

use std::sync::Arc;

use plan_schema::PlanSchema;
use plan_store::{KeyValueStore, PlanStore};

use crate::config::AppConfig;
use crate::middleware::metrics::ApiMetrics;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Conditional resource store over the configured backend.
    pub plans: PlanStore,
    /// Plan schema, compiled once at startup.
    pub schema: Arc<PlanSchema>,
    /// Request counters.
    pub metrics: ApiMetrics,
    /// Configuration the state was built from.
    pub config: AppConfig,
}

impl AppState {
    /// Build the state over `kv`, applying the configured TTL and deadline.
    pub fn new(kv: Arc<dyn KeyValueStore>, schema: PlanSchema, config: AppConfig) -> Self {
        let plans = PlanStore::new(kv)
            .with_ttl(config.plan_ttl)
            .with_timeout(config.store_timeout);
        Self {
            plans,
            schema: Arc::new(schema),
            metrics: ApiMetrics::new(),
            config,
        }
    }
}
