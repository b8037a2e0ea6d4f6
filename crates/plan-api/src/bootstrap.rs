//! # Service Bootstrap
//!
//! Turns an [`AppConfig`] into a ready [`AppState`]:
//!
//! 1. **Compile the plan schema.** Failure aborts startup; requests are
//!    never validated against a missing schema.
//! 2. **Open the backing store.** PostgreSQL when `DATABASE_URL` is set
//!    (migrations applied on connect), the in-memory store otherwise.

use std::sync::Arc;

use plan_schema::{PlanSchema, SchemaError};
use plan_store::{KeyValueStore, MemoryKeyValueStore, PgKeyValueStore, StoreError};

use crate::config::AppConfig;
use crate::state::AppState;

/// Errors during service bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The plan schema could not be loaded or compiled.
    #[error("plan schema unavailable: {0}")]
    Schema(#[from] SchemaError),

    /// The configured database could not be reached or migrated.
    #[error("backing store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Open the backing store selected by `config`.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = PgKeyValueStore::connect(url).await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set, running in-memory only mode. \
                 Plans will not survive restarts."
            );
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
    }
}

/// Compile the schema and open the store named by `config`.
pub async fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let schema = PlanSchema::load(&config.schema_path)?;
    let store = open_store(&config).await?;

    tracing::info!(
        schema = %schema.source_name(),
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        plan_ttl_secs = config.plan_ttl.map(|ttl| ttl.as_secs()),
        "plan service bootstrapped"
    );
    Ok(AppState::new(store, schema, config))
}
