//! PostgreSQL [`KeyValueStore`] backed by the `plan_kv` table.
//!
//! Rows whose `expires_at` has passed are treated as absent by every query
//! and are overwritten by the next `set_if_absent` for the same key.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::StoreError;
use crate::traits::KeyValueStore;

/// Key-value slots stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgKeyValueStore {
    pool: PgPool,
}

impl PgKeyValueStore {
    /// Wrap an existing pool. The `plan_kv` table must already exist.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url`, apply the embedded migrations and return the store.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn expiry(ttl: Option<Duration>) -> Result<Option<DateTime<Utc>>, StoreError> {
    ttl.map(|ttl| {
        chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .ok_or_else(|| StoreError::Backend(format!("ttl out of range: {ttl:?}")))
    })
    .transpose()
}

#[async_trait]
impl KeyValueStore for PgKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value: Option<Vec<u8>> = sqlx::query_scalar(
            "SELECT value FROM plan_kv
             WHERE key = $1 AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO plan_kv (key, value, expires_at) VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE
             SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at",
        )
        .bind(key)
        .bind(value)
        .bind(expiry(ttl)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        // The conflicting row is only replaced once it has expired.
        let result = sqlx::query(
            "INSERT INTO plan_kv (key, value, expires_at) VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE
             SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at
             WHERE plan_kv.expires_at IS NOT NULL AND plan_kv.expires_at <= NOW()",
        )
        .bind(key)
        .bind(value)
        .bind(expiry(ttl)?)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError> {
        let removed: i64 = sqlx::query_scalar(
            "WITH gone AS (
                 DELETE FROM plan_kv WHERE key = ANY($1) RETURNING expires_at
             )
             SELECT COUNT(*) FROM gone
             WHERE expires_at IS NULL OR expires_at > NOW()",
        )
        .bind(keys)
        .fetch_one(&self.pool)
        .await?;
        Ok(u64::try_from(removed).unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
