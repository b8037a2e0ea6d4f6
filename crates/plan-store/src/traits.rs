//! The backing-store contract.
//!
//! [`crate::PlanStore`] talks to its backend only through this trait, so the
//! same create/read/delete logic runs over the in-memory map in tests and
//! over PostgreSQL in production.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Async byte-oriented key-value store with single-key atomic operations.
///
/// Implementations must be safe to share across request tasks. Keys with an
/// expired TTL behave exactly like absent keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Store `value` under `key` only if no live value exists.
    ///
    /// Returns `true` when the value was written. Atomic per key: of two
    /// concurrent calls for the same absent key exactly one returns `true`.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError>;

    /// Remove every listed key, returning how many live keys were removed.
    async fn delete(&self, keys: &[String]) -> Result<u64, StoreError>;

    /// Round-trip to the backend. Used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
