//! # plan-store — Conditional Resource Store
//!
//! Persists plan documents next to their SHA-256 integrity tags and answers
//! conditional reads against those tags.
//!
//! ## Layers
//!
//! - [`KeyValueStore`]: the backing-store contract. Single-key atomicity is
//!   all [`PlanStore`] relies on; `set_if_absent` closes the create race.
//! - [`MemoryKeyValueStore`]: in-process backend for development and tests.
//! - [`PgKeyValueStore`]: PostgreSQL backend built on `sqlx`.
//! - [`PlanStore`]: create / read / delete of a plan as a pair of slots,
//!   `<objectId>` for the canonical body and `<objectId>:etag` for its tag.
//!
//! Every backend call made by [`PlanStore`] runs under a deadline; expiry
//! surfaces as [`StoreError::Timeout`].

pub mod error;
pub mod memory;
pub mod plan_store;
pub mod postgres;
pub mod traits;

pub use error::{PlanError, StoreError};
pub use memory::MemoryKeyValueStore;
pub use plan_store::{
    body_key, is_reserved_id, tag_key, CreatedPlan, PlanStore, ReadOutcome, DEFAULT_STORE_TIMEOUT,
    TAG_KEY_SUFFIX,
};
pub use postgres::PgKeyValueStore;
pub use traits::KeyValueStore;
