//! Error types for the backing store and the plan store.

use std::time::Duration;

use plan_core::{CanonicalizationError, ObjectId};
use thiserror::Error;

/// Failure of a backing key-value store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The call did not complete within the deadline.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Backend(other.to_string()),
        }
    }
}

/// Outcome failures of [`crate::PlanStore`] operations.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A plan with this object id is already stored.
    #[error("plan {0} already exists")]
    AlreadyExists(ObjectId),

    /// No plan is stored under this object id.
    #[error("plan {0} not found")]
    NotFound(ObjectId),

    /// The object id ends in the tag slot suffix and cannot name a plan.
    #[error("object id {0} ends with the reserved suffix \":etag\"")]
    ReservedId(ObjectId),

    /// The backing store failed or timed out.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// The plan body could not be serialized to canonical bytes.
    #[error("serialization failure: {0}")]
    Serialization(#[from] CanonicalizationError),
}
