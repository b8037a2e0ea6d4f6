//! # Plan Store
//!
//! A plan occupies two slots in the backing store:
//!
//! | Key                 | Value                                   |
//! |---------------------|-----------------------------------------|
//! | `<objectId>`        | canonical JSON bytes of the plan        |
//! | `<objectId>:etag`   | lowercase hex SHA-256 of those bytes    |
//!
//! Both slots are written by [`PlanStore::create`] and removed together by
//! [`PlanStore::delete`]; nothing mutates them in between. The body slot is
//! authoritative: a plan exists iff its body slot exists, and a missing or
//! malformed tag slot is recomputed from the body on read.
//!
//! Ids ending in [`TAG_KEY_SUFFIX`] are reserved: their body key would be
//! another plan's tag key. Creating one fails with [`PlanError::ReservedId`]
//! and reading or deleting one reports [`PlanError::NotFound`] without
//! touching the backend.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use plan_core::{CanonicalBytes, IntegrityTag, ObjectId};
use serde_json::Value;

use crate::error::{PlanError, StoreError};
use crate::traits::KeyValueStore;

/// Suffix appended to an object id to form its tag slot key.
pub const TAG_KEY_SUFFIX: &str = ":etag";

/// Deadline applied to each backing-store call unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Key of the slot holding the plan body.
pub fn body_key(id: &ObjectId) -> String {
    id.as_str().to_string()
}

/// Key of the slot holding the plan's integrity tag.
pub fn tag_key(id: &ObjectId) -> String {
    format!("{}{TAG_KEY_SUFFIX}", id.as_str())
}

/// Whether `id` is reserved because its body key has the shape of a tag key.
pub fn is_reserved_id(id: &ObjectId) -> bool {
    id.as_str().ends_with(TAG_KEY_SUFFIX)
}

/// Result of a successful [`PlanStore::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlan {
    /// Id the plan was stored under.
    pub object_id: ObjectId,
    /// Tag of the stored bytes.
    pub tag: IntegrityTag,
}

/// Result of a successful [`PlanStore::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The caller's validator equals the current tag; no body is returned.
    NotModified {
        /// Current tag.
        tag: IntegrityTag,
    },
    /// The stored bytes, untouched, with their tag.
    Fresh {
        /// Canonical JSON bytes as stored.
        body: Vec<u8>,
        /// Current tag.
        tag: IntegrityTag,
    },
}

impl ReadOutcome {
    /// Current tag, whichever variant.
    pub fn tag(&self) -> &IntegrityTag {
        match self {
            Self::NotModified { tag } | Self::Fresh { tag, .. } => tag,
        }
    }
}

/// Conditional resource store for plan documents.
///
/// Holds an injected backing store; cloning shares it. No in-process locks:
/// concurrent requests are coordinated by the backend's per-key atomicity.
#[derive(Clone)]
pub struct PlanStore {
    kv: Arc<dyn KeyValueStore>,
    ttl: Option<Duration>,
    timeout: Duration,
}

impl fmt::Debug for PlanStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanStore")
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl PlanStore {
    /// Create a store over `kv` with no entry expiry and the default deadline.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            ttl: None,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Expire both slots of every created plan after `ttl`.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Deadline for each individual backing-store call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured entry TTL.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Configured per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one backing-store call under the configured deadline.
    ///
    /// On expiry the call's future is dropped, cancelling it.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }

    /// Persist a new plan under `id`.
    ///
    /// `body` must already have passed schema validation. The body slot is
    /// claimed with `set_if_absent`, so of two concurrent creates for the
    /// same id exactly one succeeds. If the tag slot then cannot be written
    /// the body slot is rolled back; should the rollback fail too, the plan
    /// remains readable and its tag is recomputed on each read.
    ///
    /// # Errors
    ///
    /// [`PlanError::AlreadyExists`] if a plan is stored under `id` (nothing
    /// is modified), [`PlanError::ReservedId`] if `id` ends in
    /// [`TAG_KEY_SUFFIX`], [`PlanError::Serialization`] if `body` cannot be
    /// serialized, [`PlanError::Storage`] on backend failure or timeout.
    #[tracing::instrument(skip_all, fields(object_id = %id))]
    pub async fn create(&self, id: &ObjectId, body: &Value) -> Result<CreatedPlan, PlanError> {
        if is_reserved_id(id) {
            return Err(PlanError::ReservedId(id.clone()));
        }
        let bytes = CanonicalBytes::from_value(body)?;
        let tag = IntegrityTag::of(&bytes);

        let body_key = body_key(id);
        let claimed = self
            .bounded(self.kv.set_if_absent(&body_key, bytes.as_bytes(), self.ttl))
            .await?;
        if !claimed {
            tracing::debug!("create rejected, plan already exists");
            return Err(PlanError::AlreadyExists(id.clone()));
        }

        let tag_key = tag_key(id);
        let tag_write = self
            .bounded(self.kv.set(&tag_key, tag.as_str().as_bytes(), self.ttl))
            .await;
        if let Err(err) = tag_write {
            // A timed-out write may still have landed.
            match self.bounded(self.kv.delete(&[body_key, tag_key])).await {
                Ok(_) => {
                    tracing::warn!(error = %err, "tag write failed, both slots rolled back");
                }
                Err(rollback) => {
                    tracing::error!(
                        error = %err,
                        rollback_error = %rollback,
                        "tag write failed and body rollback failed, tag will be recomputed on read"
                    );
                }
            }
            return Err(PlanError::Storage(err));
        }

        tracing::info!(tag = %tag, bytes = bytes.len(), "plan created");
        Ok(CreatedPlan {
            object_id: id.clone(),
            tag,
        })
    }

    /// Fetch the plan stored under `id`, honoring a caller-held tag.
    ///
    /// When `if_none_match` equals the current tag byte for byte the body is
    /// not returned. No weak comparison, no `*`, no list parsing.
    ///
    /// # Errors
    ///
    /// [`PlanError::NotFound`] if no body is stored, [`PlanError::Storage`]
    /// on backend failure or timeout.
    #[tracing::instrument(skip_all, fields(object_id = %id))]
    pub async fn read(
        &self,
        id: &ObjectId,
        if_none_match: Option<&str>,
    ) -> Result<ReadOutcome, PlanError> {
        if is_reserved_id(id) {
            return Err(PlanError::NotFound(id.clone()));
        }
        let body = self
            .bounded(self.kv.get(&body_key(id)))
            .await?
            .ok_or_else(|| PlanError::NotFound(id.clone()))?;

        let stored = self.bounded(self.kv.get(&tag_key(id))).await?;
        let tag = match stored.as_deref().map(std::str::from_utf8) {
            Some(Ok(raw)) => match IntegrityTag::parse(raw) {
                Ok(tag) => tag,
                Err(_) => {
                    tracing::debug!("stored tag malformed, recomputing");
                    IntegrityTag::generate(&body)
                }
            },
            Some(Err(_)) => {
                tracing::debug!("stored tag is not UTF-8, recomputing");
                IntegrityTag::generate(&body)
            }
            None => {
                tracing::debug!("tag slot missing, recomputing");
                IntegrityTag::generate(&body)
            }
        };

        if if_none_match.is_some_and(|candidate| tag.matches(candidate)) {
            return Ok(ReadOutcome::NotModified { tag });
        }
        Ok(ReadOutcome::Fresh { body, tag })
    }

    /// Remove the plan stored under `id`, both slots at once.
    ///
    /// # Errors
    ///
    /// [`PlanError::NotFound`] if no body is stored, including when a
    /// concurrent delete removed it first. [`PlanError::Storage`] on backend
    /// failure or timeout, in which case the slots may be partially removed.
    #[tracing::instrument(skip_all, fields(object_id = %id))]
    pub async fn delete(&self, id: &ObjectId) -> Result<(), PlanError> {
        if !self.exists(id).await? {
            return Err(PlanError::NotFound(id.clone()));
        }

        let removed = self
            .bounded(self.kv.delete(&[body_key(id), tag_key(id)]))
            .await?;
        match removed {
            0 => {
                tracing::debug!("plan removed concurrently");
                Err(PlanError::NotFound(id.clone()))
            }
            1 => {
                tracing::warn!("deleted plan had no tag slot");
                Ok(())
            }
            _ => {
                tracing::info!("plan deleted");
                Ok(())
            }
        }
    }

    /// Whether a plan body is stored under `id`.
    pub async fn exists(&self, id: &ObjectId) -> Result<bool, PlanError> {
        if is_reserved_id(id) {
            return Ok(false);
        }
        let body = self.bounded(self.kv.get(&body_key(id))).await?;
        Ok(body.is_some())
    }

    /// Check that the backing store answers within the deadline.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(self.kv.ping()).await
    }
}
