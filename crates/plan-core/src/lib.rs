#![deny(missing_docs)]

//! # plan-core — Foundational Types for the Plan Service
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `serde_json`,
//! `thiserror`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** A plan's [`ObjectId`] is
//!    validated once at construction and is then usable directly as a
//!    storage key.
//!
//! 2. **[`CanonicalBytes`] is the sole path to stored bytes.** Every plan
//!    body that reaches storage is serialized through
//!    `CanonicalBytes::new()` (sorted keys, compact separators).
//!
//! 3. **[`IntegrityTag`] is derived, never assigned.** Tags are computed
//!    from bytes with SHA-256 and carried as 64 lowercase hex characters,
//!    the exact value emitted in the HTTP `ETag` header.
//!
//! 4. **Structured errors with `thiserror`** — no `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_hex, IntegrityTag, TAG_HEX_LEN};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::ObjectId;
