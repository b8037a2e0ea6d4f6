//! # Error Hierarchy
//!
//! Structured error types for the foundational layer, built with `thiserror`.
//! Each variant carries the offending input so operators can diagnose a
//! rejected request without guesswork.

use thiserror::Error;

/// Errors during canonical serialization of a plan body.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The value could not be converted into a JSON tree.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// Writing into the output buffer failed.
    #[error("canonical write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Object identifiers must be non-empty.
    #[error("invalid object ID: must be non-empty")]
    EmptyObjectId,

    /// An integrity tag string is not 64 lowercase hex characters.
    #[error("invalid integrity tag: \"{0}\" (expected 64 lowercase hex characters)")]
    InvalidTag(String),
}
