//! # plan-schema — Plan Document Validation
//!
//! Runtime JSON Schema validation for plan documents submitted to
//! `POST /plans`.
//!
//! ## Design
//!
//! The schema is read from a well-known location and compiled exactly once,
//! at process start. The compiled [`PlanSchema`] is immutable and is shared
//! by every request handler. A schema that cannot be loaded or compiled is a
//! startup failure: no request is ever validated against a missing schema,
//! which keeps validation fail-closed.

pub mod validate;

// Re-export primary types.
pub use validate::{PlanSchema, SchemaError, SchemaViolation, DEFAULT_SCHEMA_PATH};
