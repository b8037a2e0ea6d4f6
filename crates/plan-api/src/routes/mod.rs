//! # API Route Modules
//!
//! - `plans`: create, conditional read and delete of plan documents.

pub mod plans;
