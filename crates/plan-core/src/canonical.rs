//! # Canonical Serialization
//!
//! This module defines [`CanonicalBytes`], the sole construction path for the
//! bytes that are written to the body slot and hashed into an
//! [`IntegrityTag`](crate::IntegrityTag).
//!
//! ## Rules
//!
//! 1. Sort object keys lexicographically (by UTF-8 bytes), at every depth.
//! 2. Use compact separators (no whitespace).
//! 3. Leave every scalar untouched: numbers keep their `serde_json`
//!    representation and strings are never reinterpreted.
//!
//! Rule 3 keeps the store lossless: `parse(canonical(v)) == v` for every
//! JSON value `v`. Key ordering is applied explicitly rather than relying on
//! `serde_json::Map` iteration order, which changes under the
//! `preserve_order` feature.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by sorted-key compact JSON serialization.
///
/// The inner `Vec<u8>` is private — downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`] or
/// [`CanonicalBytes::from_value()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(&value)
    }

    /// Construct canonical bytes from an already-parsed JSON tree.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        let mut out = Vec::with_capacity(128);
        write_canonical(&mut out, value)?;
        Ok(Self(out))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the byte sequence is empty (never true for valid JSON).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn write_canonical(out: &mut Vec<u8>, value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.write_all(b"{")?;
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.write_all(b",")?;
                }
                serde_json::to_writer(&mut *out, key)?;
                out.write_all(b":")?;
                write_canonical(out, val)?;
            }
            out.write_all(b"}")?;
        }
        Value::Array(items) => {
            out.write_all(b"[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_all(b",")?;
                }
                write_canonical(out, item)?;
            }
            out.write_all(b"]")?;
        }
        scalar => serde_json::to_writer(&mut *out, scalar)?,
    }
    Ok(())
}
