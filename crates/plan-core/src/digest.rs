//! # Integrity Tags
//!
//! [`IntegrityTag`] is the content-derived validator stored next to every
//! plan body and echoed in the HTTP `ETag` header. It is the lowercase hex
//! SHA-256 digest of the exact stored bytes.
//!
//! ## Invariant
//!
//! A tag is only ever produced by hashing bytes ([`IntegrityTag::generate`])
//! or by parsing a string that has the exact shape of such a hash
//! ([`IntegrityTag::parse`]). Comparison against a caller-supplied validator
//! ([`IntegrityTag::matches`]) is byte-exact.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::ValidationError;

/// Length of a hex-encoded tag: 32 digest bytes, two characters each.
pub const TAG_HEX_LEN: usize = 64;

/// Compute the lowercase hex SHA-256 digest of raw bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// A fixed-length hex-encoded SHA-256 digest of a plan's stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IntegrityTag(String);

impl IntegrityTag {
    /// Derive the tag of an arbitrary byte sequence.
    ///
    /// Used on the read path to regenerate a missing tag from bytes that
    /// were already stored.
    pub fn generate(data: &[u8]) -> Self {
        Self(sha256_hex(data))
    }

    /// Derive the tag of canonical bytes about to be stored.
    pub fn of(bytes: &CanonicalBytes) -> Self {
        Self::generate(bytes.as_bytes())
    }

    /// Parse a tag previously produced by [`IntegrityTag::generate`].
    ///
    /// Accepts exactly 64 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let well_formed = s.len() == TAG_HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidTag(s.to_string()))
        }
    }

    /// The tag as it appears in the `ETag` header and in the tag slot.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Byte-exact comparison against a caller-supplied validator.
    ///
    /// No weak comparison, no quote stripping, no `*` wildcard, no list
    /// splitting.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes() == candidate.as_bytes()
    }
}

impl TryFrom<String> for IntegrityTag {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IntegrityTag> for String {
    fn from(tag: IntegrityTag) -> Self {
        tag.0
    }
}

impl std::fmt::Display for IntegrityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_vector_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_vector_abc() {
        assert_eq!(
            IntegrityTag::generate(b"abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn generate_is_deterministic() {
        let a = IntegrityTag::generate(br#"{"objectId":"p1"}"#);
        let b = IntegrityTag::generate(br#"{"objectId":"p1"}"#);
        assert_eq!(a, b);
    }

    #[test]
    fn single_byte_difference_changes_tag() {
        let a = IntegrityTag::generate(br#"{"objectId":"p1"}"#);
        let b = IntegrityTag::generate(br#"{"objectId":"p2"}"#);
        assert_ne!(a, b);
    }

    #[test]
    fn tag_is_fixed_length_lowercase_hex() {
        let tag = IntegrityTag::generate(b"anything");
        assert_eq!(tag.as_str().len(), TAG_HEX_LEN);
        assert!(tag
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn of_canonical_equals_generate_on_bytes() {
        let bytes = CanonicalBytes::from_value(&json!({"b": 1, "a": 2})).unwrap();
        assert_eq!(
            IntegrityTag::of(&bytes),
            IntegrityTag::generate(br#"{"a":2,"b":1}"#)
        );
    }

    #[test]
    fn parse_accepts_generated_tags() {
        let tag = IntegrityTag::generate(b"x");
        assert_eq!(IntegrityTag::parse(tag.as_str()).unwrap(), tag);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(IntegrityTag::parse("").is_err());
        assert!(IntegrityTag::parse("abc").is_err());
        assert!(IntegrityTag::parse(&"A".repeat(64)).is_err());
        assert!(IntegrityTag::parse(&"g".repeat(64)).is_err());
        assert!(IntegrityTag::parse(&"a".repeat(65)).is_err());
    }

    #[test]
    fn matches_is_byte_exact() {
        let tag = IntegrityTag::generate(b"x");
        assert!(tag.matches(tag.as_str()));
        assert!(!tag.matches(&format!("\"{}\"", tag.as_str())));
        assert!(!tag.matches(&format!("W/{}", tag.as_str())));
        assert!(!tag.matches(&tag.as_str().to_uppercase()));
        assert!(!tag.matches("*"));
        assert!(!tag.matches(""));
    }

    #[test]
    fn serde_is_transparent_string() {
        let tag = IntegrityTag::generate(b"x");
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, format!("\"{}\"", tag.as_str()));
        let back: IntegrityTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
        assert!(serde_json::from_str::<IntegrityTag>("\"nope\"").is_err());
    }
}
