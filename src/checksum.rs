//! Digests for stable identifiers and source documents

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Produces stable identifiers from an ordered list of parts.
///
/// An absent part hashes as the empty string so every call site feeds a
/// fixed number of parts. Part boundaries are not normalized: `["ab", "c"]`
/// and `["a", "bc"]` are not distinguished.
pub trait IdHasher {
    fn id(&self, parts: &[Option<&str>]) -> String;

    /// Convenience for call sites where every part is present
    fn id_of(&self, parts: &[&str]) -> String {
        let parts: Vec<Option<&str>> = parts.iter().copied().map(Some).collect();
        self.id(&parts)
    }
}

/// SHA-256 over the concatenated parts, hex encoded
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl IdHasher for Sha256Hasher {
    fn id(&self, parts: &[Option<&str>]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.unwrap_or("").as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// SHA256 checksum of a source document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Verify that content matches this checksum
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::from_bytes(data) == *self
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_sha256_hex() {
        // sha256("") is a well-known constant
        assert_eq!(
            Sha256Hasher.id(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(Sha256Hasher.id_of(&["Pet"]).len(), 64);
    }

    #[test]
    fn test_id_consistency() {
        let a = Sha256Hasher.id_of(&["Pet", "name", "string"]);
        let b = Sha256Hasher.id_of(&["Pet", "name", "string"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_id_distinguishes_kind_and_order() {
        let string = Sha256Hasher.id_of(&["Pet", "tag", "string"]);
        let integer = Sha256Hasher.id_of(&["Pet", "tag", "integer"]);
        let swapped = Sha256Hasher.id_of(&["tag", "Pet", "string"]);
        assert_ne!(string, integer);
        assert_ne!(string, swapped);
    }

    #[test]
    fn test_absent_part_hashes_as_empty() {
        let absent = Sha256Hasher.id(&[Some("Pet"), Some("meta"), None]);
        let empty = Sha256Hasher.id(&[Some("Pet"), Some("meta"), Some("")]);
        assert_eq!(absent, empty);
    }

    #[test]
    fn test_part_boundaries_not_normalized() {
        let joined = Sha256Hasher.id_of(&["ab", "c"]);
        let split = Sha256Hasher.id_of(&["a", "bc"]);
        assert_eq!(joined, split);
    }

    #[test]
    fn test_checksum_verification() {
        let content = br#"{"openapi": "3.0.0"}"#;
        let checksum = Checksum::from_bytes(content);
        assert!(checksum.verify(content));
        assert!(!checksum.verify(b"different content"));
    }
}
