//! # Digest Module
//!
//! Exact-match detection of previously catalogued fakes.
//!
//! ## How It Works
//! 1. Compute the SHA-256 of the raw upload (before any decoding)
//! 2. Look it up in an immutable set loaded once at startup
//! 3. A hit decides the verdict on its own: FAKE, 100%
//!
//! The digest file is optional. If it is missing or malformed the
//! matcher starts empty and logs a warning, so the rest of the
//! detector keeps working.

mod database;

pub use database::{DigestDatabase, DigestFile};

use crate::error::DigestError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;

/// SHA-256 of an upload's raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Digest a raw buffer. Empty buffers are rejected.
    pub fn of(bytes: &[u8]) -> Result<Self, DigestError> {
        if bytes.is_empty() {
            return Err(DigestError::EmptyInput);
        }
        Ok(Self(Sha256::digest(bytes).into()))
    }

    /// Parse a 64-character hex string, ignoring case and surrounding whitespace
    pub fn from_hex(value: &str) -> Result<Self, DigestError> {
        let invalid = || DigestError::InvalidHex {
            value: value.to_string(),
        };

        let trimmed = value.trim();
        if trimmed.len() != 64 {
            return Err(invalid());
        }

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(trimmed, &mut bytes).map_err(|_| invalid())?;
        Ok(Self(bytes))
    }

    /// Lowercase hex, the format used in the digest file
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Membership test against the known-fake digest set
#[derive(Debug, Clone, Default)]
pub struct HashMatcher {
    known_fakes: HashSet<ContentDigest>,
}

impl HashMatcher {
    /// A matcher that never matches
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a matcher from already-parsed digests
    pub fn from_digests(digests: impl IntoIterator<Item = ContentDigest>) -> Self {
        Self {
            known_fakes: digests.into_iter().collect(),
        }
    }

    /// Load the digest file, degrading to an empty set on any failure.
    pub fn load_or_empty(path: &Path) -> Self {
        match DigestDatabase::load(path) {
            Ok(database) => {
                tracing::info!(
                    "Loaded {} known-fake digests from {}",
                    database.len(),
                    path.display()
                );
                database.into_matcher()
            }
            Err(reason) => {
                tracing::warn!(
                    "Known-fake digests unavailable ({}); hash-based detection disabled",
                    reason
                );
                Self::empty()
            }
        }
    }

    /// Does this upload match a catalogued fake?
    pub fn matches(&self, raw: &[u8]) -> Result<bool, DigestError> {
        let digest = ContentDigest::of(raw)?;
        Ok(self.contains(&digest))
    }

    pub fn contains(&self, digest: &ContentDigest) -> bool {
        self.known_fakes.contains(digest)
    }

    pub fn len(&self) -> usize {
        self.known_fakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_fakes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("abc")
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn digest_matches_known_vector() {
        let digest = ContentDigest::of(b"abc").unwrap();
        assert_eq!(digest.to_hex(), ABC_SHA256);
    }

    #[test]
    fn identical_bytes_give_identical_digest() {
        let a = ContentDigest::of(b"same payload").unwrap();
        let b = ContentDigest::of(b"same payload").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_buffer_is_an_error() {
        assert_eq!(ContentDigest::of(&[]), Err(DigestError::EmptyInput));

        let matcher = HashMatcher::empty();
        assert_eq!(matcher.matches(&[]), Err(DigestError::EmptyInput));
    }

    #[test]
    fn hex_parsing_is_case_insensitive() {
        let lower = ContentDigest::from_hex(ABC_SHA256).unwrap();
        let upper = ContentDigest::from_hex(&ABC_SHA256.to_uppercase()).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn hex_parsing_rejects_wrong_length() {
        assert!(matches!(
            ContentDigest::from_hex("abcd"),
            Err(DigestError::InvalidHex { .. })
        ));
        assert!(ContentDigest::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn matcher_finds_every_catalogued_digest() {
        let payloads: Vec<&[u8]> = vec![b"fake one", b"fake two", b"fake three"];
        let matcher = HashMatcher::from_digests(
            payloads.iter().map(|p| ContentDigest::of(p).unwrap()),
        );

        for payload in &payloads {
            assert!(matcher.matches(payload).unwrap());
        }
        assert!(!matcher.matches(b"authentic photo").unwrap());
        assert_eq!(matcher.len(), 3);
    }

    #[test]
    fn missing_file_gives_empty_matcher() {
        let matcher = HashMatcher::load_or_empty(Path::new("/nonexistent/hashes.json"));
        assert!(matcher.is_empty());
    }
}
