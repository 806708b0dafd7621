//! The known-fake digest file.
//!
//! ```json
//! {
//!   "description": "SHA256 hashes of known fake images",
//!   "total_images": 2,
//!   "hashes": ["ba78...15ad", "..."]
//! }
//! ```

use super::{ContentDigest, HashMatcher};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// On-disk layout of the digest file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestFile {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total_images: usize,
    pub hashes: Vec<String>,
}

/// Parsed, de-duplicated digest set
#[derive(Debug, Clone, Default)]
pub struct DigestDatabase {
    pub description: String,
    digests: HashSet<ContentDigest>,
}

impl DigestDatabase {
    /// Read and parse a digest file.
    ///
    /// The error is a display string because callers only ever log it.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&text).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Parse digest-file JSON. Individual bad entries are skipped.
    pub fn parse(text: &str) -> Result<Self, String> {
        let file: DigestFile = serde_json::from_str(text).map_err(|e| e.to_string())?;

        let mut digests = HashSet::with_capacity(file.hashes.len());
        for entry in &file.hashes {
            match ContentDigest::from_hex(entry) {
                Ok(digest) => {
                    digests.insert(digest);
                }
                Err(e) => tracing::warn!("Skipping digest entry: {}", e),
            }
        }

        if file.total_images != 0 && file.total_images != digests.len() {
            tracing::warn!(
                "Digest file declares {} images but holds {} valid unique digests",
                file.total_images,
                digests.len()
            );
        }

        Ok(Self {
            description: file.description,
            digests,
        })
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn into_matcher(self) -> HashMatcher {
        HashMatcher::from_digests(self.digests)
    }
}
