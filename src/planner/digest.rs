//! Manifest hashing for change detection.
//!
//! Digests of the manifests removed by the prune phase are compared with
//! the freshly rendered ones so a run can tell which targets changed.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::error::DeployError;

/// Hasher for rendered manifests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestHasher;

impl ManifestHasher {
    /// Creates a new manifest hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the SHA-256 digest of a manifest as lowercase hex.
    #[must_use]
    pub fn hash_manifest(&self, content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    /// Reads a manifest from disk and computes its digest.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Io`] carrying `path` if the file cannot be read.
    pub fn hash_file(&self, path: &Path) -> Result<String, DeployError> {
        let content = fs::read(path).map_err(|e| DeployError::io(path, e))?;
        Ok(self.hash_manifest(&content))
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }

    /// Compares two hashes to determine if they are equal.
    #[must_use]
    pub fn hashes_match(hash1: &str, hash2: &str) -> bool {
        hash1.len() == hash2.len()
            && hash1
                .bytes()
                .zip(hash2.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}
