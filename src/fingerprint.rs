//! Schema fingerprints
//!
//! SHA-256 over the compact canonical form, so two documents that differ only
//! in whitespace, attribute order or string escaping share a fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Lowercase hex SHA-256 digest of a canonical schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Fingerprint of an already canonical (compact) schema text.
    pub fn from_canonical(canonical: &str) -> Self {
        Self::from_bytes(canonical.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that `canonical` hashes to this fingerprint.
    pub fn verify(&self, canonical: &str) -> bool {
        Self::from_canonical(canonical) == *self
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
