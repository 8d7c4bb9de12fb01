//! Content fingerprints for captured payloads.
//!
//! A [`Fingerprint`] is the first 12 hex characters of the SHA-256 digest of
//! a payload's compact JSON text. Object keys serialize in sorted order, so
//! two payloads that differ only in key order share a fingerprint.

use std::fmt;

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 12;

/// Short, human-scannable digest of a JSON payload.
///
/// Truncation trades collision margin for readability. That is acceptable
/// for a personal capture log but makes fingerprints unsuitable as a
/// security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `payload`.
    pub fn of(payload: &Value) -> Self {
        // Compact form; object keys come out sorted.
        let canonical = payload.to_string();
        let digest = Sha256::digest(canonical.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(FINGERPRINT_LEN);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The marker line that tags an entry in a log file.
    ///
    /// This exact text is what duplicate detection searches for, and it must
    /// stay byte-compatible with logs written by earlier versions.
    pub fn marker(&self) -> String {
        format!("<!-- hash:{} -->", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
