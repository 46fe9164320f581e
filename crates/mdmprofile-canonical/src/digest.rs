use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};
use std::sync::OnceLock;

use crate::validation::ValidationError;
use crate::value::Value;

/// Domain separator prepended to the canonical JSON before hashing.
const DOCUMENT_DOMAIN_SEPARATOR: &[u8] = b"mdmprofile:document:v1\0";

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestAlg {
    /// SHA-256.
    #[serde(rename = "sha-256")]
    Sha256,
}

/// Algorithm + bytes digest, encoded as base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    /// Digest algorithm (currently always `sha-256`).
    pub alg: DigestAlg,
    /// Base64URL (no padding) digest bytes.
    #[serde(rename = "b64")]
    pub b64: String,
}

/// Error during digest computation.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// The value could not be turned into JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// RFC 8785 canonicalization failed.
    #[error("canonical JSON failed: {0}")]
    CanonicalJson(String),
    /// Digest construction failed.
    #[error("digest construction failed: {0}")]
    Digest(#[from] ValidationError),
}

fn digest_b64() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{43,44}$").expect("invalid regex"))
}

impl Digest {
    /// Constructs a validated digest.
    pub fn new(alg: DigestAlg, b64: impl Into<String>) -> Result<Self, ValidationError> {
        let b64 = b64.into();
        if !digest_b64().is_match(&b64) {
            return Err(ValidationError::PatternMismatch {
                field: "digest",
                value: b64,
            });
        }
        Ok(Digest { alg, b64 })
    }

    /// Structural hash of a document.
    ///
    /// Formula: `sha256(domain_separator || rfc8785_json(value))`. The JSON
    /// form sorts object members itself, so two documents that differ only in
    /// dictionary key order hash the same; array order still counts.
    pub fn of_value(value: &Value) -> Result<Self, DigestError> {
        let json =
            serde_json::to_value(value).map_err(|e| DigestError::Serialization(e.to_string()))?;
        let canonical =
            canonical_json::to_string(&json).map_err(|e| DigestError::CanonicalJson(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(DOCUMENT_DOMAIN_SEPARATOR);
        hasher.update(canonical.as_bytes());
        let hash_bytes = hasher.finalize();

        let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash_bytes);
        Ok(Digest::new(DigestAlg::Sha256, b64)?)
    }
}
