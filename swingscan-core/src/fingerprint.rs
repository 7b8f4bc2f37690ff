//! Content hashing for configurations and candle series.
//!
//! Reports carry both hashes so two runs can be compared without rereading
//! their inputs.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex-encoded blake3 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 hex characters, enough for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of a value's canonical JSON form.
///
/// Structs serialize fields in declaration order and maps should be
/// `BTreeMap`, so equal values hash equally.
pub fn content_hash<T: Serialize>(value: &T) -> Result<ContentHash, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(ContentHash::from_bytes(json.as_bytes()))
}

/// Hash of a candle series, field by field in little-endian.
pub fn dataset_hash(candles: &[Candle]) -> ContentHash {
    let mut hasher = blake3::Hasher::new();
    for c in candles {
        hasher.update(c.date.to_string().as_bytes());
        for v in [c.open, c.high, c.low, c.close] {
            hasher.update(&v.to_le_bytes());
        }
        hasher.update(&c.volume.to_le_bytes());
    }
    ContentHash(hasher.finalize().to_hex().to_string())
}
