use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use snap_auth::Subject;

/// Number of random bytes backing a screenshot id
const ID_BYTES: usize = 32;

/// Unique, unguessable identifier for a screenshot.
///
/// Drawn from a 256-bit random space so concurrent creators never observe
/// the same value, and possession of an id carries no information about
/// ownership or creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenshotId(String);

impl ScreenshotId {
    /// Generate a new random screenshot id
    pub fn new() -> Self {
        let mut buf = [0u8; ID_BYTES];
        OsRng.fill_bytes(&mut buf);
        Self(URL_SAFE_NO_PAD.encode(buf))
    }

    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScreenshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata row for a stored screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotMeta {
    pub id: ScreenshotId,
    pub owner: Subject,
    pub content_type: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// A stored screenshot: metadata plus its immutable content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub meta: ScreenshotMeta,
    pub content: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct() {
        let a = ScreenshotId::new();
        let b = ScreenshotId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_url_safe() {
        let id = ScreenshotId::new();
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        // 32 bytes of entropy, base64url without padding
        assert_eq!(id.as_str().len(), 43);
    }

    #[test]
    fn meta_round_trips_through_json() {
        let meta = ScreenshotMeta {
            id: ScreenshotId::new(),
            owner: Subject::from("alice"),
            content_type: "image/png".to_string(),
            size_bytes: 10,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let json = serde_json::to_string(&meta).unwrap();
        let back: ScreenshotMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
