//! Token cache persistence.
//!
//! Tokens live in a small JSON file next to the working directory. A
//! missing or malformed file is treated as "not signed in" rather than an
//! error, since the provider can recover by refreshing or asking the
//! operator to authenticate out of band.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Default location of the on-disk token cache.
pub const DEFAULT_TOKEN_PATH: &str = ".tokens.json";

/// Cached OAuth token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCache {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry instant as Unix milliseconds.
    pub expires_at: i64,
}

impl TokenCache {
    /// Whether the access token is expired, applying a safety buffer so a
    /// token about to lapse mid-request counts as expired.
    pub fn is_expired(&self, buffer: Duration) -> bool {
        let now_ms = Utc::now().timestamp_millis();
        now_ms >= self.expires_at - buffer.as_millis() as i64
    }
}

/// Persist tokens to disk as pretty-printed JSON.
pub fn save_tokens(tokens: &TokenCache, path: impl AsRef<Path>) -> std::io::Result<()> {
    let contents = serde_json::to_string_pretty(tokens)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, contents)
}

/// Load tokens from disk. Returns `None` when the file is missing, unreadable,
/// or does not hold a complete token pair.
pub fn load_tokens(path: impl AsRef<Path>) -> Option<TokenCache> {
    let raw = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

/// Remove the token cache file if present.
pub fn clear_tokens(path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_expiring_in(ms: i64) -> TokenCache {
        TokenCache {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: Utc::now().timestamp_millis() + ms,
        }
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let tokens = cache_expiring_in(10 * 60 * 1000);
        assert!(!tokens.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn token_within_buffer_counts_as_expired() {
        // Expires in 30s, buffer is 60s.
        let tokens = cache_expiring_in(30 * 1000);
        assert!(tokens.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let tokens = cache_expiring_in(1000);

        save_tokens(&tokens, &path).unwrap();
        let loaded = load_tokens(&path).unwrap();
        assert_eq!(loaded.access_token, tokens.access_token);
        assert_eq!(loaded.expires_at, tokens.expires_at);

        clear_tokens(&path).unwrap();
        assert!(load_tokens(&path).is_none());
    }

    #[test]
    fn malformed_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{\"accessToken\": 42}").unwrap();
        assert!(load_tokens(&path).is_none());
    }
}
