//! Error taxonomy for model calls, with retry classification.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Broad classification used to decide whether a failed call is worth
/// retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// 429 from the provider.
    RateLimited,
    /// 5xx from the provider.
    ServerError,
    /// 4xx other than 429; retrying will not help.
    ClientError,
    /// Connection, DNS, or timeout failure before a response arrived.
    NetworkError,
    /// The response arrived but could not be decoded.
    ParseError,
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmErrorKind::RateLimited => "rate limited",
            LlmErrorKind::ServerError => "server error",
            LlmErrorKind::ClientError => "client error",
            LlmErrorKind::NetworkError => "network error",
            LlmErrorKind::ParseError => "parse error",
        };
        f.write_str(name)
    }
}

/// A failed model call.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    pub status: Option<u16>,
    /// Server-suggested backoff, from a Retry-After header.
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn rate_limited(message: String, retry_after: Option<Duration>) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            message,
            status: Some(429),
            retry_after,
        }
    }

    pub fn server_error(status: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ServerError,
            message,
            status: Some(status),
            retry_after: None,
        }
    }

    pub fn client_error(status: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            message,
            status: Some(status),
            retry_after: None,
        }
    }

    pub fn network_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::NetworkError,
            message,
            status: None,
            retry_after: None,
        }
    }

    pub fn parse_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            message,
            status: None,
            retry_after: None,
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }

    /// Backoff before the given retry attempt (0-based). Honors Retry-After
    /// when present, otherwise exponential starting at 500ms, capped at 30s.
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let Some(retry_after) = self.retry_after {
            return retry_after;
        }
        let millis = 500u64.saturating_mul(1u64 << attempt.min(10));
        Duration::from_millis(millis.min(30_000))
    }
}

/// Map an HTTP status to an error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        500..=599 => LlmErrorKind::ServerError,
        _ => LlmErrorKind::ClientError,
    }
}

/// Bounds on the retry loop.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub max_retry_duration: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_retry_duration: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    pub fn should_retry(&self, error: &LlmError) -> bool {
        error.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(classify_http_status(429), LlmErrorKind::RateLimited);
        assert_eq!(classify_http_status(500), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(503), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(400), LlmErrorKind::ClientError);
        assert_eq!(classify_http_status(404), LlmErrorKind::ClientError);
    }

    #[test]
    fn retry_after_wins_over_backoff() {
        let err = LlmError::rate_limited("slow down".to_string(), Some(Duration::from_secs(7)));
        assert_eq!(err.suggested_delay(0), Duration::from_secs(7));
        assert_eq!(err.suggested_delay(5), Duration::from_secs(7));
    }

    #[test]
    fn backoff_grows_and_caps() {
        let err = LlmError::server_error(500, "boom".to_string());
        assert_eq!(err.suggested_delay(0), Duration::from_millis(500));
        assert_eq!(err.suggested_delay(1), Duration::from_millis(1000));
        assert_eq!(err.suggested_delay(20), Duration::from_secs(30));
    }

    #[test]
    fn client_errors_are_not_retried() {
        let config = RetryConfig::default();
        assert!(!config.should_retry(&LlmError::client_error(400, "bad".to_string())));
        assert!(config.should_retry(&LlmError::network_error("reset".to_string())));
    }
}
