//! Provider error taxonomy and HTTP error mapping
//!
//! Adapters signal these errors; they never handle them. Only
//! `RateLimited` and `TransientNetwork` are retryable - everything else is
//! fatal and surfaced immediately with the original provider detail.

use crate::providers::retry::Retryable;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors signalled by a backend adapter
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ProviderError {
    /// Missing or invalid credential
    #[error("authentication failed: {detail}")]
    Authentication { detail: String },

    /// Provider signalled throttling; carries a retry-after hint when the
    /// provider supplied one
    #[error("rate limited: {detail}")]
    RateLimited {
        detail: String,
        retry_after: Option<Duration>,
    },

    /// Insufficient credits or balance on the provider account
    #[error("quota exhausted: {detail}")]
    QuotaExhausted { detail: String },

    /// The provider does not know this model identifier
    #[error("model '{model}' not found: {detail}")]
    ModelNotFound { model: String, detail: String },

    /// Connection-level failure, including per-call timeouts
    #[error("transient network failure: {detail}")]
    TransientNetwork { detail: String },

    /// Malformed or unparseable provider response
    #[error("malformed provider response: {detail}")]
    ResponseFormat { detail: String },
}

impl ProviderError {
    /// Whether the retry policy may retry this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::TransientNetwork { .. }
        )
    }

    /// The provider's suggested retry delay, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl Retryable for ProviderError {
    fn is_retryable(&self) -> bool {
        ProviderError::is_retryable(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        ProviderError::retry_after(self)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::TransientNetwork {
                detail: format!("request timed out: {}", err),
            }
        } else if err.is_connect() {
            ProviderError::TransientNetwork {
                detail: format!("connection failed: {}", err),
            }
        } else {
            ProviderError::TransientNetwork {
                detail: err.to_string(),
            }
        }
    }
}

/// Map an HTTP error status, headers and body to a provider error
///
/// Mapping: 401/403 authentication, 402 quota, 404 unknown model, 429 rate
/// limit (with `Retry-After` when parseable), 408/5xx transient, anything
/// else a malformed-interaction error. Bedrock reports throttling inside the
/// body (`ThrottlingException`) rather than always via 429, so the body is
/// sniffed as well.
pub fn map_http_error(
    status: reqwest::StatusCode,
    headers: Option<&reqwest::header::HeaderMap>,
    body: Option<String>,
    model: &str,
) -> ProviderError {
    let detail = body
        .as_deref()
        .and_then(extract_error_message)
        .or(body)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    // Throttling and quota markers can arrive under non-obvious statuses
    let lower = detail.to_lowercase();
    if lower.contains("throttlingexception") || lower.contains("too many requests") {
        return ProviderError::RateLimited {
            detail,
            retry_after: headers.and_then(parse_retry_after),
        };
    }
    if lower.contains("insufficient credits") || lower.contains("insufficient_quota") {
        return ProviderError::QuotaExhausted { detail };
    }

    match status.as_u16() {
        401 | 403 => ProviderError::Authentication { detail },
        402 => ProviderError::QuotaExhausted { detail },
        404 => ProviderError::ModelNotFound {
            model: model.to_string(),
            detail,
        },
        429 => ProviderError::RateLimited {
            detail,
            retry_after: headers.and_then(parse_retry_after),
        },
        408 | 500..=599 => ProviderError::TransientNetwork {
            detail: format!("HTTP {}: {}", status.as_u16(), detail),
        },
        _ => ProviderError::ResponseFormat {
            detail: format!("HTTP {}: {}", status.as_u16(), detail),
        },
    }
}

/// Pull a human-readable message out of a provider error body
///
/// Handles the OpenAI/OpenRouter shape `{"error": {"message": ...}}`, the
/// flat `{"message": ...}` shape, and `{"error": "..."}`.
fn extract_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Some(message.to_string());
    }

    if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }

    if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
        return Some(message.to_string());
    }

    None
}

/// Parse a `Retry-After` header carrying whole seconds
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use reqwest::StatusCode;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::RateLimited {
            detail: "slow down".into(),
            retry_after: None
        }
        .is_retryable());
        assert!(ProviderError::TransientNetwork {
            detail: "reset".into()
        }
        .is_retryable());

        assert!(!ProviderError::Authentication {
            detail: "bad key".into()
        }
        .is_retryable());
        assert!(!ProviderError::QuotaExhausted {
            detail: "no credits".into()
        }
        .is_retryable());
        assert!(!ProviderError::ModelNotFound {
            model: "x".into(),
            detail: "unknown".into()
        }
        .is_retryable());
        assert!(!ProviderError::ResponseFormat {
            detail: "not json".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_status_mapping() {
        let err = map_http_error(StatusCode::UNAUTHORIZED, None, None, "m");
        assert!(matches!(err, ProviderError::Authentication { .. }));

        let err = map_http_error(StatusCode::PAYMENT_REQUIRED, None, None, "m");
        assert!(matches!(err, ProviderError::QuotaExhausted { .. }));

        let err = map_http_error(StatusCode::NOT_FOUND, None, None, "my-model");
        assert!(matches!(err, ProviderError::ModelNotFound { ref model, .. } if model == "my-model"));

        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, None, None, "m");
        assert!(matches!(err, ProviderError::TransientNetwork { .. }));

        let err = map_http_error(StatusCode::BAD_REQUEST, None, None, "m");
        assert!(matches!(err, ProviderError::ResponseFormat { .. }));
    }

    #[test]
    fn test_retry_after_header_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, Some(&headers), None, "m");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_body_message_extraction() {
        let body = r#"{"error": {"message": "Invalid API key", "code": 401}}"#.to_string();
        let err = map_http_error(StatusCode::UNAUTHORIZED, None, Some(body), "m");
        assert_eq!(err.to_string(), "authentication failed: Invalid API key");
    }

    #[test]
    fn test_throttling_in_body_is_rate_limited() {
        let body = r#"{"__type": "ThrottlingException", "message": "ThrottlingException: slow down"}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, None, Some(body.to_string()), "m");
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }

    #[test]
    fn test_quota_marker_in_body() {
        let body = r#"{"error": {"message": "Insufficient credits to run this request"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, None, Some(body.to_string()), "m");
        assert!(matches!(err, ProviderError::QuotaExhausted { .. }));
    }
}
