//! # Retry Policy
//!
//! Turns one raw response into a typed outcome, and owns the wait schedule.
//!
//! ## Outcome per Attempt
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RawResponse / TransportError          Attempt                          │
//! │  ────────────────────────────          ───────                          │
//! │  2xx                           ──►     Success(body)                    │
//! │  404                           ──►     NotFound                         │
//! │  401                           ──►     Fatal(Authentication)            │
//! │  429                           ──►     RateLimited(Retry-After or 60s)  │
//! │  5xx                           ──►     Retryable(Server)                │
//! │  timeout / connect failure     ──►     Retryable(Connection)            │
//! │  other non-2xx                 ──►     Retryable(Api)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Budgets
//! ```text
//! Retryable    max_attempts per request, waits 1s, 2s, 4s ... (capped)
//! RateLimited  max_rate_limit_waits per request, own counter; a 429 never
//!              uses up a transient attempt
//! ```

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::time::Duration;

use crate::config::ApiSettings;
use crate::error::SyncError;

use super::source::{RawResponse, TransportError};

// =============================================================================
// Attempt Outcome
// =============================================================================

/// What a single attempt means for the retry loop.
#[derive(Debug)]
pub enum Attempt {
    /// 2xx; the body is still undecoded.
    Success(String),
    /// 404.
    NotFound,
    /// 429; wait this long, then try again.
    RateLimited(Duration),
    /// Worth another attempt while the budget lasts. The error is what the
    /// caller sees once it does not.
    Retryable(RetryableFailure),
    /// Stop now.
    Fatal(SyncError),
}

/// A transient failure, kept apart from `SyncError` until the attempt
/// count is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryableFailure {
    Server { status: u16 },
    Connection { message: String },
    Api { status: u16, message: String },
}

impl RetryableFailure {
    /// The error reported after `attempts` tries.
    pub fn into_error(self, attempts: u32) -> SyncError {
        match self {
            RetryableFailure::Server { status } => SyncError::Server { status, attempts },
            RetryableFailure::Connection { message } => {
                SyncError::Connection { message, attempts }
            }
            RetryableFailure::Api { status, message } => SyncError::Api { status, message },
        }
    }
}

impl std::fmt::Display for RetryableFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryableFailure::Server { status } => write!(f, "server error {}", status),
            RetryableFailure::Connection { message } => write!(f, "connection error: {}", message),
            RetryableFailure::Api { status, .. } => write!(f, "HTTP {}", status),
        }
    }
}

const MAX_ERROR_BODY_CHARS: usize = 256;

fn body_preview(body: &str) -> String {
    let mut preview: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        preview.push_str("...");
    }
    preview
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Attempt budgets and wait lengths for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub default_retry_after: Duration,
    pub max_rate_limit_waits: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            default_retry_after: Duration::from_secs(60),
            max_rate_limit_waits: 5,
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &ApiSettings) -> Self {
        RetryPolicy {
            max_attempts: settings.max_attempts.max(1),
            base_backoff: Duration::from_millis(settings.base_backoff_ms),
            max_backoff: Duration::from_secs(settings.max_backoff_secs),
            default_retry_after: Duration::from_secs(settings.default_retry_after_secs),
            max_rate_limit_waits: settings.max_rate_limit_waits,
        }
    }

    /// Classifies one attempt.
    pub fn classify(&self, result: Result<RawResponse, TransportError>) -> Attempt {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                return Attempt::Retryable(RetryableFailure::Connection {
                    message: err.to_string(),
                })
            }
        };

        match response.status {
            200..=299 => Attempt::Success(response.body),
            401 => Attempt::Fatal(SyncError::Authentication),
            404 => Attempt::NotFound,
            429 => Attempt::RateLimited(response.retry_after.unwrap_or(self.default_retry_after)),
            500..=599 => Attempt::Retryable(RetryableFailure::Server {
                status: response.status,
            }),
            status => Attempt::Retryable(RetryableFailure::Api {
                status,
                message: body_preview(&response.body),
            }),
        }
    }

    /// Fresh, deterministic exponential schedule: base, 2×base, 4×base, ...
    /// capped at `max_backoff`.
    pub fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.base_backoff,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: self.max_backoff.max(self.base_backoff),
            max_elapsed_time: None,
            ..Default::default()
        };
        backoff.reset();
        backoff
    }

    /// The first `n` backoff waits, for logging and tests.
    pub fn schedule(&self, n: usize) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (0..n).filter_map(|_| backoff.next_backoff()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::default()
    }

    #[test]
    fn test_classify_statuses() {
        let p = policy();
        assert!(matches!(
            p.classify(Ok(RawResponse::ok(&serde_json::json!({})))),
            Attempt::Success(_)
        ));
        assert!(matches!(
            p.classify(Ok(RawResponse::status(401))),
            Attempt::Fatal(SyncError::Authentication)
        ));
        assert!(matches!(p.classify(Ok(RawResponse::status(404))), Attempt::NotFound));
        assert!(matches!(
            p.classify(Ok(RawResponse::status(503))),
            Attempt::Retryable(RetryableFailure::Server { status: 503 })
        ));
        assert!(matches!(
            p.classify(Ok(RawResponse::status(400))),
            Attempt::Retryable(RetryableFailure::Api { status: 400, .. })
        ));
        assert!(matches!(
            p.classify(Err(TransportError::Timeout("30s".into()))),
            Attempt::Retryable(RetryableFailure::Connection { .. })
        ));
    }

    #[test]
    fn test_rate_limit_hint() {
        let p = policy();
        let hinted = RawResponse::status(429).with_retry_after(Duration::from_secs(2));
        match p.classify(Ok(hinted)) {
            Attempt::RateLimited(wait) => assert_eq!(wait, Duration::from_secs(2)),
            other => panic!("unexpected {:?}", other),
        }
        match p.classify(Ok(RawResponse::status(429))) {
            Attempt::RateLimited(wait) => assert_eq!(wait, Duration::from_secs(60)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_backoff_schedule_doubles_and_caps() {
        let p = RetryPolicy {
            max_backoff: Duration::from_secs(5),
            ..policy()
        };
        assert_eq!(
            p.schedule(5),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(5),
                Duration::from_secs(5),
            ]
        );
    }

    #[test]
    fn test_failure_into_error() {
        let err = RetryableFailure::Server { status: 502 }.into_error(3);
        assert!(matches!(err, SyncError::Server { status: 502, attempts: 3 }));

        let err = RetryableFailure::Connection {
            message: "reset".into(),
        }
        .into_error(3);
        assert!(matches!(err, SyncError::Connection { attempts: 3, .. }));
    }

    #[test]
    fn test_long_error_bodies_truncated() {
        let body = "x".repeat(1000);
        let mut response = RawResponse::status(400);
        response.body = body;
        match policy().classify(Ok(response)) {
            Attempt::Retryable(RetryableFailure::Api { message, .. }) => {
                assert_eq!(message.len(), MAX_ERROR_BODY_CHARS + 3)
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
