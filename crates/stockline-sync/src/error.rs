//! # Sync Error Types
//!
//! Error types for gateway calls, configuration and orchestrated runs.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Gateway      │  │     Collaborators       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Authentication │  │  Repository (DbError)   │ │
//! │  │  InvalidUrl     │  │  RateLimited    │  │  Reconciliation         │ │
//! │  │  ConfigLoad/Save│  │  Server         │  │    (CoreError)          │ │
//! │  │                 │  │  Connection     │  │                         │ │
//! │  │                 │  │  Api / Decode   │  │                         │ │
//! │  │                 │  │  Cancelled      │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockline_core::CoreError;
use stockline_db::DbError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering gateway, configuration and run failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Base URL could not be parsed or has the wrong scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Gateway Errors
    // =========================================================================
    /// The API rejected the token (401). Never retried.
    #[error("Authentication failed: invalid API token")]
    Authentication,

    /// The API kept answering 429 after the rate-limit wait budget ran out.
    #[error("Rate limited by API after {waits} waits")]
    RateLimited { waits: u32 },

    /// 5xx after every attempt was used.
    #[error("Server error {status} after {attempts} attempts")]
    Server { status: u16, attempts: u32 },

    /// Network failure or timeout after every attempt was used.
    #[error("Connection failed after {attempts} attempts: {message}")]
    Connection { message: String, attempts: u32 },

    /// Any other non-2xx response after every attempt was used.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A 2xx body that is not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The cancellation signal fired during a wait.
    #[error("Sync cancelled")]
    Cancelled,

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// Repository read or write failed.
    #[error("Repository error: {0}")]
    Repository(#[from] DbError),

    /// Reconciliation rejected the batch.
    #[error("Reconciliation failed: {0}")]
    Reconciliation(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true for the transient kinds a later run may get past.
    ///
    /// ## Retryable Errors
    /// - Rate limiting
    /// - Server errors
    /// - Connection failures and timeouts
    ///
    /// ## Non-Retryable Errors
    /// - Authentication
    /// - Configuration errors
    /// - Decode failures and reconciliation rejections
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::RateLimited { .. } | SyncError::Server { .. } | SyncError::Connection { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}
