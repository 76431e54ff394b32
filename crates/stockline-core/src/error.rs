//! # Error Types
//!
//! Domain-specific error types for stockline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockline-core errors (this file)                                     │
//! │  ├── CoreError        - Fatal reconciliation failures                  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockline-db errors (separate crate)                                  │
//! │  └── DbError          - Repository failures                            │
//! │                                                                         │
//! │  stockline-sync errors (separate crate)                                │
//! │  └── SyncError        - Gateway / orchestration failures               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → run report            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per-sale data problems (unknown SKU, non-positive quantity, duplicate hash)
//! are NOT errors here. They are recovered inside the batch and show up in
//! [`crate::types::ReconcileReport`].

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors that abort a reconciliation call.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale would drive quantity on hand below zero under the strict policy.
    ///
    /// ## When This Occurs
    /// ```text
    /// QtyOnHand = 2, sale quantity = 5, policy = Strict
    ///      │
    ///      ▼
    /// NegativeInventory { sku: "JD1-BLK-10", on_hand: 2, requested: 5 }
    ///      │
    ///      ▼
    /// Whole batch rejected, snapshot untouched
    /// ```
    #[error("Sale would make inventory negative for SKU {sku}: on hand {on_hand}, requested {requested}")]
    NegativeInventory {
        sku: String,
        on_hand: i64,
        requested: i64,
    },

    /// The snapshot is malformed (missing SKU / quantity columns, blank or
    /// duplicate SKUs). Raised before any mutation.
    #[error("Invalid inventory schema: {0}")]
    InvalidSchema(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidSchema error.
    pub fn schema(reason: impl Into<String>) -> Self {
        CoreError::InvalidSchema(reason.into())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparsable price, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
