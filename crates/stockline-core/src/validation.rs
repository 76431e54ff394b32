//! # Validation Module
//!
//! Input validation for inventory rows and snapshots.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Boundary decode (DTOs, sheet codec)                          │
//! │  ├── Required columns present (SKU, QtyOnHand)                         │
//! │  └── Prices parsed to cents, bad quantities coerced to 0               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── SKU format                                                        │
//! │  ├── Snapshot keys unique and non-blank                                │
//! │  └── Price sanity report                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage (SQLite)                                             │
//! │  └── PRIMARY KEY (tenant_id, sku), NOT NULL columns                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, ValidationError};
use crate::types::{InventoryItem, InventorySnapshot};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest SKU accepted.
pub const MAX_SKU_LEN: usize = 64;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, `-`, `_`, `.` and `/` only (`|` is the hash separator)
///
/// ## Example
/// ```rust
/// use stockline_core::validation::validate_sku;
///
/// assert!(validate_sku("JD1-BLK-10").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A|B").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, '-', '_', '.' and '/'".to_string(),
        });
    }

    Ok(())
}

/// Validates a low-stock threshold read from tenant config.
pub fn validate_threshold(threshold: i64) -> ValidationResult<()> {
    if threshold <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "LowStockThreshold".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Snapshot Validators
// =============================================================================

/// Validates the keys of a snapshot before any mutation.
///
/// Blank SKUs and repeated SKUs make the snapshot unusable as a keyed
/// table and fail with `InvalidSchema`.
pub fn validate_snapshot(snapshot: &InventorySnapshot) -> Result<(), CoreError> {
    snapshot.index_by_sku().map(|_| ())
}

/// Every row with a retail price of zero or less.
pub fn invalid_prices(snapshot: &InventorySnapshot) -> Vec<&InventoryItem> {
    snapshot
        .items
        .iter()
        .filter(|item| !item.retail_price.is_positive())
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("JD1-BLK-10").is_ok());
        assert!(validate_sku("tee_red.m").is_ok());
        assert!(validate_sku("ACC/BELT/32").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold(5).is_ok());
        assert!(validate_threshold(0).is_err());
        assert!(validate_threshold(-3).is_err());
    }

    #[test]
    fn test_validate_snapshot() {
        let ok = InventorySnapshot::new(vec![
            InventoryItem::new("A", 1),
            InventoryItem::new("B", 0),
        ]);
        assert!(validate_snapshot(&ok).is_ok());

        let dup = InventorySnapshot::new(vec![
            InventoryItem::new("A", 1),
            InventoryItem::new(" A ", 0),
        ]);
        assert!(matches!(
            validate_snapshot(&dup),
            Err(CoreError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_invalid_prices() {
        let snapshot = InventorySnapshot::new(vec![
            InventoryItem::new("A", 1).with_price(Money::from_cents(17000)),
            InventoryItem::new("B", 1),
            InventoryItem::new("C", 1).with_price(Money::from_cents(-1)),
        ]);
        let skus: Vec<&str> = invalid_prices(&snapshot)
            .into_iter()
            .map(|item| item.sku.as_str())
            .collect();
        assert_eq!(skus, vec!["B", "C"]);
    }
}
