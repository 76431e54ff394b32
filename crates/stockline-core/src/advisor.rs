//! # Low-Stock & Restock Advisor
//!
//! Derives priority-tagged low-stock entries and reorder suggestions from a
//! snapshot. Output is recomputed on every run and never treated as a
//! source of truth.
//!
//! ## Priority Tiers (threshold T, quantity Q, only rows with Q <= T)
//! ```text
//! ┌────────────────────────────────┬──────────┐
//! │ Q == 0                         │ Critical │
//! │ Q <= 1                         │ High     │
//! │ Q <= max(1, ceil(T / 2))       │ Medium   │
//! │ otherwise                      │ Low      │
//! └────────────────────────────────┴──────────┘
//! ```
//!
//! ## Reorder Quantity
//! ```text
//! base            = 2 × T
//! velocity buffer = (QtySold / 30 days) × 30 days, 0 when nothing sold
//! suggested       = max(5, base + velocity buffer)
//! ```

use std::cmp::Reverse;

use crate::types::{
    InventoryItem, InventorySnapshot, LowStockEntry, LowStockPriority, RestockPriority,
    RestockSuggestion,
};

/// Smallest reorder ever suggested.
pub const MIN_REORDER_QTY: i64 = 5;

// =============================================================================
// Low-Stock Detection
// =============================================================================

/// Tier for one quantity against a threshold.
pub fn low_stock_priority(qty_on_hand: i64, threshold: i64) -> LowStockPriority {
    let medium_ceiling = (threshold.saturating_add(1) / 2).max(1);
    if qty_on_hand <= 0 {
        LowStockPriority::Critical
    } else if qty_on_hand <= 1 {
        LowStockPriority::High
    } else if qty_on_hand <= medium_ceiling {
        LowStockPriority::Medium
    } else {
        LowStockPriority::Low
    }
}

/// Rows at or below `threshold`, most urgent first.
///
/// Ties within a tier go to the lower quantity on hand; beyond that the
/// snapshot order is kept.
///
/// ## Example
/// ```rust
/// use stockline_core::advisor::detect_low_stock;
/// use stockline_core::{InventoryItem, InventorySnapshot, LowStockPriority};
///
/// let snapshot = InventorySnapshot::new(vec![
///     InventoryItem::new("A", 3),
///     InventoryItem::new("B", 0),
///     InventoryItem::new("C", 10),
/// ]);
/// let entries = detect_low_stock(&snapshot, 5);
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].sku, "B");
/// assert_eq!(entries[0].priority, LowStockPriority::Critical);
/// ```
pub fn detect_low_stock(snapshot: &InventorySnapshot, threshold: i64) -> Vec<LowStockEntry> {
    let mut entries: Vec<LowStockEntry> = snapshot
        .items
        .iter()
        .filter(|item| item.qty_on_hand <= threshold)
        .map(|item| low_stock_entry(item, threshold))
        .collect();

    entries.sort_by_key(|entry| (Reverse(entry.priority), entry.qty_on_hand));
    entries
}

fn low_stock_entry(item: &InventoryItem, threshold: i64) -> LowStockEntry {
    LowStockEntry {
        sku: item.sku.clone(),
        name: item.name.clone(),
        category: item.category.clone(),
        location: item.location.clone(),
        qty_on_hand: item.qty_on_hand,
        qty_sold: item.qty_sold,
        threshold,
        priority: low_stock_priority(item.qty_on_hand, threshold),
    }
}

// =============================================================================
// Restock Suggestions
// =============================================================================

/// Reorder quantity for one row.
pub fn suggested_reorder(qty_sold: i64, threshold: i64) -> i64 {
    let base = threshold.saturating_mul(2);
    // sold count covers one window, so one window of velocity is the sold count
    let velocity_buffer = qty_sold.max(0);
    base.saturating_add(velocity_buffer).max(MIN_REORDER_QTY)
}

/// Reorder urgency: High when out of stock, Medium at or below half the
/// threshold, otherwise Low.
pub fn restock_priority(qty_on_hand: i64, threshold: i64) -> RestockPriority {
    if qty_on_hand <= 0 {
        RestockPriority::High
    } else if qty_on_hand.saturating_mul(2) <= threshold {
        RestockPriority::Medium
    } else {
        RestockPriority::Low
    }
}

/// One suggestion per low-stock entry, most urgent first.
pub fn restock_suggestions(entries: &[LowStockEntry]) -> Vec<RestockSuggestion> {
    let mut suggestions: Vec<RestockSuggestion> = entries
        .iter()
        .map(|entry| RestockSuggestion {
            sku: entry.sku.clone(),
            name: entry.name.clone(),
            current_qty: entry.qty_on_hand,
            threshold: entry.threshold,
            suggested_reorder: suggested_reorder(entry.qty_sold, entry.threshold),
            priority: restock_priority(entry.qty_on_hand, entry.threshold),
        })
        .collect();

    suggestions.sort_by_key(|s| (Reverse(s.priority), s.current_qty));
    suggestions
}

/// Convenience: detect, then suggest.
pub fn advise(
    snapshot: &InventorySnapshot,
    threshold: i64,
) -> (Vec<LowStockEntry>, Vec<RestockSuggestion>) {
    let entries = detect_low_stock(snapshot, threshold);
    let suggestions = restock_suggestions(&entries);
    (entries, suggestions)
}

// =============================================================================
// Unit Tests
// =============================================================================
