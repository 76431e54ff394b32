//! # Domain Types
//!
//! Core domain types used throughout Stockline.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │ InventoryItem   │   │   SaleEvent     │   │ SyncBatchFingerprint │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  sku (key)      │   │  sku            │   │  sha256 over sorted  │  │
//! │  │  qty_on_hand    │   │  quantity       │   │  unique sale hashes  │  │
//! │  │  qty_sold       │   │  unit_price     │   └──────────────────────┘  │
//! │  │  retail_price   │   │  date, hash     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │InventorySnapshot│   │ LowStockEntry   │   │ RestockSuggestion    │  │
//! │  │ items + last    │──►│ priority tier   │──►│ suggested_reorder    │  │
//! │  │ fingerprint     │   │ (derived)       │   │ (derived)            │  │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::CoreError;
use crate::hashing;
use crate::money::Money;

// =============================================================================
// Inventory Item
// =============================================================================

/// One stocked variant. SKU is the unique key within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub size: String,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub barcode: Option<String>,

    /// Variant identifier in the remote commerce system, when known.
    #[serde(default)]
    pub external_id: Option<String>,

    /// Retail price in cents.
    #[serde(default)]
    pub retail_price: Money,

    /// Units on hand. Never negative once reconciled.
    pub qty_on_hand: i64,

    /// Cumulative units sold.
    #[serde(default)]
    pub qty_sold: i64,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// Creates an item with only the key and quantity set.
    pub fn new(sku: impl Into<String>, qty_on_hand: i64) -> Self {
        InventoryItem {
            sku: sku.into(),
            name: String::new(),
            category: String::new(),
            size: String::new(),
            color: String::new(),
            barcode: None,
            external_id: None,
            retail_price: Money::zero(),
            qty_on_hand,
            qty_sold: 0,
            location: String::new(),
            last_updated: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.retail_price = price;
        self
    }

    pub fn with_qty_sold(mut self, qty_sold: i64) -> Self {
        self.qty_sold = qty_sold;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Retail value of the units on hand.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.retail_price.multiply_quantity(self.qty_on_hand.max(0))
    }

    /// Checks if the item is out of stock.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.qty_on_hand <= 0
    }
}

// =============================================================================
// Inventory Snapshot
// =============================================================================

/// The authoritative inventory state for one tenant, as read from the
/// repository, plus the fingerprint of the last batch applied to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub items: Vec<InventoryItem>,

    #[serde(default)]
    pub last_sync_fingerprint: Option<SyncBatchFingerprint>,
}

impl InventorySnapshot {
    /// Creates a snapshot with no fingerprint.
    pub fn new(items: Vec<InventoryItem>) -> Self {
        InventorySnapshot {
            items,
            last_sync_fingerprint: None,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up an item by SKU (exact match).
    pub fn get(&self, sku: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.sku == sku)
    }

    /// Looks up an item by SKU for mutation.
    pub fn get_mut(&mut self, sku: &str) -> Option<&mut InventoryItem> {
        self.items.iter_mut().find(|item| item.sku == sku)
    }

    /// Builds a SKU → row index map.
    ///
    /// Fails with `InvalidSchema` on blank or duplicate SKUs, so callers that
    /// mutate by index can rely on a one-to-one mapping.
    pub fn index_by_sku(&self) -> Result<HashMap<String, usize>, CoreError> {
        let mut index = HashMap::with_capacity(self.items.len());
        for (row, item) in self.items.iter().enumerate() {
            let sku = item.sku.trim();
            if sku.is_empty() {
                return Err(CoreError::schema(format!("row {} is missing a SKU", row + 1)));
            }
            if index.insert(sku.to_string(), row).is_some() {
                return Err(CoreError::schema(format!("duplicate SKU '{}'", sku)));
            }
        }
        Ok(index)
    }

    /// Inserts the item, replacing any row with the same SKU.
    pub fn upsert(&mut self, item: InventoryItem) {
        match self.get_mut(&item.sku) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }
}

// =============================================================================
// Sale Event
// =============================================================================

/// One sold line, as fed into reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub sku: String,

    /// Units sold. Must be > 0 to be applied.
    pub quantity: i64,

    #[serde(default)]
    pub unit_price: Money,

    /// Sale date as reported by the source (e.g., `2025-10-09`).
    #[serde(default)]
    pub date: String,

    /// Dedup hash supplied by the producer. Computed when absent.
    #[serde(default)]
    pub hash: Option<String>,
}

impl SaleEvent {
    pub fn new(sku: impl Into<String>, quantity: i64, date: impl Into<String>) -> Self {
        SaleEvent {
            sku: sku.into(),
            quantity,
            unit_price: Money::zero(),
            date: date.into(),
            hash: None,
        }
    }

    pub fn with_unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// The identity used for idempotency: the supplied hash when non-blank,
    /// otherwise the stable hash of SKU, quantity, date and unit price.
    pub fn dedup_hash(&self) -> String {
        match self.hash.as_deref().map(str::trim) {
            Some(hash) if !hash.is_empty() => hash.to_string(),
            _ => hashing::sale_hash(&self.sku, self.quantity, &self.date, self.unit_price),
        }
    }

    /// Whether the event carries something applicable (SKU and positive quantity).
    pub fn is_applicable(&self) -> bool {
        !self.sku.trim().is_empty() && self.quantity > 0
    }
}

// =============================================================================
// Batch Fingerprint
// =============================================================================

/// Hash over the sorted unique sale hashes of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncBatchFingerprint(String);

impl SyncBatchFingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        SyncBatchFingerprint(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncBatchFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Negative Stock Policy
// =============================================================================

/// What to do when a sale would drive quantity on hand below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeStockPolicy {
    /// Clamp to zero and keep going.
    #[default]
    Lenient,
    /// Abort the whole reconciliation call.
    Strict,
}

impl fmt::Display for NegativeStockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegativeStockPolicy::Lenient => write!(f, "lenient"),
            NegativeStockPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for NegativeStockPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" | "clamp" => Ok(NegativeStockPolicy::Lenient),
            "strict" => Ok(NegativeStockPolicy::Strict),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::InvalidFormat {
                    field: "policy".to_string(),
                    reason: format!("unknown policy '{}', expected lenient or strict", other),
                },
            )),
        }
    }
}

// =============================================================================
// Reconciliation Report
// =============================================================================

/// A per-sale problem recovered inside the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileIssue {
    /// The sale references a SKU absent from the snapshot.
    MissingSku { sku: String },
}

impl fmt::Display for ReconcileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileIssue::MissingSku { sku } => write!(f, "SKU not found: {}", sku),
        }
    }
}

/// Structured result of one reconciliation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Sales applied to the snapshot.
    pub processed_sales: usize,

    /// Distinct rows changed.
    pub items_updated: usize,

    /// Sales skipped because their hash was already seen in this batch or
    /// already recorded in the sales log.
    pub skipped_duplicates: usize,

    /// Sales skipped for blank SKU or non-positive quantity.
    pub skipped_invalid: usize,

    /// SKUs changed, in first-touched order, without repeats.
    pub updated_skus: Vec<String>,

    /// Recovered per-sale problems.
    pub errors: Vec<ReconcileIssue>,

    /// Dedup hashes of the sales that were applied, in input order.
    pub applied_hashes: Vec<String>,

    /// Fingerprint of the batch, when computed.
    pub fingerprint: Option<SyncBatchFingerprint>,

    /// True when the batch fingerprint matched and nothing was applied.
    pub unchanged: bool,
}

impl ReconcileReport {
    /// No recovered errors were recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Low Stock
// =============================================================================

/// Urgency tier of a low-stock row. Ordered Low < Medium < High < Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LowStockPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for LowStockPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowStockPriority::Low => write!(f, "Low"),
            LowStockPriority::Medium => write!(f, "Medium"),
            LowStockPriority::High => write!(f, "High"),
            LowStockPriority::Critical => write!(f, "Critical"),
        }
    }
}

/// A row at or below the threshold. Recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockEntry {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub location: String,
    pub qty_on_hand: i64,
    pub qty_sold: i64,
    pub threshold: i64,
    pub priority: LowStockPriority,
}

// =============================================================================
// Restock Suggestions
// =============================================================================

/// Reorder urgency. Ordered Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RestockPriority {
    Low,
    Medium,
    High,
}

impl fmt::Display for RestockPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestockPriority::Low => write!(f, "Low"),
            RestockPriority::Medium => write!(f, "Medium"),
            RestockPriority::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for RestockPriority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "High" => Ok(RestockPriority::High),
            "Medium" => Ok(RestockPriority::Medium),
            "Low" => Ok(RestockPriority::Low),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::InvalidFormat {
                    field: "priority".to_string(),
                    reason: format!("unknown restock priority '{}'", other),
                },
            )),
        }
    }
}

/// A reorder-quantity suggestion for one low-stock row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockSuggestion {
    pub sku: String,
    pub name: String,
    pub current_qty: i64,
    pub threshold: i64,
    pub suggested_reorder: i64,
    pub priority: RestockPriority,
}

// =============================================================================
// Sales Log
// =============================================================================

/// A persisted "processed" marker for one sale hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesLogEntry {
    pub hash: String,
    pub processed_at: DateTime<Utc>,
}
