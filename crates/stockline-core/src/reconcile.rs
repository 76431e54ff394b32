//! # Reconciliation Engine
//!
//! Applies sale events to an inventory snapshot exactly once per dedup hash.
//!
//! ## Per-Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for sale in sales (input order)                                        │
//! │       │                                                                 │
//! │       ├── qty <= 0 or blank SKU? ──► skipped_invalid, next              │
//! │       │                                                                 │
//! │       ├── hash seen in batch or in sales log? ──► skipped_duplicates    │
//! │       │                                                                 │
//! │       ├── SKU not in snapshot? ──► errors += "SKU not found", next      │
//! │       │                                                                 │
//! │       ├── on_hand - qty < 0?                                            │
//! │       │      Strict  ──► Err(NegativeInventory), input untouched        │
//! │       │      Lenient ──► clamp to 0                                     │
//! │       │                                                                 │
//! │       └── qty_sold += qty, last_updated = applied_at                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Batch Idempotency
//! ```text
//! fingerprint = sha256(sorted unique hashes)
//!
//! snapshot.last_sync_fingerprint == fingerprint ──► unchanged, no-op
//! otherwise ──► apply_sales, stamp fingerprint on the result
//! ```
//!
//! Nothing here performs I/O. The caller loads the snapshot and sales log,
//! and persists the result only when the call succeeded.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::hashing;
use crate::types::{
    InventorySnapshot, NegativeStockPolicy, ReconcileIssue, ReconcileReport, SaleEvent,
};

// =============================================================================
// Context
// =============================================================================

/// Inputs of a reconciliation call besides the snapshot and sales.
#[derive(Debug, Clone)]
pub struct ReconcileContext {
    pub policy: NegativeStockPolicy,

    /// Hashes already recorded in the persistent sales log.
    pub processed_hashes: HashSet<String>,

    /// Timestamp written to `last_updated` of every changed row.
    pub applied_at: DateTime<Utc>,
}

impl ReconcileContext {
    pub fn new(policy: NegativeStockPolicy) -> Self {
        ReconcileContext {
            policy,
            processed_hashes: HashSet::new(),
            applied_at: Utc::now(),
        }
    }

    /// Seeds the set of hashes that must not be applied again.
    pub fn with_processed<I, S>(mut self, hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.processed_hashes
            .extend(hashes.into_iter().map(Into::into));
        self
    }

    /// Pins the timestamp stamped on changed rows.
    pub fn at(mut self, applied_at: DateTime<Utc>) -> Self {
        self.applied_at = applied_at;
        self
    }
}

// =============================================================================
// Per-Sale Application
// =============================================================================

/// Applies `sales` to a copy of `snapshot`.
///
/// ## Errors
/// - `InvalidSchema` when the snapshot has blank or repeated SKUs (checked
///   before anything is touched)
/// - `NegativeInventory` under the strict policy; the whole call fails and
///   the input snapshot is left as it was
///
/// Missing SKUs, non-positive quantities and duplicate hashes are counted in
/// the report and never abort the batch.
pub fn apply_sales(
    snapshot: &InventorySnapshot,
    sales: &[SaleEvent],
    ctx: &ReconcileContext,
) -> CoreResult<(InventorySnapshot, ReconcileReport)> {
    let index = snapshot.index_by_sku()?;

    let mut updated = snapshot.clone();
    let mut report = ReconcileReport::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(sales.len());
    let mut touched: HashSet<usize> = HashSet::new();

    for sale in sales {
        if !sale.is_applicable() {
            report.skipped_invalid += 1;
            tracing::debug!(sku = %sale.sku, quantity = sale.quantity, "Skipping non-applicable sale");
            continue;
        }

        let hash = sale.dedup_hash();
        if ctx.processed_hashes.contains(&hash) || !seen.insert(hash.clone()) {
            report.skipped_duplicates += 1;
            continue;
        }

        let sku = sale.sku.trim();
        // exact match; only the dedup hash folds case
        let Some(&row) = index.get(sku) else {
            tracing::debug!(sku = %sku, "Sale references unknown SKU");
            report.errors.push(ReconcileIssue::MissingSku {
                sku: sku.to_string(),
            });
            continue;
        };

        let item = &mut updated.items[row];
        let remaining = item.qty_on_hand.saturating_sub(sale.quantity);
        if remaining < 0 {
            match ctx.policy {
                NegativeStockPolicy::Strict => {
                    return Err(CoreError::NegativeInventory {
                        sku: item.sku.clone(),
                        on_hand: item.qty_on_hand,
                        requested: sale.quantity,
                    });
                }
                NegativeStockPolicy::Lenient => {
                    tracing::debug!(
                        sku = %sku,
                        on_hand = item.qty_on_hand,
                        requested = sale.quantity,
                        "Clamping quantity on hand to zero"
                    );
                }
            }
        }

        item.qty_on_hand = remaining.max(0);
        item.qty_sold = item.qty_sold.saturating_add(sale.quantity);
        item.last_updated = Some(ctx.applied_at);

        report.processed_sales += 1;
        report.applied_hashes.push(hash);
        if touched.insert(row) {
            report.updated_skus.push(item.sku.clone());
        }
    }

    report.items_updated = touched.len();
    Ok((updated, report))
}

// =============================================================================
// Batch-Level Deduplication
// =============================================================================

/// Fingerprint of the sales that carry something applicable.
pub fn fingerprint_of(sales: &[SaleEvent]) -> Option<crate::types::SyncBatchFingerprint> {
    let hashes: Vec<String> = sales
        .iter()
        .filter(|sale| sale.is_applicable())
        .map(SaleEvent::dedup_hash)
        .collect();
    if hashes.is_empty() {
        None
    } else {
        Some(hashing::batch_fingerprint(hashes))
    }
}

/// Applies a batch unless the snapshot already carries its fingerprint.
///
/// ## Outcomes
/// ```text
/// no applicable sales          ──► snapshot returned as-is, unchanged = true
/// fingerprint == last applied  ──► snapshot returned as-is, unchanged = true
/// otherwise                    ──► apply_sales + stamp new fingerprint
/// ```
///
/// A batch with an unknown SKU is not stamped: the stored fingerprint is
/// cleared so the next run re-applies the batch once the SKU exists. Sales
/// already applied are then skipped through `ctx.processed_hashes`, so the
/// caller must pass the sales log on every run.
pub fn sync_with_deduplication(
    snapshot: &InventorySnapshot,
    sales: &[SaleEvent],
    ctx: &ReconcileContext,
) -> CoreResult<(InventorySnapshot, ReconcileReport)> {
    snapshot.index_by_sku()?;

    let Some(fingerprint) = fingerprint_of(sales) else {
        let report = ReconcileReport {
            skipped_invalid: sales.len(),
            unchanged: true,
            ..ReconcileReport::default()
        };
        return Ok((snapshot.clone(), report));
    };

    if snapshot.last_sync_fingerprint.as_ref() == Some(&fingerprint) {
        let report = ReconcileReport {
            fingerprint: Some(fingerprint),
            unchanged: true,
            ..ReconcileReport::default()
        };
        return Ok((snapshot.clone(), report));
    }

    let (mut updated, mut report) = apply_sales(snapshot, sales, ctx)?;
    if report.errors.is_empty() {
        updated.last_sync_fingerprint = Some(fingerprint.clone());
    } else {
        tracing::debug!(
            unresolved = report.errors.len(),
            "Batch left unstamped until every SKU resolves"
        );
        updated.last_sync_fingerprint = None;
    }
    report.fingerprint = Some(fingerprint);
    Ok((updated, report))
}

// =============================================================================
// Unit Tests
// =============================================================================
