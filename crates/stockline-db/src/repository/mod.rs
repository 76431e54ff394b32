//! # Repository Module
//!
//! The inventory repository contract and its implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    InventoryRepository                                  │
//! │                                                                         │
//! │  SyncOrchestrator                                                      │
//! │       │                                                                 │
//! │       │  repo.get_inventory() / repo.commit_reconciliation(..)         │
//! │       ▼                                                                 │
//! │  dyn InventoryRepository                                               │
//! │  ├── SqliteInventoryRepository  (tenant-scoped tables, WAL)            │
//! │  └── SheetInventoryRepository   (in-memory workbook of sheets)         │
//! │                                                                         │
//! │  Both keep a per-instance ReadCache for get_inventory and invalidate   │
//! │  it on every write.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteInventoryRepository`] - SQLite-backed store
//! - [`SheetInventoryRepository`] - spreadsheet-shaped store, also the
//!   test double for orchestrator tests

use async_trait::async_trait;
use std::collections::BTreeMap;
use stockline_core::validation::validate_threshold;
use stockline_core::{
    InventorySnapshot, RestockSuggestion, SalesLogEntry, DEFAULT_LOW_STOCK_THRESHOLD,
    LOW_STOCK_THRESHOLD_KEY,
};
use tracing::warn;

use crate::error::DbResult;

pub mod sheet;
pub mod sqlite;

pub use sheet::SheetInventoryRepository;
pub use sqlite::SqliteInventoryRepository;

/// Read/write access to one tenant's inventory state.
///
/// Implementations assume a single writer per tenant.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// The authoritative snapshot, including the last batch fingerprint.
    async fn get_inventory(&self) -> DbResult<InventorySnapshot>;

    /// Integer settings, e.g. `{"LowStockThreshold": 5}`.
    async fn get_config(&self) -> DbResult<BTreeMap<String, i64>>;

    /// Replaces the stored snapshot (rows, order and fingerprint).
    async fn update_inventory(&self, snapshot: &InventorySnapshot) -> DbResult<()>;

    async fn get_sales_log(&self) -> DbResult<Vec<SalesLogEntry>>;

    /// Records a processed sale hash. Recording the same hash twice is a no-op.
    async fn add_sales_log_entry(&self, hash: &str) -> DbResult<()>;

    /// Writes a reconciled snapshot together with the sale hashes it applied.
    ///
    /// The default writes the snapshot first and then each hash, so a failure
    /// midway leaves some hashes unlogged. Stores that can should override
    /// this with a single transaction.
    async fn commit_reconciliation(
        &self,
        snapshot: &InventorySnapshot,
        applied_hashes: &[String],
    ) -> DbResult<()> {
        self.update_inventory(snapshot).await?;
        for hash in applied_hashes {
            self.add_sales_log_entry(hash).await?;
        }
        Ok(())
    }

    /// Replaces the stored restock list.
    async fn update_restock_list(&self, suggestions: &[RestockSuggestion]) -> DbResult<()>;

    async fn get_restock_list(&self) -> DbResult<Vec<RestockSuggestion>>;

    /// `LowStockThreshold` from config, or 5 when absent or not positive.
    async fn low_stock_threshold(&self) -> DbResult<i64> {
        let config = self.get_config().await?;
        Ok(match config.get(LOW_STOCK_THRESHOLD_KEY) {
            Some(&value) => match validate_threshold(value) {
                Ok(()) => value,
                Err(e) => {
                    warn!(value, error = %e, "Ignoring configured threshold");
                    DEFAULT_LOW_STOCK_THRESHOLD
                }
            },
            None => DEFAULT_LOW_STOCK_THRESHOLD,
        })
    }
}
