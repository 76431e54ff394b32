//! # Sheet Inventory Repository
//!
//! Keeps tenant state as a workbook of string sheets, the layout a
//! spreadsheet-backed store uses, and decodes it through
//! [`stockline_core::tabular`].
//!
//! ## Workbook
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ Inventory    │ SKU, Name, Category, ... QtyOnHand, QtySold, LastSyncHash│
//! │ Config       │ Setting, Value                                           │
//! │ SalesLog     │ Hash, ProcessedAt                                        │
//! │ RestockList  │ SKU, Name, CurrentQty, Threshold, SuggestedReorder, ...  │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything lives in memory. Orchestrator tests use this repository as
//! their test double.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use stockline_core::tabular::{self, SheetTable};
use stockline_core::{
    Clock, InventorySnapshot, RestockPriority, RestockSuggestion, SalesLogEntry, SystemClock,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::InventoryRepository;
use crate::cache::{CacheConfig, ReadCache};
use crate::error::{DbError, DbResult};

const CONFIG_HEADER: [&str; 2] = ["Setting", "Value"];
const SALES_LOG_HEADER: [&str; 2] = ["Hash", "ProcessedAt"];
const RESTOCK_HEADER: [&str; 7] = [
    "SKU",
    "Name",
    "CurrentQty",
    "Threshold",
    "SuggestedReorder",
    "Priority",
    "GeneratedAt",
];

fn header(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

// =============================================================================
// Workbook
// =============================================================================

/// The four sheets of one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    pub inventory: SheetTable,
    pub config: SheetTable,
    pub sales_log: SheetTable,
    pub restock_list: SheetTable,
}

impl Default for Workbook {
    fn default() -> Self {
        Workbook {
            inventory: tabular::encode_snapshot(&InventorySnapshot::default()),
            config: SheetTable::new(header(&CONFIG_HEADER)),
            sales_log: SheetTable::new(header(&SALES_LOG_HEADER)),
            restock_list: SheetTable::new(header(&RESTOCK_HEADER)),
        }
    }
}

impl Workbook {
    /// Reads a workbook exported with [`Workbook::to_json`].
    pub fn from_json(json: &str) -> DbResult<Self> {
        serde_json::from_str(json).map_err(|e| DbError::Corrupt(e.to_string()))
    }

    pub fn to_json(&self) -> DbResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DbError::Internal(e.to_string()))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// In-memory, sheet-shaped inventory repository.
pub struct SheetInventoryRepository {
    workbook: RwLock<Workbook>,
    cache: ReadCache<InventorySnapshot>,
    read_only: AtomicBool,
    inventory_writes: AtomicUsize,
}

impl SheetInventoryRepository {
    /// Empty workbook, default cache, wall clock.
    pub fn new() -> Self {
        SheetInventoryRepository::with_clock(CacheConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_clock(cache: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        SheetInventoryRepository::from_workbook(Workbook::default(), cache, clock)
    }

    /// Starts from existing sheets.
    pub fn from_workbook(workbook: Workbook, cache: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        SheetInventoryRepository {
            workbook: RwLock::new(workbook),
            cache: ReadCache::new(cache, clock),
            read_only: AtomicBool::new(false),
            inventory_writes: AtomicUsize::new(0),
        }
    }

    /// Starts from an existing snapshot, wall clock, default cache.
    pub fn from_snapshot(snapshot: &InventorySnapshot) -> Self {
        let workbook = Workbook {
            inventory: tabular::encode_snapshot(snapshot),
            ..Workbook::default()
        };
        SheetInventoryRepository::from_workbook(workbook, CacheConfig::default(), Arc::new(SystemClock))
    }

    /// Replaces the raw inventory sheet (may be malformed on purpose).
    pub async fn load_inventory_sheet(&self, table: SheetTable) {
        self.cache.invalidate();
        self.workbook.write().await.inventory = table;
    }

    /// Sets one config row, replacing an existing one with the same name.
    pub async fn set_config(&self, key: &str, value: i64) {
        self.cache.invalidate();
        let mut workbook = self.workbook.write().await;
        let rows = &mut workbook.config.rows;
        match rows.iter_mut().find(|row| row.first().map(|s| s.trim()) == Some(key)) {
            Some(row) => *row = vec![key.to_string(), value.to_string()],
            None => rows.push(vec![key.to_string(), value.to_string()]),
        }
    }

    /// Rejects every write with `QueryFailed` while set.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// How many times `update_inventory` succeeded.
    pub fn inventory_writes(&self) -> usize {
        self.inventory_writes.load(Ordering::SeqCst)
    }

    /// A copy of the raw sheets.
    pub async fn workbook(&self) -> Workbook {
        self.workbook.read().await.clone()
    }

    fn now(&self) -> DateTime<Utc> {
        self.cache.clock().now()
    }

    fn ensure_writable(&self) -> DbResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(DbError::QueryFailed("workbook is read-only".to_string()));
        }
        Ok(())
    }
}

impl Default for SheetInventoryRepository {
    fn default() -> Self {
        SheetInventoryRepository::new()
    }
}

fn parse_setting(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

fn parse_restock_row(row: &[String]) -> DbResult<RestockSuggestion> {
    let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");
    let number = |i: usize| -> DbResult<i64> {
        cell(i).parse::<i64>().map_err(|_| {
            DbError::Corrupt(format!(
                "restock column {} is not a number: '{}'",
                RESTOCK_HEADER[i],
                cell(i)
            ))
        })
    };
    let priority = cell(5)
        .parse::<RestockPriority>()
        .map_err(|e| DbError::Corrupt(e.to_string()))?;
    Ok(RestockSuggestion {
        sku: cell(0).to_string(),
        name: cell(1).to_string(),
        current_qty: number(2)?,
        threshold: number(3)?,
        suggested_reorder: number(4)?,
        priority,
    })
}

#[async_trait]
impl InventoryRepository for SheetInventoryRepository {
    async fn get_inventory(&self) -> DbResult<InventorySnapshot> {
        if let Some(snapshot) = self.cache.get() {
            return Ok(snapshot);
        }
        let snapshot = {
            let workbook = self.workbook.read().await;
            tabular::decode_snapshot(&workbook.inventory)?
        };
        debug!(rows = snapshot.len(), "Decoded inventory sheet");
        self.cache.put(snapshot.clone());
        Ok(snapshot)
    }

    async fn get_config(&self) -> DbResult<BTreeMap<String, i64>> {
        let workbook = self.workbook.read().await;
        let mut config = BTreeMap::new();
        for row in &workbook.config.rows {
            let key = row.first().map(|s| s.trim()).unwrap_or("");
            let raw = row.get(1).map(|s| s.as_str()).unwrap_or("");
            if key.is_empty() {
                continue;
            }
            match parse_setting(raw) {
                Some(value) => {
                    config.insert(key.to_string(), value);
                }
                None => warn!(setting = %key, value = %raw, "Skipping non-integer setting"),
            }
        }
        Ok(config)
    }

    async fn update_inventory(&self, snapshot: &InventorySnapshot) -> DbResult<()> {
        self.cache.invalidate();
        self.ensure_writable()?;
        snapshot.index_by_sku()?;

        self.workbook.write().await.inventory = tabular::encode_snapshot(snapshot);
        self.cache.invalidate();
        self.inventory_writes.fetch_add(1, Ordering::SeqCst);
        debug!(rows = snapshot.len(), "Inventory sheet written");
        Ok(())
    }

    async fn get_sales_log(&self) -> DbResult<Vec<SalesLogEntry>> {
        let workbook = self.workbook.read().await;
        let mut entries = Vec::with_capacity(workbook.sales_log.rows.len());
        for row in &workbook.sales_log.rows {
            let hash = row.first().map(|s| s.trim()).unwrap_or("");
            if hash.is_empty() {
                continue;
            }
            let raw = row.get(1).map(|s| s.trim()).unwrap_or("");
            let processed_at = DateTime::parse_from_rfc3339(raw)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| DbError::Corrupt(format!("bad ProcessedAt '{}': {}", raw, e)))?;
            entries.push(SalesLogEntry {
                hash: hash.to_string(),
                processed_at,
            });
        }
        Ok(entries)
    }

    async fn add_sales_log_entry(&self, hash: &str) -> DbResult<()> {
        self.cache.invalidate();
        self.ensure_writable()?;
        let now = self.now();
        let mut workbook = self.workbook.write().await;
        let exists = workbook
            .sales_log
            .rows
            .iter()
            .any(|row| row.first().map(|s| s.as_str()) == Some(hash));
        if !exists {
            workbook
                .sales_log
                .rows
                .push(vec![hash.to_string(), now.to_rfc3339()]);
        }
        Ok(())
    }

    async fn update_restock_list(&self, suggestions: &[RestockSuggestion]) -> DbResult<()> {
        self.cache.invalidate();
        self.ensure_writable()?;
        let generated_at = self.now().to_rfc3339();
        let rows = suggestions
            .iter()
            .map(|s| {
                vec![
                    s.sku.clone(),
                    s.name.clone(),
                    s.current_qty.to_string(),
                    s.threshold.to_string(),
                    s.suggested_reorder.to_string(),
                    s.priority.to_string(),
                    generated_at.clone(),
                ]
            })
            .collect();
        self.workbook.write().await.restock_list.rows = rows;
        Ok(())
    }

    async fn get_restock_list(&self) -> DbResult<Vec<RestockSuggestion>> {
        let workbook = self.workbook.read().await;
        workbook
            .restock_list
            .rows
            .iter()
            .map(|row| parse_restock_row(row))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stockline_core::{InventoryItem, ManualClock, SyncBatchFingerprint};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 10, 9, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_inventory_roundtrip_keeps_fingerprint() {
        let repo = SheetInventoryRepository::new();
        let mut snapshot = InventorySnapshot::new(vec![
            InventoryItem::new("A", 3).with_name("Alpha"),
            InventoryItem::new("B", 0),
        ]);
        snapshot.last_sync_fingerprint = Some(SyncBatchFingerprint::new("fp"));

        repo.update_inventory(&snapshot).await.unwrap();
        assert_eq!(repo.get_inventory().await.unwrap(), snapshot);
        assert_eq!(repo.inventory_writes(), 1);
    }

    #[tokio::test]
    async fn test_missing_columns_surface_as_schema_error() {
        let repo = SheetInventoryRepository::new();
        repo.load_inventory_sheet(SheetTable::from_rows(&["SKU"], &[&["A"]]))
            .await;
        let err = repo.get_inventory().await.unwrap_err();
        assert!(matches!(err, DbError::Schema(_)));
    }

    #[tokio::test]
    async fn test_config_skips_non_integer_values() {
        let repo = SheetInventoryRepository::new();
        repo.set_config("LowStockThreshold", 3).await;
        {
            let mut workbook = repo.workbook.write().await;
            workbook
                .config
                .rows
                .push(vec!["StoreName".to_string(), "Downtown".to_string()]);
        }
        let config = repo.get_config().await.unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(repo.low_stock_threshold().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_threshold_defaults_to_five() {
        let repo = SheetInventoryRepository::new();
        assert_eq!(repo.low_stock_threshold().await.unwrap(), 5);

        repo.set_config("LowStockThreshold", 0).await;
        assert_eq!(repo.low_stock_threshold().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_sales_log_ignores_repeats() {
        let repo = SheetInventoryRepository::with_clock(CacheConfig::default(), clock());
        repo.add_sales_log_entry("h1").await.unwrap();
        repo.add_sales_log_entry("h1").await.unwrap();
        repo.add_sales_log_entry("h2").await.unwrap();

        let log = repo.get_sales_log().await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].hash, "h1");
        assert_eq!(
            log[0].processed_at,
            Utc.with_ymd_and_hms(2025, 10, 9, 12, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_cache_serves_until_write() {
        let clock = clock();
        let repo = SheetInventoryRepository::with_clock(
            CacheConfig::with_ttl(std::time::Duration::from_secs(60)),
            clock.clone(),
        );
        repo.update_inventory(&InventorySnapshot::new(vec![InventoryItem::new("A", 1)]))
            .await
            .unwrap();
        repo.get_inventory().await.unwrap();
        assert!(repo.cache.is_populated());

        repo.add_sales_log_entry("h1").await.unwrap();
        assert!(!repo.cache.is_populated());
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let repo = SheetInventoryRepository::new();
        repo.set_read_only(true);
        let err = repo
            .update_inventory(&InventorySnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
        assert_eq!(repo.inventory_writes(), 0);
    }

    #[tokio::test]
    async fn test_workbook_export_import() {
        let repo = SheetInventoryRepository::from_snapshot(&InventorySnapshot::new(vec![
            InventoryItem::new("A", 4),
        ]));
        repo.set_config("LowStockThreshold", 2).await;
        let json = repo.workbook().await.to_json().unwrap();

        let restored = SheetInventoryRepository::from_workbook(
            Workbook::from_json(&json).unwrap(),
            CacheConfig::disabled(),
            clock(),
        );
        assert_eq!(restored.get_inventory().await.unwrap().get("A").unwrap().qty_on_hand, 4);
        assert_eq!(restored.low_stock_threshold().await.unwrap(), 2);
        assert!(matches!(Workbook::from_json("{"), Err(DbError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_restock_list_roundtrip() {
        let repo = SheetInventoryRepository::new();
        let suggestions = vec![RestockSuggestion {
            sku: "A".to_string(),
            name: "Alpha".to_string(),
            current_qty: 0,
            threshold: 5,
            suggested_reorder: 30,
            priority: RestockPriority::High,
        }];
        repo.update_restock_list(&suggestions).await.unwrap();
        assert_eq!(repo.get_restock_list().await.unwrap(), suggestions);
    }
}
