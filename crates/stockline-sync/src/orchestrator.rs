//! # Sync Orchestrator
//!
//! One reconciliation run: fetch, reconcile, advise, persist.
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. repository: snapshot, threshold, sales log                         │
//! │  2. gateway: sales for [today - lookback, today]      error ──► Err     │
//! │  3. build SaleEvents (variant ids resolved via external_id)            │
//! │  4. sync_with_deduplication                            error ──► Failed │
//! │        │                                                (no writes)     │
//! │        ├── unchanged or nothing applied ──► Unchanged (no writes)      │
//! │        ▼                                                                │
//! │  5. repository: commit_reconciliation (snapshot + applied hashes)      │
//! │  6. advisor: low stock + restock ──► update_restock_list               │
//! │  7. SyncRunReport                                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes happen only after reconciliation succeeded. The snapshot and the
//! sales-log hashes go through one `commit_reconciliation` call, which the
//! SQLite store runs as a single transaction. The restock list is a
//! separate write afterwards. One run per tenant at a time; nothing here
//! takes a lock.
//!
//! A batch with an unknown SKU is left unstamped, so later runs re-read it
//! and apply the missing sale once the row exists. The sales log keeps the
//! rest of the batch from applying twice.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use stockline_core::advisor::advise;
use stockline_core::metrics::{calculate_metrics, InventoryMetrics};
use stockline_core::reconcile::{sync_with_deduplication, ReconcileContext};
use stockline_core::{
    Clock, InventorySnapshot, LowStockEntry, ReconcileReport, RestockSuggestion, SystemClock,
    LOW_STOCK_THRESHOLD_KEY,
};
use stockline_db::InventoryRepository;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::ReconcileSettings;
use crate::error::SyncResult;
use crate::gateway::Gateway;
use crate::records::{build_sale_events, variant_index, RemoteInventoryLevel};

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Sales applied and persisted.
    Succeeded,
    /// Reconciliation rejected the batch; nothing was written.
    Failed,
    /// The batch was already applied, empty, or had nothing new to apply;
    /// nothing was written.
    Unchanged,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Outcome of [`SyncOrchestrator::run_once`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub sales_fetched: usize,
    pub events_built: usize,
    pub reconcile: Option<ReconcileReport>,
    pub low_stock: Vec<LowStockEntry>,
    pub restock: Vec<RestockSuggestion>,
    pub metrics: Option<InventoryMetrics>,
    pub failure: Option<String>,
}

/// Outcome of [`SyncOrchestrator::refresh_catalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRefreshReport {
    pub products_fetched: usize,
    pub levels_fetched: usize,
    pub rows_created: usize,
    pub rows_updated: usize,
    /// Stock levels whose variant matches no row.
    pub unmatched_levels: usize,
}

// =============================================================================
// Orchestrator
// =============================================================================

pub struct SyncOrchestrator {
    gateway: Gateway,
    repository: Arc<dyn InventoryRepository>,
    settings: ReconcileSettings,
    clock: Arc<dyn Clock>,
}

impl SyncOrchestrator {
    pub fn new(
        gateway: Gateway,
        repository: Arc<dyn InventoryRepository>,
        settings: ReconcileSettings,
    ) -> Self {
        SyncOrchestrator {
            gateway,
            repository,
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    /// Uses `clock` for the sales window and row timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn threshold(&self) -> SyncResult<i64> {
        let config = self.repository.get_config().await?;
        if config.contains_key(LOW_STOCK_THRESHOLD_KEY) {
            Ok(self.repository.low_stock_threshold().await?)
        } else {
            Ok(self.settings.default_low_stock_threshold)
        }
    }

    /// Runs one reconciliation pass.
    ///
    /// ## Errors
    /// Gateway and repository errors propagate unchanged. A rejected batch
    /// is not an error: it comes back as `RunStatus::Failed` with nothing
    /// written.
    pub async fn run_once(&self) -> SyncResult<SyncRunReport> {
        let run_id = Uuid::new_v4();
        let started_at = self.clock.now();
        info!(%run_id, policy = %self.settings.policy, "Sync run starting");

        let snapshot = self.repository.get_inventory().await?;
        let threshold = self.threshold().await?;
        let processed: Vec<String> = self
            .repository
            .get_sales_log()
            .await?
            .into_iter()
            .map(|entry| entry.hash)
            .collect();

        let date_to = started_at.date_naive();
        let date_from = date_to - ChronoDuration::days(i64::from(self.settings.sales_lookback_days));
        let sales = self.gateway.get_sales(Some(date_from), Some(date_to)).await?;
        let events = build_sale_events(&sales, &snapshot);
        info!(
            %run_id,
            sales = sales.len(),
            events = events.len(),
            known_hashes = processed.len(),
            "Sales fetched"
        );

        let ctx = ReconcileContext::new(self.settings.policy)
            .with_processed(processed)
            .at(started_at);

        let mut report = SyncRunReport {
            run_id,
            started_at,
            finished_at: started_at,
            status: RunStatus::Unchanged,
            sales_fetched: sales.len(),
            events_built: events.len(),
            reconcile: None,
            low_stock: Vec::new(),
            restock: Vec::new(),
            metrics: None,
            failure: None,
        };

        let (updated, reconciled) = match sync_with_deduplication(&snapshot, &events, &ctx) {
            Ok(result) => result,
            Err(e) => {
                error!(%run_id, error = %e, "Reconciliation failed, nothing written");
                report.status = RunStatus::Failed;
                report.failure = Some(e.to_string());
                report.finished_at = self.clock.now();
                return Ok(report);
            }
        };

        for issue in &reconciled.errors {
            warn!(%run_id, issue = %issue, "Sale not applied");
        }

        let (low_stock, restock) = advise(&updated, threshold);

        if reconciled.unchanged {
            info!(%run_id, "Batch already applied, nothing to write");
        } else if reconciled.applied_hashes.is_empty() {
            info!(%run_id, "No new sales applied, nothing to write");
        } else {
            self.repository
                .commit_reconciliation(&updated, &reconciled.applied_hashes)
                .await?;
            // derived from the committed snapshot; a failure here is repaired
            // by the next run that applies sales
            self.repository.update_restock_list(&restock).await?;
            report.status = RunStatus::Succeeded;
        }

        info!(
            %run_id,
            status = %report.status,
            processed = reconciled.processed_sales,
            updated = reconciled.items_updated,
            duplicates = reconciled.skipped_duplicates,
            invalid = reconciled.skipped_invalid,
            errors = reconciled.errors.len(),
            low_stock = low_stock.len(),
            "Sync run finished"
        );

        report.metrics = Some(calculate_metrics(&updated, threshold));
        report.reconcile = Some(reconciled);
        report.low_stock = low_stock;
        report.restock = restock;
        report.finished_at = self.clock.now();
        Ok(report)
    }

    /// Merges the remote catalog and stock levels into the stored snapshot.
    ///
    /// Existing rows keep their quantity sold, position and the batch
    /// fingerprint; descriptive fields and quantity on hand follow the API.
    /// New variants are appended.
    pub async fn refresh_catalog(&self) -> SyncResult<CatalogRefreshReport> {
        let now = self.clock.now();
        let products = self.gateway.get_products(true).await?;
        let levels = self.gateway.get_inventory(None).await?;

        let mut snapshot = self.repository.get_inventory().await?;
        let mut created: HashSet<String> = HashSet::new();
        let mut report = CatalogRefreshReport {
            products_fetched: products.len(),
            levels_fetched: levels.len(),
            ..CatalogRefreshReport::default()
        };

        for remote in products.iter().flat_map(|product| product.to_items()) {
            match snapshot.get_mut(&remote.sku) {
                Some(existing) => {
                    existing.name = remote.name;
                    existing.category = remote.category;
                    existing.size = remote.size;
                    existing.color = remote.color;
                    existing.barcode = remote.barcode.or(existing.barcode.take());
                    existing.retail_price = remote.retail_price;
                    existing.external_id = remote.external_id;
                    existing.last_updated = Some(now);
                    report.rows_updated += 1;
                }
                None => {
                    let mut item = remote;
                    item.last_updated = Some(now);
                    created.insert(item.sku.clone());
                    snapshot.items.push(item);
                    report.rows_created += 1;
                }
            }
        }

        report.unmatched_levels = apply_levels(&mut snapshot, &levels, &created, now);

        self.repository.update_inventory(&snapshot).await?;
        info!(
            products = report.products_fetched,
            levels = report.levels_fetched,
            created = report.rows_created,
            updated = report.rows_updated,
            unmatched = report.unmatched_levels,
            "Catalog refreshed"
        );
        Ok(report)
    }
}

/// Sets quantity on hand from stock levels summed across locations.
/// Rows created in this refresh also take the API's quantity sold.
/// Returns the number of levels that matched no row.
fn apply_levels(
    snapshot: &mut InventorySnapshot,
    levels: &[RemoteInventoryLevel],
    created: &HashSet<String>,
    now: DateTime<Utc>,
) -> usize {
    let variants = variant_index(snapshot);
    let mut on_hand: HashMap<&str, i64> = HashMap::new();
    let mut sold: HashMap<&str, i64> = HashMap::new();
    let mut unmatched = 0;

    for level in levels {
        match variants.get(&level.variant_id) {
            Some(sku) => {
                let qty = on_hand.entry(sku.as_str()).or_default();
                *qty = qty.saturating_add(level.quantity_on_hand);
                let count = sold.entry(sku.as_str()).or_default();
                *count = count.saturating_add(level.quantity_sold);
            }
            None => unmatched += 1,
        }
    }

    for item in &mut snapshot.items {
        if let Some(&qty) = on_hand.get(item.sku.as_str()) {
            item.qty_on_hand = qty.max(0);
            if created.contains(&item.sku) {
                item.qty_sold = sold.get(item.sku.as_str()).copied().unwrap_or(0).max(0);
            }
            item.last_updated = Some(now);
        }
    }

    unmatched
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{FixtureSource, GatewayOptions};
    use chrono::TimeZone;
    use serde_json::json;
    use stockline_core::{InventoryItem, ManualClock, NegativeStockPolicy, RestockPriority};
    use stockline_db::{CacheConfig, SheetInventoryRepository};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 10, 9, 12, 0, 0).unwrap(),
        ))
    }

    fn sales_fixture() -> Vec<serde_json::Value> {
        vec![
            json!({
                "id": "s1", "date": "2025-10-08T15:00:00Z", "total": 340.0,
                "items": [{"sku": "JD1-BLK-10", "quantity": 2, "price": 170.0}]
            }),
            json!({
                "id": "s2", "date": "2025-10-09T10:00:00Z", "total": 35.0,
                "items": [
                    {"variant_id": "v-tee-m", "quantity": 1, "price": 35.0},
                    {"sku": "GONE-1", "quantity": 1, "price": 5.0}
                ]
            }),
            json!({
                "id": "old", "date": "2025-09-01", "total": 170.0,
                "items": [{"sku": "JD1-BLK-10", "quantity": 5, "price": 170.0}]
            }),
        ]
    }

    fn snapshot() -> InventorySnapshot {
        InventorySnapshot::new(vec![
            InventoryItem::new("JD1-BLK-10", 3).with_name("Jordan 1 Black"),
            InventoryItem::new("TEE-BLK-M", 10)
                .with_name("Logo Tee")
                .with_external_id("v-tee-m"),
        ])
    }

    fn orchestrator(
        sales: Vec<serde_json::Value>,
        repo: Arc<SheetInventoryRepository>,
        policy: NegativeStockPolicy,
    ) -> SyncOrchestrator {
        let source = Arc::new(FixtureSource::new().with_collection("sales", sales));
        let gateway = Gateway::new(source, GatewayOptions::default());
        let settings = ReconcileSettings {
            policy,
            ..ReconcileSettings::default()
        };
        SyncOrchestrator::new(gateway, repo, settings).with_clock(clock())
    }

    #[tokio::test]
    async fn test_run_applies_window_and_persists() {
        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&snapshot()));
        let orch = orchestrator(sales_fixture(), repo.clone(), NegativeStockPolicy::Lenient);

        let report = orch.run_once().await.unwrap();

        assert_eq!(report.status, RunStatus::Succeeded);
        assert_eq!(report.sales_fetched, 2); // "old" is outside the 7-day window
        assert_eq!(report.events_built, 3);

        let reconciled = report.reconcile.as_ref().unwrap();
        assert_eq!(reconciled.processed_sales, 2);
        assert_eq!(reconciled.errors.len(), 1);

        let stored = repo.get_inventory().await.unwrap();
        assert_eq!(stored.get("JD1-BLK-10").unwrap().qty_on_hand, 1);
        assert_eq!(stored.get("JD1-BLK-10").unwrap().qty_sold, 2);
        assert_eq!(stored.get("TEE-BLK-M").unwrap().qty_on_hand, 9);
        // GONE-1 is unresolved, so the batch stays open
        assert!(stored.last_sync_fingerprint.is_none());

        assert_eq!(repo.get_sales_log().await.unwrap().len(), 2);

        let restock = repo.get_restock_list().await.unwrap();
        assert_eq!(restock.len(), 1);
        assert_eq!(restock[0].sku, "JD1-BLK-10");
        assert_eq!(report.low_stock.len(), 1);
        assert_eq!(report.metrics.as_ref().unwrap().total_skus, 2);
    }

    #[tokio::test]
    async fn test_second_run_is_unchanged() {
        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&snapshot()));
        let orch = orchestrator(sales_fixture(), repo.clone(), NegativeStockPolicy::Lenient);

        orch.run_once().await.unwrap();
        let after_first = repo.get_inventory().await.unwrap();
        let writes = repo.inventory_writes();

        let second = orch.run_once().await.unwrap();
        assert_eq!(second.status, RunStatus::Unchanged);
        assert_eq!(repo.inventory_writes(), writes);
        assert_eq!(repo.get_inventory().await.unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_sale_for_added_sku_applies_on_next_run() {
        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&snapshot()));
        let sales = vec![json!({
            "id": "s1", "date": "2025-10-09", "total": 240.0,
            "items": [
                {"sku": "JD1-BLK-10", "quantity": 1, "price": 170.0},
                {"sku": "NEW", "quantity": 2, "price": 35.0}
            ]
        })];
        let orch = orchestrator(sales, repo.clone(), NegativeStockPolicy::Lenient);

        let first = orch.run_once().await.unwrap();
        assert_eq!(first.status, RunStatus::Succeeded);
        assert_eq!(first.reconcile.as_ref().unwrap().errors.len(), 1);

        let mut added = repo.get_inventory().await.unwrap();
        added.items.push(InventoryItem::new("NEW", 5));
        repo.update_inventory(&added).await.unwrap();

        let second = orch.run_once().await.unwrap();
        assert_eq!(second.status, RunStatus::Succeeded);
        let reconciled = second.reconcile.as_ref().unwrap();
        assert_eq!(reconciled.processed_sales, 1);
        assert_eq!(reconciled.skipped_duplicates, 1);
        assert!(reconciled.errors.is_empty());

        let stored = repo.get_inventory().await.unwrap();
        assert_eq!(stored.get("NEW").unwrap().qty_on_hand, 3);
        assert_eq!(stored.get("JD1-BLK-10").unwrap().qty_on_hand, 2);
        assert!(stored.last_sync_fingerprint.is_some());
        assert_eq!(repo.get_sales_log().await.unwrap().len(), 2);

        let third = orch.run_once().await.unwrap();
        assert_eq!(third.status, RunStatus::Unchanged);
        assert!(third.reconcile.unwrap().unchanged);
    }

    #[tokio::test]
    async fn test_unresolved_sku_rerun_writes_nothing() {
        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&snapshot()));
        let orch = orchestrator(sales_fixture(), repo.clone(), NegativeStockPolicy::Lenient);
        orch.run_once().await.unwrap();
        let writes = repo.inventory_writes();

        let again = orch.run_once().await.unwrap();
        assert_eq!(again.status, RunStatus::Unchanged);
        let reconciled = again.reconcile.unwrap();
        assert!(!reconciled.unchanged);
        assert_eq!(reconciled.skipped_duplicates, 2);
        assert_eq!(reconciled.errors.len(), 1);
        assert_eq!(repo.inventory_writes(), writes);
        assert_eq!(repo.get_sales_log().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_huge_sale_quantities_do_not_overflow() {
        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&snapshot()));
        let sales = vec![
            json!({"id": "a", "date": "2025-10-08", "items": [{"sku": "TEE-BLK-M", "quantity": i64::MAX, "price": 1}]}),
            json!({"id": "b", "date": "2025-10-09", "items": [{"sku": "TEE-BLK-M", "quantity": i64::MAX, "price": 1}]}),
        ];
        let orch = orchestrator(sales, repo.clone(), NegativeStockPolicy::Lenient);

        let report = orch.run_once().await.unwrap();
        assert_eq!(report.status, RunStatus::Succeeded);

        let tee = repo.get_inventory().await.unwrap().get("TEE-BLK-M").unwrap().clone();
        assert_eq!(tee.qty_on_hand, 0);
        assert_eq!(tee.qty_sold, i64::MAX);
        let suggestion = report.restock.iter().find(|s| s.sku == "TEE-BLK-M").unwrap();
        assert_eq!(suggestion.suggested_reorder, i64::MAX);
    }

    #[tokio::test]
    async fn test_strict_violation_writes_nothing() {
        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&snapshot()));
        let sales = vec![json!({
            "id": "big", "date": "2025-10-09", "total": 850.0,
            "items": [{"sku": "JD1-BLK-10", "quantity": 5, "price": 170.0}]
        })];
        let orch = orchestrator(sales, repo.clone(), NegativeStockPolicy::Strict);
        let before = repo.get_inventory().await.unwrap();
        let writes = repo.inventory_writes();

        let report = orch.run_once().await.unwrap();

        assert_eq!(report.status, RunStatus::Failed);
        assert!(report.failure.as_ref().unwrap().contains("JD1-BLK-10"));
        assert_eq!(repo.inventory_writes(), writes);
        assert_eq!(repo.get_inventory().await.unwrap(), before);
        assert!(repo.get_sales_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_threshold_from_repository_config() {
        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&snapshot()));
        repo.set_config(LOW_STOCK_THRESHOLD_KEY, 10).await;
        let orch = orchestrator(sales_fixture(), repo.clone(), NegativeStockPolicy::Lenient);

        let report = orch.run_once().await.unwrap();
        // TEE-BLK-M ends at 9, below 10
        assert_eq!(report.low_stock.len(), 2);
        assert!(report.restock.iter().all(|s| s.threshold == 10));
    }

    #[tokio::test]
    async fn test_gateway_error_propagates_without_writes() {
        struct Down;

        #[async_trait::async_trait]
        impl crate::gateway::PageSource for Down {
            async fn send(
                &self,
                _request: &crate::gateway::ApiRequest,
            ) -> Result<crate::gateway::RawResponse, crate::gateway::TransportError> {
                Ok(crate::gateway::RawResponse::status(401))
            }
        }

        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&snapshot()));
        let writes = repo.inventory_writes();
        let gateway = Gateway::new(Arc::new(Down), GatewayOptions::default());
        let orch = SyncOrchestrator::new(gateway, repo.clone(), ReconcileSettings::default());

        let err = orch.run_once().await.unwrap_err();
        assert!(matches!(err, crate::error::SyncError::Authentication));
        assert_eq!(repo.inventory_writes(), writes);
    }

    #[tokio::test]
    async fn test_refresh_catalog_merges_products_and_levels() {
        let existing = InventorySnapshot::new(vec![InventoryItem::new("JD1-BLK-10", 3)
            .with_name("old name")
            .with_qty_sold(40)]);
        let repo = Arc::new(SheetInventoryRepository::with_clock(
            CacheConfig::disabled(),
            clock(),
        ));
        repo.update_inventory(&existing).await.unwrap();

        let source = Arc::new(
            FixtureSource::new()
                .with_collection(
                    "products",
                    vec![json!({
                        "id": "p1", "name": "Jordan 1", "category": "Shoes", "retail_price": 170,
                        "variants": [
                            {"id": "v1", "sku": "JD1-BLK-10", "size": "10", "color": "Black"},
                            {"id": "v2", "sku": "JD1-BLK-11", "size": "11", "color": "Black"}
                        ]
                    })],
                )
                .with_collection(
                    "inventory",
                    vec![
                        json!({"variant_id": "v1", "location_id": "1", "quantity_on_hand": 2}),
                        json!({"variant_id": "v1", "location_id": "2", "quantity_on_hand": 1}),
                        json!({"variant_id": "v2", "quantity_on_hand": 6, "quantity_sold": 4}),
                        json!({"variant_id": "v9", "quantity_on_hand": 1}),
                    ],
                ),
        );
        let gateway = Gateway::new(source, GatewayOptions::default());
        let orch = SyncOrchestrator::new(gateway, repo.clone(), ReconcileSettings::default())
            .with_clock(clock());

        let report = orch.refresh_catalog().await.unwrap();
        assert_eq!(report.products_fetched, 1);
        assert_eq!(report.rows_updated, 1);
        assert_eq!(report.rows_created, 1);
        assert_eq!(report.unmatched_levels, 1);

        let stored = repo.get_inventory().await.unwrap();
        let kept = stored.get("JD1-BLK-10").unwrap();
        assert_eq!(kept.name, "Jordan 1");
        assert_eq!(kept.qty_on_hand, 3);
        assert_eq!(kept.qty_sold, 40);
        assert_eq!(kept.external_id.as_deref(), Some("v1"));

        let created = stored.get("JD1-BLK-11").unwrap();
        assert_eq!(created.qty_on_hand, 6);
        assert_eq!(created.qty_sold, 4);
        assert_eq!(stored.items[1].sku, "JD1-BLK-11");
    }

    #[tokio::test]
    async fn test_restock_priority_in_report() {
        let repo = Arc::new(SheetInventoryRepository::from_snapshot(&InventorySnapshot::new(
            vec![InventoryItem::new("A", 2).with_qty_sold(18)],
        )));
        let sales = vec![json!({
            "id": "s", "date": "2025-10-09", "items": [{"sku": "A", "quantity": 2, "price": 1}]
        })];
        let orch = orchestrator(sales, repo, NegativeStockPolicy::Lenient);

        let report = orch.run_once().await.unwrap();
        assert_eq!(report.restock.len(), 1);
        assert_eq!(report.restock[0].priority, RestockPriority::High);
        assert_eq!(report.restock[0].suggested_reorder, 30);
    }
}
