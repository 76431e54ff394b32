//! # SQLite Inventory Repository
//!
//! Tenant-scoped tables behind [`InventoryRepository`].
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update_inventory(&snapshot)                                           │
//! │       │                                                                 │
//! │       ├── keys valid? (blank/duplicate SKU ──► DbError::Schema)         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │  1. DELETE FROM inventory_items WHERE tenant_id = ?            │   │
//! │  │  2. INSERT each row with sort_order = position                 │   │
//! │  │  3. UPSERT sync_state.last_sync_fingerprint                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT, then invalidate the read cache                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `commit_reconciliation` runs the same three steps and inserts the applied
//! sale hashes into `sales_log` before the one COMMIT.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use std::sync::Arc;
use stockline_core::{
    Clock, InventoryItem, InventorySnapshot, Money, RestockPriority, RestockSuggestion,
    SalesLogEntry, SyncBatchFingerprint,
};
use tracing::{debug, info};

use super::InventoryRepository;
use crate::cache::{CacheConfig, ReadCache};
use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    sku: String,
    name: String,
    category: String,
    size: String,
    color: String,
    barcode: Option<String>,
    external_id: Option<String>,
    retail_price_cents: i64,
    qty_on_hand: i64,
    qty_sold: i64,
    location: String,
    last_updated: Option<DateTime<Utc>>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        InventoryItem {
            sku: row.sku,
            name: row.name,
            category: row.category,
            size: row.size,
            color: row.color,
            barcode: row.barcode,
            external_id: row.external_id,
            retail_price: Money::from_cents(row.retail_price_cents),
            qty_on_hand: row.qty_on_hand,
            qty_sold: row.qty_sold,
            location: row.location,
            last_updated: row.last_updated,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RestockRow {
    sku: String,
    name: String,
    current_qty: i64,
    threshold: i64,
    suggested_reorder: i64,
    priority: String,
}

impl TryFrom<RestockRow> for RestockSuggestion {
    type Error = DbError;

    fn try_from(row: RestockRow) -> Result<Self, Self::Error> {
        Ok(RestockSuggestion {
            priority: parse_restock_priority(&row.priority)?,
            sku: row.sku,
            name: row.name,
            current_qty: row.current_qty,
            threshold: row.threshold,
            suggested_reorder: row.suggested_reorder,
        })
    }
}

fn parse_restock_priority(label: &str) -> DbResult<RestockPriority> {
    label
        .parse::<RestockPriority>()
        .map_err(|e| DbError::Corrupt(e.to_string()))
}

// =============================================================================
// Repository
// =============================================================================

/// SQLite-backed inventory repository for one tenant.
#[derive(Debug, Clone)]
pub struct SqliteInventoryRepository {
    pool: SqlitePool,
    tenant_id: String,
    cache: Arc<ReadCache<InventorySnapshot>>,
}

impl SqliteInventoryRepository {
    /// Creates a repository with a wall-clock cache.
    pub fn new(pool: SqlitePool, tenant_id: impl Into<String>, cache: CacheConfig) -> Self {
        SqliteInventoryRepository {
            pool,
            tenant_id: tenant_id.into(),
            cache: Arc::new(ReadCache::system(cache)),
        }
    }

    /// Creates a repository whose cache and timestamps follow `clock`.
    pub fn with_clock(
        pool: SqlitePool,
        tenant_id: impl Into<String>,
        cache: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        SqliteInventoryRepository {
            pool,
            tenant_id: tenant_id.into(),
            cache: Arc::new(ReadCache::new(cache, clock)),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn now(&self) -> DateTime<Utc> {
        self.cache.clock().now()
    }

    /// Sets one integer config value.
    pub async fn set_config(&self, key: &str, value: i64) -> DbResult<()> {
        self.cache.invalidate();
        sqlx::query(
            r#"
            INSERT INTO tenant_config (tenant_id, key, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (tenant_id, key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(&self.tenant_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Number of inventory rows stored for the tenant.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items WHERE tenant_id = ?1")
                .bind(&self.tenant_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Replaces rows and fingerprint on `conn`; the caller owns the transaction.
    async fn write_snapshot(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &InventorySnapshot,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM inventory_items WHERE tenant_id = ?1")
            .bind(&self.tenant_id)
            .execute(&mut *conn)
            .await?;

        for (position, item) in snapshot.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO inventory_items (
                    tenant_id, sku, name, category, size, color, barcode, external_id,
                    retail_price_cents, qty_on_hand, qty_sold, location, last_updated, sort_order
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
            )
            .bind(&self.tenant_id)
            .bind(item.sku.trim())
            .bind(&item.name)
            .bind(&item.category)
            .bind(&item.size)
            .bind(&item.color)
            .bind(&item.barcode)
            .bind(&item.external_id)
            .bind(item.retail_price.cents())
            .bind(item.qty_on_hand)
            .bind(item.qty_sold)
            .bind(&item.location)
            .bind(item.last_updated)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO sync_state (tenant_id, last_sync_fingerprint, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (tenant_id) DO UPDATE SET
                last_sync_fingerprint = excluded.last_sync_fingerprint,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.tenant_id)
        .bind(
            snapshot
                .last_sync_fingerprint
                .as_ref()
                .map(|fp| fp.as_str().to_string()),
        )
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn write_log_entry(
        &self,
        conn: &mut SqliteConnection,
        hash: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sales_log (tenant_id, hash, processed_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (tenant_id, hash) DO NOTHING
            "#,
        )
        .bind(&self.tenant_id)
        .bind(hash)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn load_inventory(&self) -> DbResult<InventorySnapshot> {
        let rows: Vec<InventoryRow> = sqlx::query_as(
            r#"
            SELECT sku, name, category, size, color, barcode, external_id,
                   retail_price_cents, qty_on_hand, qty_sold, location, last_updated
            FROM inventory_items
            WHERE tenant_id = ?1
            ORDER BY sort_order ASC, sku ASC
            "#,
        )
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let fingerprint: Option<Option<String>> = sqlx::query_scalar(
            "SELECT last_sync_fingerprint FROM sync_state WHERE tenant_id = ?1",
        )
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(InventorySnapshot {
            items: rows.into_iter().map(InventoryItem::from).collect(),
            last_sync_fingerprint: fingerprint.flatten().map(SyncBatchFingerprint::new),
        })
    }
}

#[async_trait]
impl InventoryRepository for SqliteInventoryRepository {
    async fn get_inventory(&self) -> DbResult<InventorySnapshot> {
        if let Some(snapshot) = self.cache.get() {
            return Ok(snapshot);
        }
        let snapshot = self.load_inventory().await?;
        debug!(tenant_id = %self.tenant_id, rows = snapshot.len(), "Loaded inventory");
        self.cache.put(snapshot.clone());
        Ok(snapshot)
    }

    async fn get_config(&self) -> DbResult<BTreeMap<String, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT key, value FROM tenant_config WHERE tenant_id = ?1")
                .bind(&self.tenant_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    async fn update_inventory(&self, snapshot: &InventorySnapshot) -> DbResult<()> {
        self.cache.invalidate();
        snapshot.index_by_sku()?;

        let now = self.now();
        let mut tx = self.pool.begin().await?;
        self.write_snapshot(&mut tx, snapshot, now).await?;
        tx.commit().await?;
        self.cache.invalidate();

        info!(
            tenant_id = %self.tenant_id,
            rows = snapshot.len(),
            "Inventory written"
        );
        Ok(())
    }

    async fn commit_reconciliation(
        &self,
        snapshot: &InventorySnapshot,
        applied_hashes: &[String],
    ) -> DbResult<()> {
        self.cache.invalidate();
        snapshot.index_by_sku()?;

        let now = self.now();
        let mut tx = self.pool.begin().await?;
        self.write_snapshot(&mut tx, snapshot, now).await?;
        for hash in applied_hashes {
            self.write_log_entry(&mut tx, hash, now).await?;
        }
        tx.commit().await?;
        self.cache.invalidate();

        info!(
            tenant_id = %self.tenant_id,
            rows = snapshot.len(),
            hashes = applied_hashes.len(),
            "Reconciliation committed"
        );
        Ok(())
    }

    async fn get_sales_log(&self) -> DbResult<Vec<SalesLogEntry>> {
        let rows: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT hash, processed_at
            FROM sales_log
            WHERE tenant_id = ?1
            ORDER BY processed_at ASC, hash ASC
            "#,
        )
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(hash, processed_at)| SalesLogEntry { hash, processed_at })
            .collect())
    }

    async fn add_sales_log_entry(&self, hash: &str) -> DbResult<()> {
        self.cache.invalidate();
        let mut conn = self.pool.acquire().await?;
        self.write_log_entry(&mut conn, hash, self.now()).await
    }

    async fn update_restock_list(&self, suggestions: &[RestockSuggestion]) -> DbResult<()> {
        self.cache.invalidate();
        let now = self.now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM restock_list WHERE tenant_id = ?1")
            .bind(&self.tenant_id)
            .execute(&mut *tx)
            .await?;

        for (position, suggestion) in suggestions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO restock_list (
                    tenant_id, position, sku, name, current_qty, threshold,
                    suggested_reorder, priority, generated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&self.tenant_id)
            .bind(position as i64)
            .bind(&suggestion.sku)
            .bind(&suggestion.name)
            .bind(suggestion.current_qty)
            .bind(suggestion.threshold)
            .bind(suggestion.suggested_reorder)
            .bind(suggestion.priority.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            tenant_id = %self.tenant_id,
            count = suggestions.len(),
            "Restock list written"
        );
        Ok(())
    }

    async fn get_restock_list(&self) -> DbResult<Vec<RestockSuggestion>> {
        let rows: Vec<RestockRow> = sqlx::query_as(
            r#"
            SELECT sku, name, current_qty, threshold, suggested_reorder, priority
            FROM restock_list
            WHERE tenant_id = ?1
            ORDER BY position ASC
            "#,
        )
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RestockSuggestion::try_from).collect()
    }
}
