//! SQLite repository against an in-memory database with migrations applied.

use stockline_core::{
    InventoryItem, InventorySnapshot, Money, RestockPriority, RestockSuggestion,
    SyncBatchFingerprint, LOW_STOCK_THRESHOLD_KEY,
};
use stockline_db::{CacheConfig, Database, DbConfig, DbError, InventoryRepository};

async fn database() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn snapshot() -> InventorySnapshot {
    let mut snapshot = InventorySnapshot::new(vec![
        InventoryItem::new("TEE-BLK-M", 9)
            .with_name("Logo Tee Black")
            .with_category("Apparel")
            .with_size("M")
            .with_price(Money::from_cents(3500))
            .with_external_id("v-tee-blk-m"),
        InventoryItem::new("JD1-BLK-10", 2)
            .with_name("Jordan 1 Black")
            .with_category("Shoes")
            .with_size("10")
            .with_qty_sold(13)
            .with_price(Money::from_cents(17000)),
    ]);
    snapshot.last_sync_fingerprint = Some(SyncBatchFingerprint::new("abc123"));
    snapshot
}

#[tokio::test]
async fn test_inventory_roundtrip_keeps_order_and_fingerprint() {
    let db = database().await;
    let repo = db.inventory("shop-a", CacheConfig::disabled());

    repo.update_inventory(&snapshot()).await.unwrap();
    let stored = repo.get_inventory().await.unwrap();

    assert_eq!(stored.len(), 2);
    assert_eq!(stored.items[0].sku, "TEE-BLK-M");
    assert_eq!(stored.items[1].sku, "JD1-BLK-10");
    assert_eq!(stored.items[0].external_id.as_deref(), Some("v-tee-blk-m"));
    assert_eq!(stored.items[1].retail_price, Money::from_cents(17000));
    assert_eq!(stored.items[1].qty_sold, 13);
    assert_eq!(
        stored.last_sync_fingerprint,
        Some(SyncBatchFingerprint::new("abc123"))
    );
}

#[tokio::test]
async fn test_update_replaces_previous_rows() {
    let db = database().await;
    let repo = db.inventory("shop-a", CacheConfig::default());

    repo.update_inventory(&snapshot()).await.unwrap();
    let smaller = InventorySnapshot::new(vec![InventoryItem::new("CAP-BLK-OS", 6)]);
    repo.update_inventory(&smaller).await.unwrap();

    let stored = repo.get_inventory().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored.items[0].sku, "CAP-BLK-OS");
    assert!(stored.last_sync_fingerprint.is_none());
}

#[tokio::test]
async fn test_duplicate_skus_rejected_before_writing() {
    let db = database().await;
    let repo = db.inventory("shop-a", CacheConfig::disabled());
    repo.update_inventory(&snapshot()).await.unwrap();

    let broken = InventorySnapshot::new(vec![
        InventoryItem::new("A", 1),
        InventoryItem::new("A", 2),
    ]);
    let err = repo.update_inventory(&broken).await.unwrap_err();
    assert!(matches!(err, DbError::Schema(_)));
    assert_eq!(repo.get_inventory().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let db = database().await;
    let a = db.inventory("shop-a", CacheConfig::disabled());
    let b = db.inventory("shop-b", CacheConfig::disabled());

    a.update_inventory(&snapshot()).await.unwrap();
    a.add_sales_log_entry("h1").await.unwrap();
    a.set_config(LOW_STOCK_THRESHOLD_KEY, 3).await.unwrap();

    assert!(b.get_inventory().await.unwrap().is_empty());
    assert!(b.get_sales_log().await.unwrap().is_empty());
    assert_eq!(a.low_stock_threshold().await.unwrap(), 3);
    assert_eq!(b.low_stock_threshold().await.unwrap(), 5);
}

#[tokio::test]
async fn test_sales_log_is_append_only_and_deduplicated() {
    let db = database().await;
    let repo = db.inventory("shop-a", CacheConfig::disabled());

    repo.add_sales_log_entry("h1").await.unwrap();
    repo.add_sales_log_entry("h2").await.unwrap();
    repo.add_sales_log_entry("h1").await.unwrap();

    let hashes: Vec<String> = repo
        .get_sales_log()
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.hash)
        .collect();
    assert_eq!(hashes.len(), 2);
    assert!(hashes.contains(&"h1".to_string()));
    assert!(hashes.contains(&"h2".to_string()));
}

#[tokio::test]
async fn test_restock_list_replaced_in_order() {
    let db = database().await;
    let repo = db.inventory("shop-a", CacheConfig::disabled());

    let suggestion = |sku: &str, qty: i64, priority| RestockSuggestion {
        sku: sku.to_string(),
        name: String::new(),
        current_qty: qty,
        threshold: 5,
        suggested_reorder: 10,
        priority,
    };

    repo.update_restock_list(&[suggestion("OLD", 1, RestockPriority::Medium)])
        .await
        .unwrap();
    repo.update_restock_list(&[
        suggestion("B", 0, RestockPriority::High),
        suggestion("A", 4, RestockPriority::Low),
    ])
    .await
    .unwrap();

    let stored = repo.get_restock_list().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].sku, "B");
    assert_eq!(stored[0].priority, RestockPriority::High);
    assert_eq!(stored[1].sku, "A");
}

#[tokio::test]
async fn test_commit_reconciliation_writes_rows_and_hashes() {
    let db = database().await;
    let repo = db.inventory("shop-a", CacheConfig::disabled());
    repo.update_inventory(&snapshot()).await.unwrap();
    repo.add_sales_log_entry("h1").await.unwrap();

    let mut sold = snapshot();
    sold.items[0].qty_on_hand = 7;
    sold.last_sync_fingerprint = Some(SyncBatchFingerprint::new("def456"));
    repo.commit_reconciliation(&sold, &["h1".to_string(), "h2".to_string()])
        .await
        .unwrap();

    let stored = repo.get_inventory().await.unwrap();
    assert_eq!(stored.get("TEE-BLK-M").unwrap().qty_on_hand, 7);
    assert_eq!(
        stored.last_sync_fingerprint,
        Some(SyncBatchFingerprint::new("def456"))
    );
    assert_eq!(repo.get_sales_log().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_commit_reconciliation_rolls_back_on_log_failure() {
    let db = database().await;
    let repo = db.inventory("shop-a", CacheConfig::disabled());
    repo.update_inventory(&snapshot()).await.unwrap();

    sqlx::query("DROP TABLE sales_log")
        .execute(db.pool())
        .await
        .unwrap();

    let mut sold = snapshot();
    sold.items[0].qty_on_hand = 7;
    sold.last_sync_fingerprint = None;
    let err = repo
        .commit_reconciliation(&sold, &["h1".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::QueryFailed(_)), "unexpected error: {err}");

    let stored = repo.get_inventory().await.unwrap();
    assert_eq!(stored.get("TEE-BLK-M").unwrap().qty_on_hand, 9);
    assert_eq!(
        stored.last_sync_fingerprint,
        Some(SyncBatchFingerprint::new("abc123"))
    );
}
