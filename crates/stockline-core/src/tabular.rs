//! # Tabular Codec
//!
//! Converts an [`InventorySnapshot`] to and from a sheet: one header row
//! followed by string cells, the shape the spreadsheet-backed store keeps.
//!
//! ## Layout
//! ```text
//! ┌──────────┬──────┬──────────┬───────┬──────┬─────────┬─────────────┬────────────┬─────────┬──────────┬─────────────┬──────────────┬────────────┐
//! │ SKU      │ Name │ Category │ Color │ Size │ Barcode │ RetailPrice │ QtyOnHand  │ QtySold │ Location │ LastUpdated │ LastSyncHash │ ExternalId │
//! ├──────────┼──────┼──────────┼───────┼──────┼─────────┼─────────────┼────────────┼─────────┼──────────┼─────────────┼──────────────┼────────────┤
//! │ JD1-...  │ ...  │ Shoes    │ Black │ 10   │         │ 170.00      │ 8          │ 2       │ Main     │ RFC 3339    │ batch fp     │ v-101      │
//! └──────────┴──────┴──────────┴───────┴──────┴─────────┴─────────────┴────────────┴─────────┴──────────┴─────────────┴──────────────┴────────────┘
//! ```
//!
//! Only `SKU` and `QtyOnHand` are required. Other columns may be absent or
//! in any order. Quantities that do not parse are read as 0. The batch
//! fingerprint is written on every row and read back from the first row
//! that carries one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{InventoryItem, InventorySnapshot, SyncBatchFingerprint};

// =============================================================================
// Column Names
// =============================================================================

pub const COL_SKU: &str = "SKU";
pub const COL_NAME: &str = "Name";
pub const COL_CATEGORY: &str = "Category";
pub const COL_COLOR: &str = "Color";
pub const COL_SIZE: &str = "Size";
pub const COL_BARCODE: &str = "Barcode";
pub const COL_RETAIL_PRICE: &str = "RetailPrice";
pub const COL_QTY_ON_HAND: &str = "QtyOnHand";
pub const COL_QTY_SOLD: &str = "QtySold";
pub const COL_LOCATION: &str = "Location";
pub const COL_LAST_UPDATED: &str = "LastUpdated";
pub const COL_LAST_SYNC_HASH: &str = "LastSyncHash";
pub const COL_EXTERNAL_ID: &str = "ExternalId";

/// Column order used when writing.
pub const INVENTORY_COLUMNS: [&str; 13] = [
    COL_SKU,
    COL_NAME,
    COL_CATEGORY,
    COL_COLOR,
    COL_SIZE,
    COL_BARCODE,
    COL_RETAIL_PRICE,
    COL_QTY_ON_HAND,
    COL_QTY_SOLD,
    COL_LOCATION,
    COL_LAST_UPDATED,
    COL_LAST_SYNC_HASH,
    COL_EXTERNAL_ID,
];

// =============================================================================
// Sheet Table
// =============================================================================

/// A header row plus data rows of string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn new(header: Vec<String>) -> Self {
        SheetTable {
            header,
            rows: Vec::new(),
        }
    }

    /// Builds a table from string slices (handy for fixtures and tests).
    pub fn from_rows(header: &[&str], rows: &[&[&str]]) -> Self {
        SheetTable {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    /// Position of each header, by trimmed name.
    pub fn column_index(&self) -> HashMap<&str, usize> {
        self.header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.header.iter().any(|h| h.trim() == name)
    }
}

// =============================================================================
// Encode
// =============================================================================

/// Writes a snapshot as a sheet with the standard column order.
pub fn encode_snapshot(snapshot: &InventorySnapshot) -> SheetTable {
    let fingerprint = snapshot
        .last_sync_fingerprint
        .as_ref()
        .map(|fp| fp.as_str().to_string())
        .unwrap_or_default();

    let mut table = SheetTable::new(INVENTORY_COLUMNS.iter().map(|c| c.to_string()).collect());
    table.rows = snapshot
        .items
        .iter()
        .map(|item| {
            vec![
                item.sku.clone(),
                item.name.clone(),
                item.category.clone(),
                item.color.clone(),
                item.size.clone(),
                item.barcode.clone().unwrap_or_default(),
                item.retail_price.to_string(),
                item.qty_on_hand.to_string(),
                item.qty_sold.to_string(),
                item.location.clone(),
                item.last_updated.map(|ts| ts.to_rfc3339()).unwrap_or_default(),
                fingerprint.clone(),
                item.external_id.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table
}

// =============================================================================
// Decode
// =============================================================================

/// Reads a snapshot from a sheet.
///
/// ## Errors
/// `InvalidSchema` when the `SKU` or `QtyOnHand` column is missing.
/// Fully blank rows are skipped.
pub fn decode_snapshot(table: &SheetTable) -> CoreResult<InventorySnapshot> {
    let missing: Vec<&str> = [COL_SKU, COL_QTY_ON_HAND]
        .into_iter()
        .filter(|col| !table.has_column(col))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::schema(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let columns = table.column_index();
    let mut items = Vec::with_capacity(table.rows.len());
    let mut fingerprint: Option<SyncBatchFingerprint> = None;

    for row in &table.rows {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cell = |name: &str| cell_at(&columns, row, name);

        let mut item = InventoryItem::new(cell(COL_SKU), parse_quantity(cell(COL_QTY_ON_HAND)));
        item.name = cell(COL_NAME).to_string();
        item.category = cell(COL_CATEGORY).to_string();
        item.color = cell(COL_COLOR).to_string();
        item.size = cell(COL_SIZE).to_string();
        item.barcode = non_empty(cell(COL_BARCODE));
        item.retail_price = Money::parse(cell(COL_RETAIL_PRICE)).unwrap_or_default();
        item.qty_sold = parse_quantity(cell(COL_QTY_SOLD));
        item.location = cell(COL_LOCATION).to_string();
        item.last_updated = parse_timestamp(cell(COL_LAST_UPDATED));
        item.external_id = non_empty(cell(COL_EXTERNAL_ID));

        if fingerprint.is_none() {
            fingerprint = non_empty(cell(COL_LAST_SYNC_HASH)).map(SyncBatchFingerprint::new);
        }
        items.push(item);
    }

    Ok(InventorySnapshot {
        items,
        last_sync_fingerprint: fingerprint,
    })
}

fn cell_at<'a>(columns: &HashMap<&str, usize>, row: &'a [String], name: &str) -> &'a str {
    columns
        .get(name)
        .and_then(|&i| row.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

/// Integer cell, tolerating a trailing `.0`. Anything else reads as 0.
pub fn parse_quantity(cell: &str) -> i64 {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<i64>() {
        return value;
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => 0,
    }
}

fn parse_timestamp(cell: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(cell)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn non_empty(cell: &str) -> Option<String> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_columns() {
        let table = SheetTable::from_rows(
            &["QtyOnHand", "SKU"],
            &[&["10", "JD1-BLK-10"], &["abc", "JD1-BLK-11"], &["", ""]],
        );
        let snapshot = decode_snapshot(&table).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("JD1-BLK-10").unwrap().qty_on_hand, 10);
        assert_eq!(snapshot.get("JD1-BLK-11").unwrap().qty_on_hand, 0);
        assert!(snapshot.last_sync_fingerprint.is_none());
    }

    #[test]
    fn test_decode_missing_required_column() {
        let table = SheetTable::from_rows(&["SKU", "Name"], &[&["A", "Alpha"]]);
        let err = decode_snapshot(&table).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid inventory schema: missing required columns: QtyOnHand"
        );
    }

    #[test]
    fn test_encode_then_decode_keeps_fields() {
        let mut snapshot = InventorySnapshot::new(vec![InventoryItem::new("JD1-BLK-10", 8)
            .with_name("Jordan 1 Black")
            .with_category("Shoes")
            .with_size("10")
            .with_price(Money::from_cents(17000))
            .with_qty_sold(2)
            .with_external_id("v-101")]);
        snapshot.last_sync_fingerprint = Some(SyncBatchFingerprint::new("fp-1"));

        let table = encode_snapshot(&snapshot);
        assert_eq!(table.header.len(), INVENTORY_COLUMNS.len());
        assert_eq!(table.rows[0][6], "170.00");

        let decoded = decode_snapshot(&table).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("7"), 7);
        assert_eq!(parse_quantity("7.0"), 7);
        assert_eq!(parse_quantity(" -2 "), -2);
        assert_eq!(parse_quantity("n/a"), 0);
        assert_eq!(parse_quantity(""), 0);
    }
}
