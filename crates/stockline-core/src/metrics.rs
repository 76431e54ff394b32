//! # Inventory Metrics
//!
//! KPIs over a snapshot and the display ordering used when writing it back.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::money::Money;
use crate::types::{InventoryItem, InventorySnapshot};

// =============================================================================
// Metrics
// =============================================================================

/// Per-category totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub sku_count: usize,
    pub total_on_hand: i64,
    pub total_value: Money,
}

/// Snapshot-wide KPIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMetrics {
    pub total_skus: usize,
    pub total_on_hand: i64,
    pub total_sold: i64,
    /// Retail value of everything on hand.
    pub total_value: Money,
    /// Rows at or below the threshold (out-of-stock rows included).
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    /// Keyed by category; rows without one fall under `""`.
    pub categories: BTreeMap<String, CategoryStats>,
}

/// Computes KPIs for `snapshot` against `threshold`.
pub fn calculate_metrics(snapshot: &InventorySnapshot, threshold: i64) -> InventoryMetrics {
    let mut metrics = InventoryMetrics {
        total_skus: snapshot.len(),
        ..InventoryMetrics::default()
    };

    for item in &snapshot.items {
        let value = item.stock_value();
        metrics.total_on_hand = metrics.total_on_hand.saturating_add(item.qty_on_hand);
        metrics.total_sold = metrics.total_sold.saturating_add(item.qty_sold);
        metrics.total_value += value;
        if item.qty_on_hand <= threshold {
            metrics.low_stock_count += 1;
        }
        if item.is_out_of_stock() {
            metrics.out_of_stock_count += 1;
        }

        let stats = metrics.categories.entry(item.category.clone()).or_default();
        stats.sku_count += 1;
        stats.total_on_hand = stats.total_on_hand.saturating_add(item.qty_on_hand);
        stats.total_value += value;
    }

    metrics
}

// =============================================================================
// Display Ordering
// =============================================================================

/// Sort position of a size label.
///
/// ```text
/// "OS" < "XS" < "S" < "M" < "L" < "XL" < "XXL" < "XXXL"   (0.0 .. 7.0)
/// "7.5", "10", "32"  → numeric value (shoe / waist sizes)
/// anything else      → after every known size, alphabetical
/// ""                 → last
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SizeKey {
    Known(f64),
    Other(String),
    Missing,
}

impl SizeKey {
    pub fn of(size: &str) -> Self {
        let size = size.trim().to_uppercase();
        if size.is_empty() {
            return SizeKey::Missing;
        }
        if let Ok(value) = size.parse::<f64>() {
            if value.is_finite() {
                return SizeKey::Known(value);
            }
        }
        let apparel = match size.as_str() {
            "OS" => Some(0.0),
            "XS" => Some(1.0),
            "S" => Some(2.0),
            "M" => Some(3.0),
            "L" => Some(4.0),
            "XL" => Some(5.0),
            "XXL" => Some(6.0),
            "XXXL" => Some(7.0),
            _ => None,
        };
        match apparel {
            Some(value) => SizeKey::Known(value),
            None => SizeKey::Other(size),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SizeKey::Known(_) => 0,
            SizeKey::Other(_) => 1,
            SizeKey::Missing => 2,
        }
    }
}

impl Eq for SizeKey {}

impl Ord for SizeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SizeKey::Known(a), SizeKey::Known(b)) => a.total_cmp(b),
            (SizeKey::Other(a), SizeKey::Other(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SizeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders rows by Category, then Name, then Size. Stable.
pub fn auto_sort(items: &mut [InventoryItem]) {
    items.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| SizeKey::of(&a.size).cmp(&SizeKey::of(&b.size)))
    });
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let snapshot = InventorySnapshot::new(vec![
            InventoryItem::new("A", 10)
                .with_category("Shoes")
                .with_price(Money::from_cents(17000))
                .with_qty_sold(3),
            InventoryItem::new("B", 0)
                .with_category("Shoes")
                .with_price(Money::from_cents(9000)),
            InventoryItem::new("C", 4)
                .with_category("Tees")
                .with_price(Money::from_cents(2500))
                .with_qty_sold(1),
        ]);
        let metrics = calculate_metrics(&snapshot, 5);

        assert_eq!(metrics.total_skus, 3);
        assert_eq!(metrics.total_on_hand, 14);
        assert_eq!(metrics.total_sold, 4);
        assert_eq!(metrics.total_value.cents(), 170000 + 10000);
        assert_eq!(metrics.low_stock_count, 2);
        assert_eq!(metrics.out_of_stock_count, 1);

        let shoes = &metrics.categories["Shoes"];
        assert_eq!(shoes.sku_count, 2);
        assert_eq!(shoes.total_on_hand, 10);
        assert_eq!(shoes.total_value.cents(), 170000);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = calculate_metrics(&InventorySnapshot::default(), 5);
        assert_eq!(metrics, InventoryMetrics::default());
    }

    #[test]
    fn test_size_keys() {
        assert!(SizeKey::of("OS") < SizeKey::of("xs"));
        assert!(SizeKey::of("M") < SizeKey::of("XL"));
        assert!(SizeKey::of("9.5") < SizeKey::of("10"));
        assert!(SizeKey::of("10") < SizeKey::of("ONE-OFF"));
        assert!(SizeKey::of("ONE-OFF") < SizeKey::of(""));
    }

    #[test]
    fn test_auto_sort() {
        let mut items = vec![
            InventoryItem::new("T-L", 1).with_category("Tees").with_name("Logo").with_size("L"),
            InventoryItem::new("J-10", 1).with_category("Shoes").with_name("Jordan 1").with_size("10"),
            InventoryItem::new("T-S", 1).with_category("Tees").with_name("Logo").with_size("S"),
            InventoryItem::new("J-9", 1).with_category("Shoes").with_name("Jordan 1").with_size("9.5"),
        ];
        auto_sort(&mut items);
        let order: Vec<&str> = items.iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(order, vec!["J-9", "J-10", "T-S", "T-L"]);
    }
}
