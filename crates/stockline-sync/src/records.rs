//! # Remote Records
//!
//! Wire shapes of the commerce API collections and their conversion into
//! domain types.
//!
//! ## Boundary Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  API JSON                          Domain                               │
//! │  ─────────                         ──────                               │
//! │  "id": 42 or "42"          ──►     String                               │
//! │  "retail_price": 19.99     ──►     Money (cents)                        │
//! │  "quantity": "3" / 3.0     ──►     i64                                  │
//! │  missing field             ──►     default (empty / 0 / None)           │
//! │                                                                         │
//! │  RemoteProduct + variants  ──►     InventoryItem per SKU                │
//! │  RemoteSale lines          ──►     SaleEvent per line with a SKU        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are deserialized leniently: the API is not consistent about
//! numbers versus strings, and a malformed field should not drop a page.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use stockline_core::{InventoryItem, InventorySnapshot, Money, SaleEvent};

// =============================================================================
// Lenient Field Decoders
// =============================================================================

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_money(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => n.as_f64().map(Money::from_decimal),
        Value::String(s) => Money::parse(s),
        _ => None,
    }
}

fn value_to_qty(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => stockline_core::tabular::parse_quantity(s),
        _ => 0,
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value).unwrap_or_default())
}

fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

fn de_money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_money(&value).unwrap_or_default())
}

fn de_opt_money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Money>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_money(&value))
}

fn de_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_qty(&value))
}

// =============================================================================
// Products
// =============================================================================

/// A product from `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteProduct {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub sku: Option<String>,

    #[serde(default, deserialize_with = "de_id")]
    pub name: String,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "de_money")]
    pub retail_price: Money,

    /// Filled by `get_products(true)` from `products/{id}/variants`, or
    /// embedded by the API.
    #[serde(default)]
    pub variants: Vec<RemoteVariant>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub updated_at: Option<String>,
}

/// A sellable variant of a product (one size/color combination).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteVariant {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub sku: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub size: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub color: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub barcode: Option<String>,

    #[serde(default, deserialize_with = "de_opt_money")]
    pub retail_price: Option<Money>,
}

impl RemoteProduct {
    /// One inventory row per variant, or one for the product itself when it
    /// has no variants. Rows without a SKU are dropped.
    ///
    /// Quantities are zero; stock levels arrive separately.
    pub fn to_items(&self) -> Vec<InventoryItem> {
        let category = self.category.clone().unwrap_or_default();

        if self.variants.is_empty() {
            return self
                .sku
                .as_ref()
                .map(|sku| {
                    InventoryItem::new(sku.clone(), 0)
                        .with_name(self.name.clone())
                        .with_category(category.clone())
                        .with_price(self.retail_price)
                        .with_external_id(self.id.clone())
                })
                .into_iter()
                .collect();
        }

        self.variants
            .iter()
            .filter_map(|variant| {
                let sku = variant.sku.clone()?;
                let mut item = InventoryItem::new(sku, 0)
                    .with_name(variant.name.clone().unwrap_or_else(|| self.name.clone()))
                    .with_category(category.clone())
                    .with_size(variant.size.clone().unwrap_or_default())
                    .with_color(variant.color.clone().unwrap_or_default())
                    .with_price(variant.retail_price.unwrap_or(self.retail_price))
                    .with_external_id(variant.id.clone());
                item.barcode = variant.barcode.clone();
                Some(item)
            })
            .collect()
    }
}

// =============================================================================
// Inventory Levels
// =============================================================================

/// A stock level from `GET /inventory`, one per variant and location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteInventoryLevel {
    #[serde(default, deserialize_with = "de_id")]
    pub variant_id: String,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub location_id: Option<String>,

    #[serde(default, deserialize_with = "de_qty")]
    pub quantity_on_hand: i64,

    #[serde(default, deserialize_with = "de_qty")]
    pub quantity_sold: i64,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub last_updated: Option<String>,
}

// =============================================================================
// Sales
// =============================================================================

/// A sale from `GET /sales`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSale {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,

    #[serde(default, deserialize_with = "de_id")]
    pub date: String,

    #[serde(default, deserialize_with = "de_money")]
    pub total: Money,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub location_id: Option<String>,

    #[serde(default)]
    pub items: Vec<RemoteSaleLine>,
}

/// One line of a sale. Identified by SKU, or by variant id when the API
/// omits the SKU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSaleLine {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub sku: Option<String>,

    #[serde(default, deserialize_with = "de_opt_string")]
    pub variant_id: Option<String>,

    #[serde(default, deserialize_with = "de_qty")]
    pub quantity: i64,

    #[serde(default, alias = "unit_price", deserialize_with = "de_money")]
    pub price: Money,
}

/// Maps variant ids to SKUs using the `external_id` of snapshot rows.
pub fn variant_index(snapshot: &InventorySnapshot) -> HashMap<String, String> {
    snapshot
        .items
        .iter()
        .filter_map(|item| {
            item.external_id
                .as_ref()
                .map(|id| (id.clone(), item.sku.clone()))
        })
        .collect()
}

impl RemoteSale {
    /// Sale events for every line whose SKU can be resolved.
    ///
    /// Lines keep their quantity as sent; the reconciliation engine decides
    /// what to skip.
    pub fn to_events(&self, variants: &HashMap<String, String>) -> Vec<SaleEvent> {
        self.items
            .iter()
            .filter_map(|line| {
                let sku = line.sku.clone().or_else(|| {
                    line.variant_id
                        .as_ref()
                        .and_then(|id| variants.get(id).cloned())
                })?;
                Some(SaleEvent::new(sku, line.quantity, self.date.clone()).with_unit_price(line.price))
            })
            .collect()
    }
}

/// Flattens sales into events in API order.
pub fn build_sale_events(sales: &[RemoteSale], snapshot: &InventorySnapshot) -> Vec<SaleEvent> {
    let variants = variant_index(snapshot);
    sales
        .iter()
        .flat_map(|sale| sale.to_events(&variants))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
