//! # stockline-core: Pure Business Logic for Stockline
//!
//! This crate holds the inventory rules of Stockline as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 stockline-sync (gateway + orchestrator)         │   │
//! │  │   fetch sales ──► build events ──► reconcile ──► advise ──► save │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockline-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ reconcile │  │  advisor  │  │  hashing  │  │  tabular  │  │   │
//! │  │   │ apply     │  │ low stock │  │ sale hash │  │ sheet     │  │   │
//! │  │   │ dedup     │  │ restock   │  │ batch fp  │  │ codec     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockline-db (Repository Layer)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, SaleEvent, snapshot, reports)
//! - [`money`] - Integer-cent money type
//! - [`error`] - Domain error types
//! - [`hashing`] - Sale dedup hashes and batch fingerprints
//! - [`reconcile`] - Idempotent application of sales to a snapshot
//! - [`advisor`] - Low-stock detection and restock suggestions
//! - [`metrics`] - Inventory KPIs and display ordering
//! - [`tabular`] - Sheet (header + rows) codec for snapshots
//! - [`validation`] - Input and snapshot validation
//! - [`clock`] - Time source abstraction
//!
//! ## Example Usage
//!
//! ```rust
//! use stockline_core::reconcile::{apply_sales, ReconcileContext};
//! use stockline_core::{InventoryItem, InventorySnapshot, NegativeStockPolicy, SaleEvent};
//!
//! let snapshot = InventorySnapshot::new(vec![InventoryItem::new("JD1-BLK-10", 10)]);
//! let sales = vec![SaleEvent::new("JD1-BLK-10", 2, "2025-10-09")];
//!
//! let ctx = ReconcileContext::new(NegativeStockPolicy::Lenient);
//! let (updated, report) = apply_sales(&snapshot, &sales, &ctx).unwrap();
//!
//! assert_eq!(updated.get("JD1-BLK-10").unwrap().qty_on_hand, 8);
//! assert_eq!(report.processed_sales, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod advisor;
pub mod clock;
pub mod error;
pub mod hashing;
pub mod metrics;
pub mod money;
pub mod reconcile;
pub mod tabular;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID (single-tenant runtime with a multi-tenant schema).
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Threshold used when the tenant config has no `LowStockThreshold` entry.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Config key holding the tenant's low-stock threshold.
pub const LOW_STOCK_THRESHOLD_KEY: &str = "LowStockThreshold";
