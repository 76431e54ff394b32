//! # stockline-db: Persistence Layer for Stockline
//!
//! The repository contract the orchestrator writes through, and its two
//! implementations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockline Data Flow                              │
//! │                                                                         │
//! │  SyncOrchestrator (stockline-sync)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockline-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐    ┌────────────┐ │   │
//! │  │   │   Database    │    │  Repositories    │    │ Migrations │ │   │
//! │  │   │   (pool.rs)   │    │                  │    │ (embedded) │ │   │
//! │  │   │               │    │ SqliteInventory  │    │            │ │   │
//! │  │   │ SqlitePool    │◄───│ SheetInventory   │    │ 001_init   │ │   │
//! │  │   └───────────────┘    └────────┬─────────┘    └────────────┘ │   │
//! │  │                                 │                               │   │
//! │  │                        ReadCache (clock + TTL)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`cache`] - TTL read cache
//! - [`repository`] - `InventoryRepository` and implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockline_db::{CacheConfig, Database, DbConfig, InventoryRepository};
//!
//! let db = Database::new(DbConfig::new("stockline.db")).await?;
//! let repo = db.inventory(stockline_core::DEFAULT_TENANT_ID, CacheConfig::default());
//! let snapshot = repo.get_inventory().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::{CacheConfig, ReadCache};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{InventoryRepository, SheetInventoryRepository, SqliteInventoryRepository};
