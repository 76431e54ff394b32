//! # stockline-sync: Gateway and Orchestrator for Stockline
//!
//! Everything that talks to the commerce API, and the run that turns its
//! sales into a reconciled, persisted snapshot.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockline Sync Flow                              │
//! │                                                                         │
//! │   commerce API (HTTP)           fixtures (JSON files)                  │
//! │          │                              │                               │
//! │          └──────────────┬───────────────┘                               │
//! │                         ▼                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockline-sync (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   PageSource ──► Gateway ──► records ──► SyncOrchestrator       │   │
//! │  │   (one call)     (paging,    (DTOs ──►    (reconcile, advise,   │   │
//! │  │                   retries)    SaleEvent)   persist)             │   │
//! │  └──────────────────────────────────────────────┬──────────────────┘   │
//! │                                                 │                       │
//! │                                                 ▼                       │
//! │                         stockline-core   stockline-db                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - TOML configuration with environment overrides
//! - [`error`] - Sync error types
//! - [`gateway`] - Pagination, retry policy and page sources
//! - [`records`] - Lenient API records and their mapping to domain types
//! - [`orchestrator`] - One reconciliation run and catalog refresh
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockline_sync::{gateway, Gateway, GatewayOptions, StocklineConfig, SyncOrchestrator};
//!
//! let config = StocklineConfig::load(None)?;
//! let source = gateway::source_from_config(&config)?;
//! let gateway = Gateway::new(source, GatewayOptions::from_settings(&config.api));
//! let orchestrator = SyncOrchestrator::new(gateway, repository, config.reconcile.clone());
//! let report = orchestrator.run_once().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod records;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{SourceMode, StocklineConfig};
pub use error::{SyncError, SyncResult};
pub use gateway::{FixtureSource, Gateway, GatewayOptions, HttpSource, PageSource};
pub use orchestrator::{CatalogRefreshReport, RunStatus, SyncOrchestrator, SyncRunReport};
