//! # Stockline Sync Runner
//!
//! Runs one reconciliation pass against the configured source and prints
//! the run report as JSON.
//!
//! ## Usage
//! ```bash
//! # Config from the platform config dir (or defaults + STOCKLINE_* env)
//! cargo run -p stockline-sync --bin stockline-sync
//!
//! # Offline against the bundled fixtures, refreshing the catalog first
//! STOCKLINE_SOURCE_MODE=fixture STOCKLINE_FIXTURE_DIR=./fixtures/commerce \
//!     cargo run -p stockline-sync --bin stockline-sync -- --catalog
//! ```
//!
//! Ctrl-C cancels any pending wait and exits with the cancellation error.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use stockline_db::{Database, DbConfig, InventoryRepository};
use stockline_sync::gateway::source_from_config;
use stockline_sync::{Gateway, GatewayOptions, StocklineConfig, SyncOrchestrator};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockline_sync=trace` - Trace the gateway only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut refresh_catalog = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--catalog" => refresh_catalog = true,
            "--help" | "-h" => {
                println!("Stockline Sync Runner");
                println!();
                println!("Usage: stockline-sync [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>    Config file (default: platform config dir)");
                println!("      --catalog          Refresh products and stock levels first");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let config = StocklineConfig::load(config_path)?;
    info!(
        tenant = %config.tenant_id(),
        source = %config.source.mode,
        db = ?config.database.path,
        "Stockline sync starting"
    );

    let db = Database::new(DbConfig::new(&config.database.path)).await?;
    let repository: Arc<dyn InventoryRepository> = Arc::new(
        db.inventory(config.tenant_id(), config.cache.to_cache_config()),
    );

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            let _ = cancel_tx.send(true);
        }
    });

    let gateway = Gateway::new(
        source_from_config(&config)?,
        GatewayOptions::from_settings(&config.api),
    )
    .with_cancellation(cancel_rx);
    let orchestrator = SyncOrchestrator::new(gateway, repository, config.reconcile.clone());

    if refresh_catalog {
        let catalog = orchestrator.refresh_catalog().await?;
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    }

    let report = orchestrator.run_once().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    db.close().await;
    Ok(())
}
