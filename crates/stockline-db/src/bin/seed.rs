//! # Seed Data Generator
//!
//! Populates a SQLite database with a development inventory.
//!
//! ## Usage
//! ```bash
//! # Default catalog into ./stockline_dev.db
//! cargo run -p stockline-db --bin seed
//!
//! # Custom path, tenant and threshold
//! cargo run -p stockline-db --bin seed -- --db ./data/stockline.db --threshold 3
//! ```
//!
//! ## Generated Rows
//! Shoe models in numeric sizes and apparel in letter sizes. Each row has:
//! - SKU: `{MODEL}-{COLOR}-{SIZE}`
//! - Price derived from the model
//! - Stock 0 - 12 so a fresh database already shows low-stock rows

use std::env;
use stockline_core::metrics::auto_sort;
use stockline_core::{
    InventoryItem, InventorySnapshot, Money, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TENANT_ID,
    LOW_STOCK_THRESHOLD_KEY,
};
use stockline_db::{CacheConfig, Database, DbConfig, InventoryRepository};

/// (model code, display name, category, retail price in cents, colors, sizes)
const CATALOG: &[(&str, &str, &str, i64, &[&str], &[&str])] = &[
    (
        "JD1",
        "Jordan 1 Retro High",
        "Shoes",
        17000,
        &["BLK", "RED"],
        &["8", "8.5", "9", "9.5", "10", "10.5", "11", "12"],
    ),
    (
        "AF1",
        "Air Force 1 '07",
        "Shoes",
        11500,
        &["WHT", "BLK"],
        &["7", "8", "9", "10", "11", "12"],
    ),
    (
        "D550",
        "Dunk Low",
        "Shoes",
        12000,
        &["PND", "GRY"],
        &["8", "9", "10", "11"],
    ),
    (
        "TEE",
        "Logo Tee",
        "Apparel",
        3500,
        &["BLK", "WHT", "NVY"],
        &["XS", "S", "M", "L", "XL", "XXL"],
    ),
    (
        "HOOD",
        "Fleece Hoodie",
        "Apparel",
        8500,
        &["GRY", "BLK"],
        &["S", "M", "L", "XL"],
    ),
    ("CAP", "Dad Cap", "Accessories", 3000, &["BLK", "KHK"], &["OS"]),
];

fn color_name(code: &str) -> &'static str {
    match code {
        "BLK" => "Black",
        "RED" => "Red",
        "WHT" => "White",
        "NVY" => "Navy",
        "GRY" => "Grey",
        "PND" => "Panda",
        "KHK" => "Khaki",
        _ => "Other",
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockline_dev.db");
    let mut tenant_id = String::from(DEFAULT_TENANT_ID);
    let mut threshold = DEFAULT_LOW_STOCK_THRESHOLD;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--threshold" => {
                if i + 1 < args.len() {
                    threshold = args[i + 1].parse().unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockline Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./stockline_dev.db)");
                println!("  -t, --tenant <ID>      Tenant id (default: {})", DEFAULT_TENANT_ID);
                println!("      --threshold <N>    LowStockThreshold setting (default: 5)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockline Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Tenant:   {}", tenant_id);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let repo = db.inventory(&tenant_id, CacheConfig::disabled());

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = repo.count().await?;
    if existing > 0 {
        println!("⚠ Tenant already has {} inventory rows", existing);
        println!("  Skipping seed to avoid overwriting live counts.");
        return Ok(());
    }

    let mut items = Vec::new();
    let mut seed = 0_i64;
    for (model, name, category, price_cents, colors, sizes) in CATALOG {
        for color in colors.iter() {
            for size in sizes.iter() {
                items.push(
                    InventoryItem::new(
                        format!("{}-{}-{}", model, color, size.replace('.', "H")),
                        (seed * 7) % 13,
                    )
                    .with_name(format!("{} {}", name, color_name(color)))
                    .with_category(*category)
                    .with_color(color_name(color))
                    .with_size(*size)
                    .with_price(Money::from_cents(*price_cents))
                    .with_location("Main"),
                );
                seed += 1;
            }
        }
    }
    auto_sort(&mut items);

    let snapshot = InventorySnapshot::new(items);
    repo.update_inventory(&snapshot).await?;
    repo.set_config(LOW_STOCK_THRESHOLD_KEY, threshold).await?;

    println!();
    println!("✓ Wrote {} inventory rows", snapshot.len());
    println!("✓ {} = {}", LOW_STOCK_THRESHOLD_KEY, threshold);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
