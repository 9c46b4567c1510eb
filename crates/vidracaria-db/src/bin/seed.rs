//! # Seed Data Loader
//!
//! Loads the demo dataset into a SQLite file, so the CLI can run against a
//! real database with the same records demo mode shows.
//!
//! ## Usage
//! ```bash
//! # Seed ./vidracaria_dev.db (default)
//! cargo run -p vidracaria-db --bin seed
//!
//! # Specify database path
//! cargo run -p vidracaria-db --bin seed -- --db ./data/vidracaria.db
//! ```

use std::env;
use vidracaria_core::inventory::is_low_stock;
use vidracaria_core::register::running_balance;
use vidracaria_core::{CashMovement, CashRegister, Product};
use vidracaria_db::store::{FetchOptions, FilterOp, RecordStore};
use vidracaria_db::{demo, migrations, Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vidracaria_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vidraçaria Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vidracaria_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vidraçaria Seed Data Loader");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = db.store();

    let (total, applied) = migrations::migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = store.fetch_all::<CashRegister>(&FetchOptions::new()).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} cash registers", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    demo::load(&store).await?;

    let data = demo::dataset();
    println!("✓ {} cash register(s)", data.registers.len());
    println!("✓ {} cash movement(s)", data.movements.len());
    println!("✓ {} closing record(s)", data.closings.len());
    println!("✓ {} product(s)", data.products.len());
    println!("✓ {} stock movement(s)", data.stock_movements.len());
    println!("✓ {} ledger entr(ies)", data.finance.len());

    // Verify the open register reads back with its running balance
    println!();
    let open: Vec<CashRegister> = store
        .fetch_all(&FetchOptions::new().filter("status", FilterOp::Eq, "open"))
        .await?;
    for register in &open {
        let movements: Vec<CashMovement> = store
            .fetch_all(&FetchOptions::new().filter("register_id", FilterOp::Eq, register.id))
            .await?;
        println!(
            "  Open register #{} ({}): balance {}",
            register.id,
            register.date,
            running_balance(register.opening_amount, &movements)
        );
    }

    let low = store
        .fetch_all::<Product>(&FetchOptions::new())
        .await?
        .into_iter()
        .filter(is_low_stock)
        .count();
    println!("  Products at or below minimum stock: {}", low);

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
