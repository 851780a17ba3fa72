//! # Seed Data Generator
//!
//! Populates a tenant with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default tenant
//! cargo run -p shelfkeep-db --bin seed
//!
//! # Specify database path and tenant
//! cargo run -p shelfkeep-db --bin seed -- --db ./data/shelfkeep.db --tenant <UUID>
//!
//! # Also record a few sample sales
//! cargo run -p shelfkeep-db --bin seed -- --with-sales
//! ```
//!
//! ## Generated Products
//! One product per stock type, so every conversion path can be tried:
//! - packet stock sold by packet or card
//! - carton stock sold by carton, packet or card
//! - a card-only product
//! - bottle stock

use std::env;
use std::sync::Arc;

use shelfkeep_core::catalog::ProductInput;
use shelfkeep_core::validation::validate_uuid;
use shelfkeep_core::{NoOpObserver, StockColumns, StockUnit, DEFAULT_TENANT_ID};
use shelfkeep_db::{Database, DbConfig};

const SEED_USER: &str = "seed";

fn demo_products() -> Vec<ProductInput> {
    let product = |name: &str,
                   category: &str,
                   stock_type: StockUnit,
                   stock_quantity: f64,
                   columns: StockColumns| ProductInput {
        name: name.to_string(),
        category: category.to_string(),
        stock_type: Some(stock_type),
        stock_quantity,
        columns,
        ..ProductInput::default()
    };

    vec![
        product(
            "Gold Leaf 20s",
            "Cigarettes",
            StockUnit::Packet,
            40.0,
            StockColumns {
                cards_per_packet: Some(20),
                price_per_packet: Some(450.0),
                price_per_card: Some(25.0),
                ..StockColumns::default()
            },
        ),
        product(
            "Capstan Carton",
            "Cigarettes",
            StockUnit::Carton,
            6.0,
            StockColumns {
                packets_per_carton: Some(10),
                cards_per_packet: Some(20),
                price_per_carton: Some(3800.0),
                price_per_packet: Some(400.0),
                price_per_card: Some(22.0),
                ..StockColumns::default()
            },
        ),
        product(
            "Rizla Papers",
            "Accessories",
            StockUnit::Card,
            120.0,
            StockColumns {
                price_per_card: Some(60.0),
                ..StockColumns::default()
            },
        ),
        product(
            "Al Fakher Mint",
            "Shisha",
            StockUnit::Bottle,
            12.0,
            StockColumns {
                price_per_bottle: Some(1500.0),
                ..StockColumns::default()
            },
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/shelfkeep.db");
    let mut tenant_id = String::from(DEFAULT_TENANT_ID);
    let mut with_sales = false;

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
            "--with-sales" => with_sales = true,
            "--help" | "-h" => {
                println!("Shelfkeep Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./data/shelfkeep.db)");
                println!("  -t, --tenant <UUID>   Tenant to seed (default: {})", DEFAULT_TENANT_ID);
                println!("      --with-sales      Record a sample sale against each product");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    validate_uuid("tenant", &tenant_id)?;

    println!("🌱 Shelfkeep Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Tenant:   {}", tenant_id);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count(&tenant_id).await?;
    if existing > 0 {
        println!("⚠ Tenant already has {} products", existing);
        println!("  Skipping seed to avoid restocking them.");
        return Ok(());
    }

    println!();
    println!("Creating products...");

    let ledger = db.ledger(Arc::new(NoOpObserver));
    for input in demo_products() {
        let product = match db
            .products()
            .create_or_restock(&tenant_id, Some(SEED_USER), &input)
            .await
        {
            Ok(outcome) => outcome.into_product(),
            Err(e) => {
                eprintln!("Failed to create {}: {}", input.name, e);
                continue;
            }
        };
        println!(
            "  {} ({} {})",
            product.name,
            product.stock_quantity,
            product.stock_type()
        );

        if with_sales {
            // Smallest sellable unit, so the sale exercises conversion
            let unit = shelfkeep_core::units::sale_units(&product.profile)
                .first()
                .copied()
                .unwrap_or(product.stock_type());
            match ledger
                .apply_sale(&tenant_id, SEED_USER, &product.id, 2.0, unit)
                .await
            {
                Ok(recorded) => println!(
                    "    sold 2 {} for {:.2}, {} left",
                    unit, recorded.sale.total_price, recorded.product.stock_quantity
                ),
                Err(e) => eprintln!("    sale failed: {}", e),
            }
        }
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
