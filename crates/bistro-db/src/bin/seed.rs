//! # Seed Data Generator
//!
//! Populates a database with a small working restaurant for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./bistro_dev.db
//! cargo run -p bistro-db --bin seed
//!
//! # Specify database path
//! cargo run -p bistro-db --bin seed -- --db ./data/bistro.db
//! ```
//!
//! ## Generated Data
//! - Tables 1-6 with 2, 4 or 6 seats
//! - Ingredients: flour, tomato sauce, mozzarella, mascarpone, espresso, ...
//! - Dishes with recipes, e.g. Margherita = 0.2 kg flour + 0.1 l sauce +
//!   0.15 kg mozzarella, 20 servings

use std::env;

use tracing_subscriber::EnvFilter;

use bistro_core::requests::{IngredientRequest, NewInventoryItem, NewMenuItem, NewTable};
use bistro_core::{MenuCategory, Principal, Quantity, Role, Unit};
use bistro_db::{BistroConfig, Catalog, Database, DbConfig};

/// (name, quantity in thousandths, unit)
const INGREDIENTS: &[(&str, i64, Unit)] = &[
    ("flour", 10_000, Unit::Kg),
    ("tomato sauce", 6_000, Unit::Litre),
    ("mozzarella", 4_000, Unit::Kg),
    ("basil", 300_000, Unit::G),
    ("mascarpone", 2_000, Unit::Kg),
    ("espresso", 1_500, Unit::Litre),
    ("ladyfingers", 120_000, Unit::Pcs),
    ("lemon", 40_000, Unit::Pcs),
];

/// (name, category, price in cents, stock, recipe as (ingredient, per serving in thousandths))
const DISHES: &[(&str, MenuCategory, i64, i64, &[(&str, i64)])] = &[
    (
        "Margherita",
        MenuCategory::Pizza,
        1250,
        20,
        &[("flour", 200), ("tomato sauce", 100), ("mozzarella", 150), ("basil", 5_000)],
    ),
    (
        "Marinara",
        MenuCategory::Pizza,
        990,
        20,
        &[("flour", 200), ("tomato sauce", 150)],
    ),
    (
        "Tiramisu",
        MenuCategory::Dessert,
        750,
        12,
        &[("mascarpone", 120), ("espresso", 50), ("ladyfingers", 4_000)],
    ),
    (
        "Lemonade",
        MenuCategory::Beverage,
        400,
        30,
        &[("lemon", 1_000)],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./bistro_dev.db");

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
                println!("Bistro Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./bistro_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bistro Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let limits = BistroConfig::load()?.limits;
    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let catalog = Catalog::new(db.clone(), limits);
    let existing = catalog.list_tables().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} tables", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let seeder = Principal::new("seed", Role::Admin);

    println!();
    println!("Creating tables...");
    for table_number in 1..=6 {
        let seats = [2, 4, 6][(table_number as usize - 1) % 3];
        catalog
            .create_table(&seeder, NewTable { table_number, seats })
            .await?;
    }

    println!("Creating ingredients...");
    for (name, quantity, unit) in INGREDIENTS {
        catalog
            .create_inventory_item(
                &seeder,
                NewInventoryItem {
                    name: name.to_string(),
                    quantity: Quantity::from_milli(*quantity),
                    unit: *unit,
                    threshold: None,
                },
            )
            .await?;
    }

    println!("Creating dishes...");
    for (name, category, price_cents, stock, recipe) in DISHES {
        let ingredients = recipe
            .iter()
            .map(|(ingredient, per_serving)| IngredientRequest {
                name: ingredient.to_string(),
                per_serving: Quantity::from_milli(*per_serving),
            })
            .collect();
        if let Err(e) = catalog
            .create_menu_item(
                &seeder,
                NewMenuItem {
                    name: name.to_string(),
                    description: String::new(),
                    category: *category,
                    price_cents: *price_cents,
                    ingredients,
                    stock: *stock,
                },
            )
            .await
        {
            eprintln!("Failed to insert {}: {}", name, e);
        }
    }

    println!();
    for table in catalog.list_tables().await? {
        println!("  Table {:>2}  {} seats", table.table_number, table.seats);
    }
    for item in catalog.list_inventory().await? {
        println!("  {:<14} {:>8} {}", item.name, item.quantity.to_string(), item.unit);
    }
    for dish in catalog.list_menu().await? {
        println!(
            "  {:<14} {:>8}  {} servings",
            dish.name,
            dish.price().to_string(),
            dish.stock
        );
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bistro=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
