//! Catalog seeding command.
//!
//! # Usage
//!
//! ```bash
//! th-cli seed
//! ```
//!
//! Inserts the six TechHub categories and a starter catalog of products.
//! Idempotent: every row is matched on slug, so re-running updates in place
//! and never duplicates.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `STOREFRONT_DATABASE_URL`)

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde_json::{Value, json};
use sqlx::PgPool;
use thiserror::Error;

use techhub_core::slugify;

/// Errors that can occur during seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// No database connection string in the environment.
    #[error("Missing environment variable: DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A product names a category absent from the category table below.
    #[error("Unknown category in seed data: {0}")]
    UnknownCategory(&'static str),
}

/// A category row to seed.
struct CategorySeed {
    name: &'static str,
    sort_order: i32,
}

/// A product row to seed. `category` is the category display name.
struct ProductSeed {
    category: &'static str,
    name: &'static str,
    sku: &'static str,
    brand: &'static str,
    description: &'static str,
    specs: Value,
    price: Decimal,
    compare_price: Option<Decimal>,
    stock: i32,
    featured: bool,
}

/// Seed the catalog.
///
/// # Errors
///
/// Returns `SeedError` when no connection string is configured or a write
/// fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Seeding categories...");
    let mut category_ids: HashMap<&'static str, i64> = HashMap::new();
    let category_seeds = categories();
    for category in &category_seeds {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO shop.categories (name, slug, sort_order) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO UPDATE \
             SET name = EXCLUDED.name, sort_order = EXCLUDED.sort_order, updated_at = now() \
             RETURNING id",
        )
        .bind(category.name)
        .bind(slugify(category.name))
        .bind(category.sort_order)
        .fetch_one(&pool)
        .await?;
        category_ids.insert(category.name, id);
    }

    tracing::info!("Seeding products...");
    let product_seeds = products();
    for product in &product_seeds {
        let category_id = category_ids
            .get(product.category)
            .copied()
            .ok_or(SeedError::UnknownCategory(product.category))?;

        let slug = slugify(product.name);
        let primary_image = format!("https://cdn.techhub.example/products/{slug}/main.jpg");
        let images = json!([
            primary_image,
            format!("https://cdn.techhub.example/products/{slug}/side.jpg"),
        ]);

        sqlx::query(
            "INSERT INTO shop.products \
             (category_id, name, slug, sku, description, brand, specs, price, \
              compare_price, stock, primary_image, images, is_active, is_featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE, $13) \
             ON CONFLICT (slug) DO UPDATE SET \
               category_id = EXCLUDED.category_id, \
               name = EXCLUDED.name, \
               sku = EXCLUDED.sku, \
               description = EXCLUDED.description, \
               brand = EXCLUDED.brand, \
               specs = EXCLUDED.specs, \
               price = EXCLUDED.price, \
               compare_price = EXCLUDED.compare_price, \
               stock = EXCLUDED.stock, \
               primary_image = EXCLUDED.primary_image, \
               images = EXCLUDED.images, \
               is_active = TRUE, \
               is_featured = EXCLUDED.is_featured, \
               updated_at = now()",
        )
        .bind(category_id)
        .bind(product.name)
        .bind(&slug)
        .bind(product.sku)
        .bind(product.description)
        .bind(product.brand)
        .bind(&product.specs)
        .bind(product.price)
        .bind(product.compare_price)
        .bind(product.stock)
        .bind(&primary_image)
        .bind(&images)
        .bind(product.featured)
        .execute(&pool)
        .await?;
    }

    tracing::info!(
        "Seed complete: {} categories, {} products",
        category_seeds.len(),
        product_seeds.len()
    );
    Ok(())
}

/// The six top-level TechHub categories, in display order.
fn categories() -> Vec<CategorySeed> {
    [
        "Laptops & Computers",
        "Smartphones & Tablets",
        "Audio & Headphones",
        "Gaming",
        "Wearables & Smartwatches",
        "Accessories",
    ]
    .into_iter()
    .enumerate()
    .map(|(i, name)| CategorySeed {
        name,
        sort_order: i32::try_from(i).unwrap_or(0) * 10,
    })
    .collect()
}

/// Starter catalog: two products per category.
#[allow(clippy::too_many_lines)]
fn products() -> Vec<ProductSeed> {
    vec![
        ProductSeed {
            category: "Laptops & Computers",
            name: "Volt 14 Ultrabook",
            sku: "TH-LAP-0014",
            brand: "Voltaic",
            description: "Thin-and-light 14-inch ultrabook with an all-day \
                          battery and a 120Hz display.",
            specs: json!({
                "cpu": "8-core 3.8GHz",
                "ram": "16GB",
                "storage": "512GB NVMe SSD",
                "display": "14\" 2880x1800 120Hz",
                "weight": "1.2kg"
            }),
            price: Decimal::new(129_900, 2),
            compare_price: Some(Decimal::new(149_900, 2)),
            stock: 25,
            featured: true,
        },
        ProductSeed {
            category: "Laptops & Computers",
            name: "Helios 16 Creator Laptop",
            sku: "TH-LAP-0016",
            brand: "Helios",
            description: "16-inch creator laptop with a color-accurate panel \
                          and discrete graphics for heavy editing work.",
            specs: json!({
                "cpu": "12-core 4.2GHz",
                "ram": "32GB",
                "storage": "1TB NVMe SSD",
                "display": "16\" 3840x2400, 100% DCI-P3",
                "gpu": "8GB discrete"
            }),
            price: Decimal::new(219_900, 2),
            compare_price: None,
            stock: 12,
            featured: false,
        },
        ProductSeed {
            category: "Smartphones & Tablets",
            name: "Nova X5 Smartphone",
            sku: "TH-PHN-0105",
            brand: "Novatel",
            description: "Flagship 6.4-inch phone with a triple camera array \
                          and two-day battery life.",
            specs: json!({
                "display": "6.4\" OLED 120Hz",
                "storage": "256GB",
                "camera": "50MP + 12MP + 10MP",
                "battery": "5000mAh",
                "connectivity": "5G, Wi-Fi 7"
            }),
            price: Decimal::new(89_900, 2),
            compare_price: Some(Decimal::new(99_900, 2)),
            stock: 48,
            featured: true,
        },
        ProductSeed {
            category: "Smartphones & Tablets",
            name: "Slate 11 Tablet",
            sku: "TH-TAB-0111",
            brand: "Slateworks",
            description: "11-inch tablet with stylus support, built for \
                          sketching and split-screen reading.",
            specs: json!({
                "display": "11\" 2560x1600",
                "storage": "128GB",
                "battery": "10 hours",
                "stylus": "included"
            }),
            price: Decimal::new(54_900, 2),
            compare_price: None,
            stock: 30,
            featured: false,
        },
        ProductSeed {
            category: "Audio & Headphones",
            name: "Aural Pro ANC Headphones",
            sku: "TH-AUD-0201",
            brand: "Aural",
            description: "Over-ear headphones with adaptive noise cancelling \
                          and 40-hour playback.",
            specs: json!({
                "driver": "40mm dynamic",
                "anc": "adaptive hybrid",
                "battery": "40 hours",
                "codecs": ["SBC", "AAC", "LDAC"]
            }),
            price: Decimal::new(34_900, 2),
            compare_price: Some(Decimal::new(39_900, 2)),
            stock: 60,
            featured: true,
        },
        ProductSeed {
            category: "Audio & Headphones",
            name: "Pulse Mini Earbuds",
            sku: "TH-AUD-0202",
            brand: "Aural",
            description: "Compact true-wireless earbuds with wireless \
                          charging case and IPX5 water resistance.",
            specs: json!({
                "driver": "10mm dynamic",
                "battery": "6 + 24 hours",
                "water_resistance": "IPX5"
            }),
            price: Decimal::new(12_900, 2),
            compare_price: None,
            stock: 150,
            featured: false,
        },
        ProductSeed {
            category: "Gaming",
            name: "Raptor Wireless Controller",
            sku: "TH-GAM-0301",
            brand: "Raptor",
            description: "Low-latency wireless controller with hall-effect \
                          sticks and remappable back paddles.",
            specs: json!({
                "connection": "2.4GHz + Bluetooth",
                "battery": "30 hours",
                "sticks": "hall-effect",
                "paddles": 2
            }),
            price: Decimal::new(6_900, 2),
            compare_price: None,
            stock: 200,
            featured: false,
        },
        ProductSeed {
            category: "Gaming",
            name: "Vanguard Mechanical Keyboard",
            sku: "TH-GAM-0302",
            brand: "Vanguard",
            description: "Hot-swappable tenkeyless mechanical keyboard with \
                          PBT keycaps and tri-mode connectivity.",
            specs: json!({
                "layout": "tenkeyless",
                "switches": "hot-swappable linear",
                "keycaps": "PBT double-shot",
                "connection": "USB-C, 2.4GHz, Bluetooth"
            }),
            price: Decimal::new(15_900, 2),
            compare_price: Some(Decimal::new(18_900, 2)),
            stock: 85,
            featured: true,
        },
        ProductSeed {
            category: "Wearables & Smartwatches",
            name: "Stride S2 Smartwatch",
            sku: "TH-WER-0401",
            brand: "Stride",
            description: "Fitness-first smartwatch with dual-band GPS, sleep \
                          tracking, and a week of battery.",
            specs: json!({
                "display": "1.43\" AMOLED",
                "gps": "dual-band",
                "battery": "7 days",
                "water_resistance": "5ATM"
            }),
            price: Decimal::new(29_900, 2),
            compare_price: Some(Decimal::new(34_900, 2)),
            stock: 70,
            featured: true,
        },
        ProductSeed {
            category: "Wearables & Smartwatches",
            name: "Track Band 3",
            sku: "TH-WER-0402",
            brand: "Stride",
            description: "Slim activity band with heart-rate tracking and \
                          two weeks of battery.",
            specs: json!({
                "display": "1.1\" OLED",
                "battery": "14 days",
                "sensors": ["heart rate", "SpO2", "accelerometer"]
            }),
            price: Decimal::new(7_900, 2),
            compare_price: None,
            stock: 120,
            featured: false,
        },
        ProductSeed {
            category: "Accessories",
            name: "Surge 100W GaN Charger",
            sku: "TH-ACC-0501",
            brand: "Surge",
            description: "Palm-sized 100W GaN wall charger that fast-charges \
                          a laptop and two phones at once.",
            specs: json!({
                "output": "100W total",
                "ports": "2x USB-C, 1x USB-A",
                "technology": "GaN"
            }),
            price: Decimal::new(5_900, 2),
            compare_price: None,
            stock: 300,
            featured: false,
        },
        ProductSeed {
            category: "Accessories",
            name: "Atlas USB-C Hub",
            sku: "TH-ACC-0502",
            brand: "Atlas",
            description: "Aluminum 8-in-1 USB-C hub with 4K HDMI, gigabit \
                          ethernet, and 100W passthrough.",
            specs: json!({
                "ports": "HDMI 4K60, 2x USB-A, USB-C data, SD, microSD, ethernet",
                "passthrough": "100W",
                "body": "aluminum"
            }),
            price: Decimal::new(8_900, 2),
            compare_price: Some(Decimal::new(10_900, 2)),
            stock: 140,
            featured: false,
        },
    ]
}
