//! Integration tests for the storefront catalog.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - A seeded catalog (cargo run -p techhub-cli -- seed)
//! - The storefront server running (cargo run -p techhub-storefront)
//!
//! Run with: cargo test -p techhub-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use techhub_integration_tests::{client, storefront_base_url};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_responses_carry_request_id_and_security_headers() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");

    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(
        resp.headers()
            .get("x-content-type-options")
            .and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
    assert_eq!(
        resp.headers()
            .get("x-frame-options")
            .and_then(|v| v.to_str().ok()),
        Some("DENY")
    );
}

// ============================================================================
// Home
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_home_page_sections() {
    let client = client();
    let base_url = storefront_base_url();

    let body: Value = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to load home page")
        .json()
        .await
        .expect("Failed to parse home page");

    let featured = body["featured"].as_array().expect("featured missing");
    assert!(!featured.is_empty(), "seed data has featured products");
    for card in featured {
        assert_eq!(card["is_featured"], Value::Bool(true));
    }

    assert!(body["new_arrivals"].as_array().is_some_and(|a| !a.is_empty()));
    assert!(body["categories"].as_array().is_some_and(|a| !a.is_empty()));
}

// ============================================================================
// Listing & Filters
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_catalog_listing_shape_and_pagination() {
    let client = client();
    let base_url = storefront_base_url();

    let body: Value = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse catalog");

    let products = &body["products"];
    assert_eq!(products["page"], 1);
    assert!(products["per_page"].as_u64().unwrap_or(0) > 0);
    assert!(products["total_items"].as_u64().unwrap_or(0) > 0);
    assert!(products["total_pages"].as_u64().unwrap_or(0) >= 1);

    let items = products["items"].as_array().expect("items missing");
    for card in items {
        assert!(card["slug"].is_string());
        assert!(card["price"].is_string(), "prices serialize as decimal strings");
    }

    // A page far past the end is valid and empty, not an error.
    let body: Value = client
        .get(format!("{base_url}/products?page=9999"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse catalog");
    assert_eq!(body["products"]["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_category_filter_and_search() {
    let client = client();
    let base_url = storefront_base_url();

    // Pick a real category slug from the navigation tree.
    let body: Value = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse catalog");
    let category_slug = body["categories"][0]["slug"]
        .as_str()
        .expect("no categories in navigation")
        .to_owned();

    let filtered: Value = client
        .get(format!("{base_url}/products?category={category_slug}"))
        .send()
        .await
        .expect("Failed to filter by category")
        .json()
        .await
        .expect("Failed to parse filtered catalog");
    assert_eq!(filtered["filters"]["category"], Value::String(category_slug));

    // Search echoes the term back and matches seeded brand text.
    let searched: Value = client
        .get(format!("{base_url}/products?q=aural"))
        .send()
        .await
        .expect("Failed to search")
        .json()
        .await
        .expect("Failed to parse search result");
    assert_eq!(searched["filters"]["q"], Value::String("aural".to_owned()));

    // A search nothing matches returns an empty page, not an error.
    let empty: Value = client
        .get(format!("{base_url}/products?q=zzzznothing"))
        .send()
        .await
        .expect("Failed to search")
        .json()
        .await
        .expect("Failed to parse empty search");
    assert_eq!(empty["products"]["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_sort_orders_price_ascending() {
    let client = client();
    let base_url = storefront_base_url();

    let body: Value = client
        .get(format!("{base_url}/products?sort=price_asc"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse catalog");

    let prices: Vec<f64> = body["products"]["items"]
        .as_array()
        .expect("items missing")
        .iter()
        .filter_map(|card| card["price"].as_str())
        .filter_map(|p| p.parse::<f64>().ok())
        .collect();

    assert!(prices.windows(2).all(|w| w[0] <= w[1]), "prices not ascending: {prices:?}");
}

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_product_detail_with_related() {
    let client = client();
    let base_url = storefront_base_url();

    let listing: Value = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse catalog");
    let slug = listing["products"]["items"][0]["slug"]
        .as_str()
        .expect("no products in catalog")
        .to_owned();

    let body: Value = client
        .get(format!("{base_url}/products/{slug}"))
        .send()
        .await
        .expect("Failed to fetch product detail")
        .json()
        .await
        .expect("Failed to parse product detail");

    assert_eq!(body["product"]["slug"], Value::String(slug.clone()));
    assert!(body["product"]["specs"].is_object());
    assert!(body["product"]["images"].is_array());
    assert!(body["category"]["slug"].is_string());

    let related = body["related"].as_array().expect("related missing");
    assert!(related.len() <= 4);
    assert!(
        related.iter().all(|card| card["slug"] != Value::String(slug.clone())),
        "related products must not include the product itself"
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_is_404() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/products/no-such-product"))
        .send()
        .await
        .expect("Failed to fetch product detail");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], Value::String("not_found".to_owned()));
}
