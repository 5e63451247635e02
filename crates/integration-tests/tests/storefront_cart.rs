//! Integration tests for the guest cart and checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - A seeded catalog (cargo run -p techhub-cli -- seed)
//! - The storefront server running (cargo run -p techhub-storefront)
//!
//! Every test uses its own cookie jar, so carts never leak between tests.
//! Checkout tests decrement real stock; they buy one or two units of a
//! high-stock seed product and verify the decrement, so reruns keep working.
//!
//! Run with: cargo test -p techhub-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Value, json};

use techhub_integration_tests::{
    any_product_with_stock, client, post_json_rate_limited, postal_address, storefront_base_url,
};

/// Parse one of the API's decimal-string money fields.
fn money(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a money string: {value}"))
}

/// Add `quantity` units of a product to the client's cart.
async fn add_to_cart(client: &Client, product_id: &Value, quantity: i64) -> reqwest::Response {
    let base_url = storefront_base_url();
    client
        .post(format!("{base_url}/cart/items"))
        .json(&json!({ "product_id": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("Failed to add to cart")
}

/// Current stock of a product, read from its detail page.
async fn stock_of(client: &Client, slug: &str) -> i64 {
    let base_url = storefront_base_url();
    let detail: Value = client
        .get(format!("{base_url}/products/{slug}"))
        .send()
        .await
        .expect("Failed to fetch product detail")
        .json()
        .await
        .expect("Failed to parse product detail");
    detail["product"]["stock"].as_i64().expect("stock missing")
}

// ============================================================================
// Cart Lifecycle
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_cart_starts_empty() {
    let client = client();
    let base_url = storefront_base_url();

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to load cart")
        .json()
        .await
        .expect("Failed to parse cart");

    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(cart["item_count"], 0);
    assert_eq!(money(&cart["totals"]["subtotal"]), Decimal::ZERO);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_add_merges_lines_and_count_tracks_units() {
    let client = client();
    let base_url = storefront_base_url();
    let product = any_product_with_stock(&client, 5).await;

    let resp = add_to_cart(&client, &product["id"], 2).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Adding the same product again merges into the existing line.
    let resp = add_to_cart(&client, &product["id"], 1).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");

    let items = cart["items"].as_array().expect("items missing");
    assert_eq!(items.len(), 1, "second add must merge, not append");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(cart["item_count"], 3);

    let count: Value = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to load count")
        .json()
        .await
        .expect("Failed to parse count");
    assert_eq!(count["count"], 3);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_cart_totals_follow_pricing_rules() {
    let client = client();
    let product = any_product_with_stock(&client, 3).await;

    let resp = add_to_cart(&client, &product["id"], 3).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");

    let line = &cart["items"][0];
    let expected_subtotal = money(&line["price"]) * Decimal::from(3);
    assert_eq!(money(&line["line_total"]), expected_subtotal);

    let totals = &cart["totals"];
    let subtotal = money(&totals["subtotal"]);
    assert_eq!(subtotal, expected_subtotal);

    let expected_shipping = if subtotal >= Decimal::from(100) {
        Decimal::ZERO
    } else {
        Decimal::from(10)
    };
    assert_eq!(money(&totals["shipping"]), expected_shipping);

    // 8% tax, rounded half away from zero to cents.
    let expected_tax = (subtotal * Decimal::new(8, 2))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    assert_eq!(money(&totals["tax"]), expected_tax);
    assert_eq!(
        money(&totals["total"]),
        subtotal + expected_tax + expected_shipping
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_update_and_remove_line() {
    let client = client();
    let base_url = storefront_base_url();
    let product = any_product_with_stock(&client, 4).await;

    let cart: Value = add_to_cart(&client, &product["id"], 1)
        .await
        .json()
        .await
        .expect("Failed to parse cart");
    let line_id = cart["items"][0]["id"].clone();

    let resp = client
        .patch(format!("{base_url}/cart/items/{line_id}"))
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .expect("Failed to update line");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["items"][0]["quantity"], 4);

    let resp = client
        .delete(format!("{base_url}/cart/items/{line_id}"))
        .send()
        .await
        .expect("Failed to remove line");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

// ============================================================================
// Stock Guards & Validation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_stock_boundary_exact_then_one_over() {
    let client = client();
    let product = any_product_with_stock(&client, 2).await;
    let stock = product["stock"].as_i64().expect("stock missing");

    // Exactly the available stock is allowed.
    let resp = add_to_cart(&client, &product["id"], stock).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // One more unit (merged quantity stock + 1) is refused.
    let resp = add_to_cart(&client, &product["id"], 1).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("insufficient_stock".to_owned()));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_zero_quantity_is_a_field_error() {
    let client = client();
    let product = any_product_with_stock(&client, 1).await;

    let resp = add_to_cart(&client, &product["id"], 0).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("validation_failed".to_owned()));
    assert!(body["fields"]["quantity"].is_array());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_add_is_404() {
    let client = client();

    let resp = add_to_cart(&client, &json!(999_999_999), 1).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_foreign_cart_line_is_forbidden() {
    let owner = client();
    let intruder = client();
    let base_url = storefront_base_url();
    let product = any_product_with_stock(&owner, 2).await;

    let cart: Value = add_to_cart(&owner, &product["id"], 1)
        .await
        .json()
        .await
        .expect("Failed to parse cart");
    let line_id = cart["items"][0]["id"].clone();

    // A different session updating or deleting that line is refused.
    let resp = intruder
        .patch(format!("{base_url}/cart/items/{line_id}"))
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = intruder
        .delete(format!("{base_url}/cart/items/{line_id}"))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Nothing mutated for the owner.
    let cart: Value = owner
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to load cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["items"][0]["quantity"], 1);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_guest_checkout_places_order_and_decrements_stock() {
    let client = client();
    let base_url = storefront_base_url();
    let product = any_product_with_stock(&client, 3).await;
    let slug = product["slug"].as_str().expect("slug missing").to_owned();
    let stock_before = stock_of(&client, &slug).await;

    add_to_cart(&client, &product["id"], 2).await;

    // The quote prices the cart without side effects.
    let quote: Value = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to load checkout quote")
        .json()
        .await
        .expect("Failed to parse quote");
    let quoted_total = money(&quote["totals"]["total"]);
    assert_eq!(stock_of(&client, &slug).await, stock_before);

    let resp = post_json_rate_limited(
        &client,
        &format!("{base_url}/checkout"),
        &json!({
            "shipping_address": postal_address("Guest"),
            "payment_method": "credit_card",
            "guest_email": "guest-checkout@techhub.test",
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");

    // Totals identity and the pending starting status.
    assert!(
        order["order_number"]
            .as_str()
            .is_some_and(|n| n.starts_with("ORD-")),
        "unexpected order number: {}",
        order["order_number"]
    );
    assert_eq!(order["status"], Value::String("pending".to_owned()));
    assert_eq!(money(&order["total"]), quoted_total);
    assert_eq!(
        money(&order["total"]),
        money(&order["subtotal"]) + money(&order["tax"]) + money(&order["shipping"])
    );

    // Billing falls back to the shipping address when omitted.
    assert_eq!(order["billing_address"], order["shipping_address"]);

    // The snapshot captured the product as sold.
    let item = &order["items"][0];
    assert_eq!(item["quantity"], 2);
    assert_eq!(money(&item["price"]) * Decimal::from(2), money(&item["line_total"]));

    // Stock went down by the purchased quantity and the cart is empty.
    assert_eq!(stock_of(&client, &slug).await, stock_before - 2);
    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to load cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_empty_cart_checkout_is_refused() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = post_json_rate_limited(
        &client,
        &format!("{base_url}/checkout"),
        &json!({
            "shipping_address": postal_address("Nobody"),
            "payment_method": "credit_card",
            "guest_email": "empty-cart@techhub.test",
        }),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("empty_cart".to_owned()));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_guest_checkout_requires_contact_email() {
    let client = client();
    let base_url = storefront_base_url();
    let product = any_product_with_stock(&client, 1).await;

    add_to_cart(&client, &product["id"], 1).await;

    let resp = post_json_rate_limited(
        &client,
        &format!("{base_url}/checkout"),
        &json!({
            "shipping_address": postal_address("Guest"),
            "payment_method": "credit_card",
        }),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("validation_failed".to_owned()));
    assert!(body["fields"]["guest_email"].is_array());

    // Nothing was placed; the cart still holds the line.
    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to load cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded catalog"]
async fn test_checkout_rejects_incomplete_address() {
    let client = client();
    let base_url = storefront_base_url();
    let product = any_product_with_stock(&client, 1).await;

    add_to_cart(&client, &product["id"], 1).await;

    let mut address = postal_address("Guest");
    address["city"] = json!("");

    let resp = post_json_rate_limited(
        &client,
        &format!("{base_url}/checkout"),
        &json!({
            "shipping_address": address,
            "payment_method": "credit_card",
            "guest_email": "bad-address@techhub.test",
        }),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert!(body["fields"]["shipping_address.city"].is_array());
}
