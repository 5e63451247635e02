//! Integration tests for the back office: staff auth, the dashboard,
//! catalog management, order administration, and the customer directory.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - A seeded catalog (cargo run -p techhub-cli -- seed)
//! - The admin account from the setup instructions
//!   (cargo run -p techhub-cli -- admin create -e admin@techhub.test
//!   -n "Test Admin" -p admin-password)
//! - Both servers running (storefront for order placement)
//!
//! Products created here stay inactive so they never leak into the
//! storefront tests, and everything created gets deleted again.
//!
//! Run with: cargo test -p techhub-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use techhub_integration_tests::{
    admin_base_url, any_product_with_stock, client, login_admin, post_json_rate_limited,
    postal_address, register_customer, storefront_base_url, unique_email,
};

/// A fresh client that is already logged into the back office.
async fn admin_client() -> Client {
    let client = client();
    login_admin(&client).await;
    client
}

/// A product payload with a unique name and sku, inactive by default.
async fn product_payload(admin: &Client) -> Value {
    let base_url = admin_base_url();
    let categories: Vec<Value> = admin
        .get(format!("{base_url}/categories"))
        .send()
        .await
        .expect("Failed to list categories")
        .json()
        .await
        .expect("Failed to parse categories");
    let category_id = categories
        .first()
        .and_then(|c| c["id"].as_i64())
        .expect("no categories; run th-cli seed first");

    let tag = Uuid::new_v4().simple().to_string();
    json!({
        "category_id": category_id,
        "name": format!("Bench Rig {tag}"),
        "sku": format!("TH-TST-{tag}"),
        "description": "Created by the integration suite.",
        "price": "199.00",
        "stock": 5,
        "is_active": false,
    })
}

/// Create an inactive test product, returning its admin view.
async fn create_product(admin: &Client, payload: &Value) -> Value {
    let base_url = admin_base_url();
    let resp = admin
        .post(format!("{base_url}/products"))
        .json(payload)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED, "product create failed");
    resp.json().await.expect("Failed to parse product")
}

/// Delete a test product, tolerating nothing but success.
async fn delete_product(admin: &Client, id: &Value) {
    let base_url = admin_base_url();
    let resp = admin
        .delete(format!("{base_url}/products/{id}"))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

/// Place a one-line guest order through the storefront and return it.
async fn place_guest_order(storefront: &Client) -> Value {
    let base_url = storefront_base_url();
    let product = any_product_with_stock(storefront, 1).await;

    let resp = storefront
        .post(format!("{base_url}/cart/items"))
        .json(&json!({ "product_id": product["id"], "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = post_json_rate_limited(
        storefront,
        &format!("{base_url}/checkout"),
        &json!({
            "guest_email": unique_email("guest"),
            "shipping_address": postal_address("Guest"),
            "payment_method": "cash_on_delivery",
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED, "guest checkout failed");
    resp.json().await.expect("Failed to parse order")
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_login_me_logout_cycle() {
    let client = client();
    let base_url = admin_base_url();

    let admin = login_admin(&client).await;
    assert!(admin["email"].is_string());

    let me: Value = client
        .get(format!("{base_url}/auth/me"))
        .send()
        .await
        .expect("Failed to fetch admin session")
        .json()
        .await
        .expect("Failed to parse admin session");
    assert_eq!(me["email"], admin["email"]);

    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .send()
        .await
        .expect("Failed to fetch admin session");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_credentials_are_rejected() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": "nobody@techhub.test", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("invalid_credentials".to_owned()));
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers"]
async fn test_customer_accounts_have_no_back_office_access() {
    // A perfectly valid storefront account...
    let storefront = client();
    let user = register_customer(&storefront, "Shopper").await;
    let email = user["email"].as_str().expect("email missing");

    // ...is turned away by the back office even with the right password.
    let admin = client();
    let base_url = admin_base_url();
    let resp = admin
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": "integration-pass" }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("forbidden".to_owned()));
    assert_eq!(
        body["message"],
        Value::String("This account has no back-office access".to_owned())
    );
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_routes_require_session() {
    let client = client();
    let base_url = admin_base_url();

    for path in ["/dashboard", "/products", "/orders", "/customers", "/categories"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "expected 401 for {path}");
        let body: Value = resp.json().await.expect("Failed to parse error");
        assert_eq!(body["error"], Value::String("unauthenticated".to_owned()));
    }
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and seeded catalog"]
async fn test_dashboard_reports_store_counters() {
    let admin = admin_client().await;
    let base_url = admin_base_url();

    let dashboard: Value = admin
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to fetch dashboard")
        .json()
        .await
        .expect("Failed to parse dashboard");

    let stats = &dashboard["stats"];
    assert!(stats["total_products"].as_i64().expect("total_products missing") >= 1);
    assert!(stats["active_products"].as_i64().expect("active_products missing") >= 1);
    assert!(stats["total_customers"].as_i64().is_some());
    assert!(stats["pending_orders"].as_i64().is_some());
    assert!(stats["total_revenue"].is_string(), "revenue is a money string");

    assert!(dashboard["recent_orders"].is_array());
    for product in dashboard["low_stock"].as_array().expect("low_stock missing") {
        assert!(product["stock"].is_i64());
        assert!(product["sku"].is_string());
    }
}

// ============================================================================
// Catalog Management
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and seeded catalog"]
async fn test_product_crud_lifecycle() {
    let admin = admin_client().await;
    let base_url = admin_base_url();

    let payload = product_payload(&admin).await;
    let created = create_product(&admin, &payload).await;
    assert_eq!(created["name"], payload["name"]);
    assert_eq!(created["sku"], payload["sku"]);
    assert_eq!(created["is_active"], Value::Bool(false));
    assert_eq!(created["price"], Value::String("199.00".to_owned()));

    // The back office sees inactive products; the storefront does not.
    let detail: Value = admin
        .get(format!("{base_url}/products/{}", created["id"]))
        .send()
        .await
        .expect("Failed to fetch product")
        .json()
        .await
        .expect("Failed to parse product");
    assert_eq!(detail["id"], created["id"]);
    assert!(detail["category_name"].is_string());

    let slug = created["slug"].as_str().expect("slug missing");
    let storefront = client();
    let resp = storefront
        .get(format!("{}/products/{slug}", storefront_base_url()))
        .send()
        .await
        .expect("Failed to fetch storefront product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // A rename regenerates the slug.
    let mut update = payload.clone();
    let renamed = format!("{} Mk II", payload["name"].as_str().expect("name missing"));
    update["name"] = json!(renamed);
    update["stock"] = json!(9);
    let resp = admin
        .patch(format!("{base_url}/products/{}", created["id"]))
        .json(&update)
        .send()
        .await
        .expect("Failed to update product");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(updated["name"], Value::String(renamed));
    assert_ne!(updated["slug"], created["slug"]);
    assert!(updated["slug"].as_str().expect("slug missing").ends_with("-mk-ii"));
    assert_eq!(updated["stock"], json!(9));

    delete_product(&admin, &created["id"]).await;
    let resp = admin
        .get(format!("{base_url}/products/{}", created["id"]))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded catalog"]
async fn test_duplicate_sku_is_a_field_error() {
    let admin = admin_client().await;
    let base_url = admin_base_url();

    let payload = product_payload(&admin).await;
    let created = create_product(&admin, &payload).await;

    // Same sku, different name: the unique index answers.
    let mut clash = payload.clone();
    clash["name"] = json!(format!("{} Clone", payload["name"].as_str().expect("name missing")));
    let resp = admin
        .post(format!("{base_url}/products"))
        .json(&clash)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("validation_failed".to_owned()));
    assert_eq!(body["fields"]["sku"][0], json!("sku has already been taken"));

    delete_product(&admin, &created["id"]).await;
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_unknown_category_is_a_field_error() {
    let admin = admin_client().await;
    let base_url = admin_base_url();

    let mut payload = product_payload(&admin).await;
    payload["category_id"] = json!(999_999_999);
    let resp = admin
        .post(format!("{base_url}/products"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create product");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert!(body["fields"]["category_id"].is_array());
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_blank_product_form_collects_field_errors() {
    let admin = admin_client().await;
    let base_url = admin_base_url();

    let mut payload = product_payload(&admin).await;
    payload["name"] = json!("   ");
    payload["sku"] = json!("");
    payload["price"] = json!("-1.00");
    let resp = admin
        .post(format!("{base_url}/products"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create product");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert!(body["fields"]["name"].is_array());
    assert!(body["fields"]["sku"].is_array());
    assert!(body["fields"]["price"].is_array());
}

// ============================================================================
// Order Administration
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and admin servers with seeded catalog"]
async fn test_order_status_updates_and_cancelled_delete() {
    let storefront = client();
    let order = place_guest_order(&storefront).await;
    let order_number = order["order_number"].as_str().expect("order_number missing");

    let admin = admin_client().await;
    let base_url = admin_base_url();

    // The new order is searchable by its number.
    let found: Value = admin
        .get(format!("{base_url}/orders?search={order_number}"))
        .send()
        .await
        .expect("Failed to search orders")
        .json()
        .await
        .expect("Failed to parse orders");
    let rows = found["items"].as_array().expect("order rows missing");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["order_number"], order["order_number"]);
    assert_eq!(rows[0]["items_count"], json!(1));

    // Guest orders carry the contact email and no customer.
    let detail: Value = admin
        .get(format!("{base_url}/orders/{}", order["id"]))
        .send()
        .await
        .expect("Failed to fetch order")
        .json()
        .await
        .expect("Failed to parse order");
    assert_eq!(detail["status"], json!("pending"));
    assert!(detail["guest_email"].is_string());
    assert!(detail["customer"].is_null());

    // Move it along and attach a note.
    let resp = admin
        .patch(format!("{base_url}/orders/{}/status", order["id"]))
        .json(&json!({ "status": "processing", "notes": "called the customer" }))
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(updated["status"], json!("processing"));
    assert_eq!(updated["notes"], json!("called the customer"));

    // A live order cannot be deleted.
    let resp = admin
        .delete(format!("{base_url}/orders/{}", order["id"]))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("not_cancellable".to_owned()));

    // Cancel it, then deletion goes through. No note in the payload, so
    // the earlier one stays on the order.
    let resp = admin
        .patch(format!("{base_url}/orders/{}/status", order["id"]))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(resp.status(), StatusCode::OK);
    let cancelled: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(cancelled["notes"], json!("called the customer"));

    let resp = admin
        .delete(format!("{base_url}/orders/{}", order["id"]))
        .send()
        .await
        .expect("Failed to delete order");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = admin
        .get(format!("{base_url}/orders/{}", order["id"]))
        .send()
        .await
        .expect("Failed to fetch order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers with seeded catalog"]
async fn test_checkout_refused_when_product_sells_out() {
    let admin = admin_client().await;
    let admin_url = admin_base_url();

    // An active product with a single unit on the shelf.
    let mut payload = product_payload(&admin).await;
    payload["is_active"] = json!(true);
    payload["stock"] = json!(1);
    let created = create_product(&admin, &payload).await;

    // A shopper grabs it...
    let storefront = client();
    let base_url = storefront_base_url();
    let resp = storefront
        .post(format!("{base_url}/cart/items"))
        .json(&json!({ "product_id": created["id"], "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    // ...but the shelf empties before they pay.
    payload["stock"] = json!(0);
    let resp = admin
        .patch(format!("{admin_url}/products/{}", created["id"]))
        .json(&payload)
        .send()
        .await
        .expect("Failed to update stock");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = post_json_rate_limited(
        &storefront,
        &format!("{base_url}/checkout"),
        &json!({
            "guest_email": unique_email("guest"),
            "shipping_address": postal_address("Guest"),
            "payment_method": "credit_card",
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], Value::String("product_unavailable".to_owned()));

    // No order was placed and the cart still holds the line.
    let cart: Value = storefront
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to fetch cart")
        .json()
        .await
        .expect("Failed to parse cart");
    assert_eq!(cart["item_count"], json!(1));

    delete_product(&admin, &created["id"]).await;
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_unknown_order_is_404() {
    let admin = admin_client().await;
    let base_url = admin_base_url();

    let resp = admin
        .get(format!("{base_url}/orders/999999999"))
        .send()
        .await
        .expect("Failed to fetch order");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = admin
        .patch(format!("{base_url}/orders/999999999/status"))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Customer Directory
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and admin servers"]
async fn test_customer_directory_search_and_detail() {
    let storefront = client();
    let user = register_customer(&storefront, "Directory Tester").await;
    let email = user["email"].as_str().expect("email missing");

    let admin = admin_client().await;
    let base_url = admin_base_url();

    let found: Value = admin
        .get(format!("{base_url}/customers?search={email}"))
        .send()
        .await
        .expect("Failed to search customers")
        .json()
        .await
        .expect("Failed to parse customers");
    let rows = found["items"].as_array().expect("customer rows missing");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], user["email"]);
    assert_eq!(rows[0]["orders_count"], json!(0));

    let detail: Value = admin
        .get(format!("{base_url}/customers/{}", rows[0]["id"]))
        .send()
        .await
        .expect("Failed to fetch customer")
        .json()
        .await
        .expect("Failed to parse customer");
    assert_eq!(detail["email"], user["email"]);
    assert!(detail["recent_orders"].as_array().expect("orders missing").is_empty());
    assert!(detail["addresses"].as_array().expect("addresses missing").is_empty());

    let resp = admin
        .get(format!("{base_url}/customers/999999999"))
        .send()
        .await
        .expect("Failed to fetch customer");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
