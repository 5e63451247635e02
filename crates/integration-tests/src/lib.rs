//! Integration tests for TechHub Commerce.
//!
//! These tests drive the real binaries over HTTP and are `#[ignore]`-gated,
//! so a plain `cargo test` skips them.
//!
//! # Running Tests
//!
//! ```bash
//! # One-time setup against a scratch database
//! cargo run -p techhub-cli -- migrate
//! cargo run -p techhub-cli -- seed
//! cargo run -p techhub-cli -- admin create \
//!     -e admin@techhub.test -n "Test Admin" -p admin-password
//!
//! # Start both servers, then:
//! cargo test -p techhub-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - storefront base URL (default `http://localhost:3000`)
//! - `ADMIN_BASE_URL` - admin base URL (default `http://localhost:3001`)
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` - back-office credentials
//!   (defaults matching the setup above)

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Back-office credentials for the admin tests.
#[must_use]
pub fn admin_credentials() -> (String, String) {
    let email =
        std::env::var("TEST_ADMIN_EMAIL").unwrap_or_else(|_| "admin@techhub.test".to_string());
    let password =
        std::env::var("TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "admin-password".to_string());
    (email, password)
}

/// A client with its own cookie jar: one fresh browser per call.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email for registration tests.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@techhub.test", Uuid::new_v4())
}

/// POST JSON, waiting out the per-IP rate limiter when it answers 429.
///
/// The auth and checkout routes are rate limited and every test on one
/// machine shares the bucket, so a retry here keeps the suite
/// deterministic instead of order-dependent.
///
/// # Panics
///
/// Panics when the request cannot be sent or the limiter never releases.
pub async fn post_json_rate_limited(client: &Client, url: &str, body: &Value) -> reqwest::Response {
    for _ in 0..5 {
        let resp = client
            .post(url)
            .json(body)
            .send()
            .await
            .expect("Failed to send request");
        if resp.status() != StatusCode::TOO_MANY_REQUESTS {
            return resp;
        }
        tokio::time::sleep(std::time::Duration::from_secs(11)).await;
    }
    panic!("rate limiter never released {url}");
}

/// Register a fresh customer account; the client's cookie jar keeps the
/// session. Returns the created user view.
///
/// # Panics
///
/// Panics when registration does not answer 201 with a user body.
pub async fn register_customer(client: &Client, name: &str) -> Value {
    let base_url = storefront_base_url();
    let resp = post_json_rate_limited(
        client,
        &format!("{base_url}/auth/register"),
        &json!({
            "name": name,
            "email": unique_email("customer"),
            "password": "integration-pass",
        }),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED, "registration failed");
    resp.json().await.expect("Failed to parse user body")
}

/// Log the client into the back office. Returns the admin view.
///
/// # Panics
///
/// Panics when the login does not succeed; the admin account from the
/// setup instructions must exist.
pub async fn login_admin(client: &Client) -> Value {
    let base_url = admin_base_url();
    let (email, password) = admin_credentials();
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in admin");

    assert_eq!(
        resp.status(),
        StatusCode::OK,
        "admin login failed; run th-cli admin create first"
    );
    resp.json().await.expect("Failed to parse admin body")
}

/// A complete, valid postal address payload.
#[must_use]
pub fn postal_address(first_name: &str) -> Value {
    json!({
        "first_name": first_name,
        "last_name": "Tester",
        "address_line_1": "100 Market Street",
        "city": "Springfield",
        "state": "CA",
        "zip_code": "94105",
        "country": "US",
        "phone": "+1 555 0100",
    })
}

/// First catalog product (detail view) with at least `min_stock` units.
///
/// # Panics
///
/// Panics when the catalog has no such product; run `th-cli seed` first.
pub async fn any_product_with_stock(client: &Client, min_stock: i64) -> Value {
    let base_url = storefront_base_url();
    let listing: Value = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse catalog");

    let cards = listing
        .get("products")
        .and_then(|page| page.get("items"))
        .and_then(Value::as_array)
        .cloned()
        .expect("catalog items missing");

    for card in cards {
        let slug = card
            .get("slug")
            .and_then(Value::as_str)
            .expect("product slug missing");
        let detail: Value = client
            .get(format!("{base_url}/products/{slug}"))
            .send()
            .await
            .expect("Failed to fetch product detail")
            .json()
            .await
            .expect("Failed to parse product detail");

        let stock = detail
            .get("product")
            .and_then(|product| product.get("stock"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        if stock >= min_stock {
            return detail.get("product").cloned().unwrap_or(Value::Null);
        }
    }

    panic!("no product with stock >= {min_stock}; run th-cli seed first");
}
