//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                      - Home page data (featured, new arrivals, categories)
//! GET    /health                - Liveness check
//! GET    /health/ready          - Readiness check (pings the database)
//!
//! # Catalog
//! GET    /products              - Paginated catalog with filters and sorting
//! GET    /products/{slug}       - Product detail with related products
//!
//! # Cart (guest or customer, keyed by session)
//! GET    /cart                  - Cart contents with totals
//! GET    /cart/count            - Item count badge
//! POST   /cart/items            - Add a product (merges into existing line)
//! PATCH  /cart/items/{id}       - Change a line's quantity
//! DELETE /cart/items/{id}       - Remove a line
//!
//! # Checkout
//! GET    /checkout              - Quote: validated cart plus totals and saved addresses
//! POST   /checkout              - Place the order (rate limited)
//!
//! # Auth
//! POST   /auth/register         - Create an account and log in (rate limited)
//! POST   /auth/login            - Log in (rate limited)
//! POST   /auth/logout           - Destroy the session
//! GET    /auth/me               - Current customer
//!
//! # Account (requires auth)
//! GET    /orders                - Order history
//! GET    /orders/{id}           - Order detail with line items
//! GET    /addresses             - Saved addresses
//! POST   /addresses             - Add an address
//! PATCH  /addresses/{id}        - Update an address
//! DELETE /addresses/{id}        - Delete an address
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::middleware::{auth_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
///
/// Register and login sit behind the per-IP rate limiter; logout and
/// `/me` do not, so an authenticated client can poll its session freely.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update))
        .route("/items/{id}", delete(cart::remove))
}

/// Create the checkout routes router.
///
/// Only the order-placing POST is rate limited; the quote is a read.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route(
            "/",
            post(checkout::place_order).layer(checkout_rate_limiter()),
        )
}

/// Create the order history routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create the address book routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route("/{id}", patch(addresses::update))
        .route("/{id}", delete(addresses::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/orders", order_routes())
        .nest("/addresses", address_routes())
        .nest("/auth", auth_routes())
}
