//! HTTP route handlers for the admin API.
//!
//! Every route except login requires an admin session; the extractor
//! rejects anonymous requests with a 401 JSON body.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Readiness check (pings the database)
//!
//! # Auth
//! POST   /auth/login              - Staff login (admin role required)
//! POST   /auth/logout             - Destroy the session
//! GET    /auth/me                 - Current admin
//!
//! # Dashboard
//! GET    /dashboard               - Counters, recent orders, low stock
//!
//! # Catalog
//! GET    /products                - Paginated product table with search
//! POST   /products                - Create a product
//! GET    /products/{id}           - Product detail (inactive included)
//! PATCH  /products/{id}           - Replace a product's editable fields
//! DELETE /products/{id}           - Delete a product
//! GET    /categories              - Reference list for product forms
//!
//! # Orders
//! GET    /orders                  - Paginated order table with search
//! GET    /orders/{id}             - Order detail with items and customer
//! PATCH  /orders/{id}/status      - Set status (and optionally notes)
//! DELETE /orders/{id}             - Delete a cancelled order
//!
//! # Customers
//! GET    /customers               - Paginated customer table with search
//! GET    /customers/{id}          - Customer with orders and addresses
//! ```

pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/{id}", get(products::show))
        .route("/{id}", patch(products::update))
        .route("/{id}", delete(products::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", patch(orders::update_status))
        .route("/{id}", delete(orders::remove))
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index))
        .route("/{id}", get(customers::show))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::show))
        .route("/categories", get(categories::index))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/customers", customer_routes())
        .nest("/auth", auth_routes())
}
