//! Database operations for the admin panel.
//!
//! Both binaries share one `PostgreSQL` database (schema `shop`), but each
//! carries its own repository layer because the query shapes differ: the
//! storefront reads owner-scoped, active-only rows, while the back office
//! searches, paginates, and aggregates across everything.
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` (the schema is
//! shared) and run via:
//! ```bash
//! cargo run -p techhub-cli -- migrate
//! ```

pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use customers::CustomerRepository;
pub use dashboard::DashboardRepository;
pub use orders::OrderAdminRepository;
pub use products::ProductAdminRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A unique column already holds the submitted value.
    #[error("{field} has already been taken")]
    Duplicate {
        /// The user-facing field behind the violated constraint.
        field: &'static str,
    },

    /// A referenced row does not exist.
    #[error("{field} does not exist")]
    InvalidReference {
        /// The user-facing field behind the violated foreign key.
        field: &'static str,
    },
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
