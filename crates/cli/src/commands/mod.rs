//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

/// Resolve the database connection string from the environment.
///
/// Prefers `DATABASE_URL`, then falls back to `STOREFRONT_DATABASE_URL`;
/// both server binaries point at the same database.
fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("STOREFRONT_DATABASE_URL"))
        .ok()
}
