//! Category reference reads.
//!
//! Categories are seeded data with no back-office CRUD; the product form
//! only needs id/name pairs to populate its select box.

use sqlx::PgPool;

use techhub_core::CategoryId;

use super::RepositoryError;

/// A category option for product forms.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
}

/// Read access to the category reference list.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn list(&self) -> Result<Vec<CategoryOption>, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryOption>(
            "SELECT id, name FROM shop.categories ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }
}
