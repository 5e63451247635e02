//! Catalog administration: full product CRUD.
//!
//! Unlike the storefront, these queries see inactive products too. Every
//! read joins the category so back-office tables can show its name without
//! a second query.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use techhub_core::{CategoryId, Page, PageRequest, ProductId};

use super::RepositoryError;

/// Column list shared by every product query so row decoding stays in sync
/// with the [`Product`] struct.
const PRODUCT_COLUMNS: &str = "p.id, p.category_id, c.name AS category_name, p.name, p.slug, \
     p.sku, p.description, p.brand, p.specs, p.price, p.compare_price, p.stock, \
     p.primary_image, p.images, p.is_active, p.is_featured, p.created_at, p.updated_at";

/// A product row joined with its category's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub brand: Option<String>,
    pub specs: serde_json::Value,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub stock: i32,
    pub primary_image: Option<String>,
    pub images: serde_json::Value,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The full field set written on create and update.
///
/// The slug is derived from the name by the caller, so a rename always
/// regenerates it.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub brand: Option<String>,
    pub specs: serde_json::Value,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub stock: i32,
    pub primary_image: Option<String>,
    pub images: serde_json::Value,
    pub is_active: bool,
    pub is_featured: bool,
}

/// Filters for the back-office product table.
#[derive(Debug, Clone, Default)]
pub struct ProductAdminQuery {
    /// Case-insensitive substring match against name, sku and brand.
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub page: Option<u32>,
}

/// Full catalog access for the back office.
pub struct ProductAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductAdminRepository<'a> {
    /// Products shown per back-office page.
    pub const PAGE_SIZE: u32 = 20;

    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if either the count or the page
    /// query fails.
    pub async fn list(&self, query: &ProductAdminQuery) -> Result<Page<Product>, RepositoryError> {
        let request = PageRequest::new(query.page, Self::PAGE_SIZE);
        let pattern = query.search.as_ref().map(|term| format!("%{term}%"));

        let filter = "FROM shop.products p \
             JOIN shop.categories c ON c.id = p.category_id \
             WHERE ($1::text IS NULL \
                    OR p.name ILIKE $1 OR p.sku ILIKE $1 OR p.brand ILIKE $1) \
               AND ($2::bigint IS NULL OR p.category_id = $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {filter}"))
            .bind(pattern.as_deref())
            .bind(query.category_id)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} {filter} \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern.as_deref())
            .bind(query.category_id)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::from_query(items, request, total))
    }

    /// Look up a product by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products p \
             JOIN shop.categories c ON c.id = p.category_id WHERE p.id = $1"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] when the sku or slug is
    /// already taken, [`RepositoryError::InvalidReference`] when the
    /// category does not exist.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            "INSERT INTO shop.products \
             (category_id, name, slug, sku, description, brand, specs, price, \
              compare_price, stock, primary_image, images, is_active, is_featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING id",
        )
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(input.brand.as_deref())
        .bind(&input.specs)
        .bind(input.price)
        .bind(input.compare_price)
        .bind(input.stock)
        .bind(input.primary_image.as_deref())
        .bind(&input.images)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.find_by_id(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("product {id} missing after insert"))
        })
    }

    /// Overwrite every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the id does not exist,
    /// otherwise the same mapping as [`Self::create`].
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let updated: Option<ProductId> = sqlx::query_scalar(
            "UPDATE shop.products SET \
             category_id = $2, name = $3, slug = $4, sku = $5, description = $6, \
             brand = $7, specs = $8, price = $9, compare_price = $10, stock = $11, \
             primary_image = $12, images = $13, is_active = $14, is_featured = $15, \
             updated_at = now() \
             WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(input.brand.as_deref())
        .bind(&input.specs)
        .bind(input.price)
        .bind(input.compare_price)
        .bind(input.stock)
        .bind(input.primary_image.as_deref())
        .bind(&input.images)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        let id = updated.ok_or(RepositoryError::NotFound)?;
        self.find_by_id(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("product {id} missing after update"))
        })
    }

    /// Delete a product.
    ///
    /// Order items keep their snapshot (the foreign key is nulled by the
    /// schema); cart lines referencing the product are dropped by cascade.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the id does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Translate constraint violations on product writes into field-level
/// errors. The constraint names come from the unique indexes and the
/// category foreign key in the migration.
fn map_write_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if constraint.contains("sku") {
                return RepositoryError::Duplicate { field: "sku" };
            }
            if constraint.contains("slug") {
                return RepositoryError::Duplicate { field: "slug" };
            }
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::InvalidReference {
                field: "category_id",
            };
        }
    }
    RepositoryError::Database(err)
}
