//! Catalog reads for the storefront.
//!
//! Everything here is scoped to what a shopper may see: listing queries
//! only return active products, and lookups by slug ignore inactive rows.
//! The one exception is [`ProductRepository::find_by_id`], which the cart
//! needs so it can tell "never existed" apart from "no longer sold".

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use techhub_core::{CategoryId, Page, PageRequest, ProductId};

use super::RepositoryError;

/// Column list shared by every product query so row decoding stays in sync
/// with the [`Product`] struct.
const PRODUCT_COLUMNS: &str = "p.id, p.category_id, p.name, p.slug, p.sku, p.description, \
     p.brand, p.specs, p.price, p.compare_price, p.stock, p.primary_image, p.images, \
     p.is_active, p.is_featured, p.created_at, p.updated_at";

/// A catalog product as stored in `shop.products`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: String,
    pub brand: Option<String>,
    /// Free-form attribute map (JSONB), e.g. `{"cpu": "M3 Pro", "ram": "18GB"}`.
    pub specs: serde_json::Value,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub stock: i32,
    pub primary_image: Option<String>,
    /// Gallery image URLs (JSONB array of strings).
    pub images: serde_json::Value,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units could be sold right now.
    #[must_use]
    pub const fn can_fulfill(&self, quantity: i32) -> bool {
        self.is_active && self.stock >= quantity
    }
}

/// Sort orders accepted by the catalog listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    /// Newest arrivals first. The default.
    #[default]
    Latest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl CatalogSort {
    /// `ORDER BY` clause for this sort. Every variant carries a unique
    /// tiebreaker column so pagination stays stable across requests.
    const fn order_clause(self) -> &'static str {
        match self {
            Self::Latest => "p.created_at DESC, p.id DESC",
            Self::PriceAsc => "p.price ASC, p.slug ASC",
            Self::PriceDesc => "p.price DESC, p.slug ASC",
            Self::Name => "p.name ASC, p.slug ASC",
        }
    }
}

/// Filters for the catalog listing page.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Restrict to one category by slug. An unknown slug simply matches
    /// nothing rather than failing the request.
    pub category_slug: Option<String>,
    /// Case-insensitive substring match against name, description and brand.
    pub search: Option<String>,
    pub sort: CatalogSort,
    pub page: Option<u32>,
}

/// Read access to the live catalog.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Products shown per catalog page.
    pub const PAGE_SIZE: u32 = 12;

    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if either the count or the page
    /// query fails.
    pub async fn list(&self, query: &CatalogQuery) -> Result<Page<Product>, RepositoryError> {
        let request = PageRequest::new(query.page, Self::PAGE_SIZE);
        let pattern = query.search.as_ref().map(|term| format!("%{term}%"));

        let filter = "FROM shop.products p \
             JOIN shop.categories c ON c.id = p.category_id \
             WHERE p.is_active \
               AND ($1::text IS NULL OR c.slug = $1) \
               AND ($2::text IS NULL \
                    OR p.name ILIKE $2 OR p.description ILIKE $2 OR p.brand ILIKE $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {filter}"))
            .bind(query.category_slug.as_deref())
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} {filter} ORDER BY {order} LIMIT $3 OFFSET $4",
            order = query.sort.order_clause()
        );
        let items = sqlx::query_as::<_, Product>(&sql)
            .bind(query.category_slug.as_deref())
            .bind(pattern.as_deref())
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::from_query(items, request, total))
    }

    /// Active products flagged as featured, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products p \
             WHERE p.is_active AND p.is_featured \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $1"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// Most recently added active products.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn latest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products p \
             WHERE p.is_active \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $1"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// Look up one active product by slug.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM shop.products p WHERE p.slug = $1 AND p.is_active");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Look up a product by id regardless of active state.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.products p WHERE p.id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Other active products from the same category, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn related(
        &self,
        product: &Product,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products p \
             WHERE p.is_active AND p.category_id = $1 AND p.id <> $2 \
             ORDER BY p.created_at DESC, p.id DESC LIMIT $3"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(product.category_id)
            .bind(product.id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_product(stock: i32, is_active: bool) -> Product {
        Product {
            id: ProductId::new(1),
            category_id: CategoryId::new(1),
            name: "UltraBook Pro 16".to_owned(),
            slug: "ultrabook-pro-16".to_owned(),
            sku: "UBP-16-001".to_owned(),
            description: "16-inch workstation laptop".to_owned(),
            brand: Some("TechHub".to_owned()),
            specs: serde_json::json!({"ram": "32GB"}),
            price: Decimal::new(1299_00, 2),
            compare_price: None,
            stock,
            primary_image: None,
            images: serde_json::json!([]),
            is_active,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_can_fulfill_checks_stock_and_active() {
        assert!(sample_product(5, true).can_fulfill(5));
        assert!(!sample_product(4, true).can_fulfill(5));
        assert!(!sample_product(5, false).can_fulfill(1));
    }

    #[test]
    fn test_sort_parses_from_query_values() {
        let sort: CatalogSort = serde_json::from_str("\"price_asc\"").unwrap();
        assert_eq!(sort, CatalogSort::PriceAsc);
        let sort: CatalogSort = serde_json::from_str("\"latest\"").unwrap();
        assert_eq!(sort, CatalogSort::Latest);
        assert!(serde_json::from_str::<CatalogSort>("\"cheapest\"").is_err());
    }

    #[test]
    fn test_default_sort_is_latest() {
        assert_eq!(CatalogSort::default(), CatalogSort::Latest);
        assert_eq!(CatalogQuery::default().sort, CatalogSort::Latest);
    }

    #[test]
    fn test_every_sort_has_a_tiebreaker() {
        for sort in [
            CatalogSort::Latest,
            CatalogSort::PriceAsc,
            CatalogSort::PriceDesc,
            CatalogSort::Name,
        ] {
            let clause = sort.order_clause();
            assert!(clause.contains(", p."), "no tiebreaker in {clause:?}");
        }
    }
}
