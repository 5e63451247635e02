//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techhub_core::{CategoryId, Page, ProductId};

use crate::db::{
    CategoryRepository, ProductRepository,
    categories::{Category, CategoryNode},
    products::{CatalogQuery, CatalogSort, Product},
};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Related products shown on a product page.
const RELATED_LIMIT: i64 = 4;

// =============================================================================
// View Models
// =============================================================================

/// Product card for listing grids.
#[derive(Debug, Serialize)]
pub struct ProductCardView {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub primary_image: Option<String>,
    pub is_featured: bool,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            brand: product.brand.clone(),
            price: product.price,
            compare_price: product.compare_price,
            primary_image: product.primary_image.clone(),
            is_featured: product.is_featured,
            in_stock: product.stock > 0,
        }
    }
}

/// Full product data for the detail page.
#[derive(Debug, Serialize)]
pub struct ProductDetailView {
    pub id: ProductId,
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
    pub is_featured: bool,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            sku: product.sku.clone(),
            description: product.description.clone(),
            brand: product.brand.clone(),
            specs: product.specs.clone(),
            price: product.price,
            compare_price: product.compare_price,
            stock: product.stock,
            primary_image: product.primary_image.clone(),
            images: product.images.clone(),
            is_featured: product.is_featured,
        }
    }
}

/// A category reference for navigation and product pages.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

/// A top-level category with its children, for the storefront navigation.
#[derive(Debug, Serialize)]
pub struct CategoryTreeView {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub children: Vec<CategoryView>,
}

impl From<&CategoryNode> for CategoryTreeView {
    fn from(node: &CategoryNode) -> Self {
        Self {
            id: node.category.id,
            name: node.category.name.clone(),
            slug: node.category.slug.clone(),
            children: node.children.iter().map(CategoryView::from).collect(),
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Query parameters accepted by the catalog listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Category slug filter.
    pub category: Option<String>,
    /// Search term matched against name, description and brand.
    pub q: Option<String>,
    pub sort: Option<CatalogSort>,
    pub page: Option<u32>,
}

/// The filter set the page was rendered with, echoed back to the client.
#[derive(Debug, Serialize)]
pub struct AppliedFilters {
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: CatalogSort,
}

/// Catalog listing payload.
#[derive(Debug, Serialize)]
pub struct CatalogPageView {
    pub products: Page<ProductCardView>,
    pub categories: Vec<CategoryTreeView>,
    pub filters: AppliedFilters,
}

/// List the active catalog with filters, search, sort and pagination.
///
/// GET /products
///
/// # Errors
///
/// Returns `AppError` if the catalog cannot be loaded.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<CatalogPageView>> {
    let sort = params.sort.unwrap_or_default();
    let query = CatalogQuery {
        category_slug: params.category.clone(),
        search: params.q.clone(),
        sort,
        page: params.page,
    };

    let page = ProductRepository::new(state.pool()).list(&query).await?;
    let categories = state.category_tree().await?;

    Ok(Json(CatalogPageView {
        products: page.map(|p| ProductCardView::from(&p)),
        categories: categories.iter().map(CategoryTreeView::from).collect(),
        filters: AppliedFilters {
            category: params.category,
            q: params.q,
            sort,
        },
    }))
}

// =============================================================================
// Detail
// =============================================================================

/// Product detail payload.
#[derive(Debug, Serialize)]
pub struct ProductPageView {
    pub product: ProductDetailView,
    pub category: CategoryView,
    pub related: Vec<ProductCardView>,
}

/// Show an active product by slug, with its category and up to four
/// related products from the same category.
///
/// GET /products/{slug}
///
/// # Errors
///
/// Returns `AppError::NotFound` if no active product has this slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductPageView>> {
    let products = ProductRepository::new(state.pool());

    let product = products
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    // The category FK is NOT NULL, so a miss here is corrupt data.
    let category = CategoryRepository::new(state.pool())
        .find_by_id(product.category_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("category missing for product {slug}")))?;

    let related = products.related(&product, RELATED_LIMIT).await?;

    Ok(Json(ProductPageView {
        product: ProductDetailView::from(&product),
        category: CategoryView::from(&category),
        related: related.iter().map(ProductCardView::from).collect(),
    }))
}
