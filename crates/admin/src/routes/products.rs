//! Catalog management route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techhub_core::{CategoryId, Page, ProductId, ValidationErrors, slugify};

use crate::db::{
    ProductAdminRepository,
    products::{Product, ProductAdminQuery, ProductInput},
};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Longest accepted product name.
const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted SKU.
const MAX_SKU_LENGTH: usize = 64;

// =============================================================================
// View Models
// =============================================================================

/// A product as shown in the back office, inactive rows included.
#[derive(Debug, Serialize)]
pub struct ProductAdminView {
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

impl From<&Product> for ProductAdminView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            category_name: product.category_name.clone(),
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
            is_active: product.is_active,
            is_featured: product.is_featured,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Product form payload for create and update.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub category_id: CategoryId,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: String,
    pub brand: Option<String>,
    /// Free-form spec map ({} when omitted).
    #[serde(default = "default_specs")]
    pub specs: serde_json::Value,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub stock: i32,
    pub primary_image: Option<String>,
    /// Gallery image URLs ([] when omitted).
    #[serde(default = "default_images")]
    pub images: serde_json::Value,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

fn default_specs() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_images() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

const fn default_true() -> bool {
    true
}

impl ProductPayload {
    /// Validate the form fields and convert into the repository input.
    ///
    /// The slug is derived from the name here, so renames regenerate it.
    /// Uniqueness of sku and slug stays with the database; violations come
    /// back as field errors through the repository's write mapping.
    fn validated(self) -> Result<ProductInput> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim().to_owned();
        if name.is_empty() {
            errors.add("name", "is required");
        } else if name.len() > MAX_NAME_LENGTH {
            errors.add("name", format!("must be at most {MAX_NAME_LENGTH} characters"));
        }

        let slug = slugify(&name);
        if !name.is_empty() && slug.is_empty() {
            errors.add("name", "must contain letters or numbers");
        }

        let sku = self.sku.trim().to_owned();
        if sku.is_empty() {
            errors.add("sku", "is required");
        } else if sku.len() > MAX_SKU_LENGTH {
            errors.add("sku", format!("must be at most {MAX_SKU_LENGTH} characters"));
        }

        if self.price < Decimal::ZERO {
            errors.add("price", "must not be negative");
        }
        if let Some(compare) = self.compare_price
            && compare < Decimal::ZERO
        {
            errors.add("compare_price", "must not be negative");
        }
        if self.stock < 0 {
            errors.add("stock", "must not be negative");
        }
        if !self.specs.is_object() {
            errors.add("specs", "must be an object");
        }
        if !self.images.is_array() {
            errors.add("images", "must be an array");
        }

        errors.into_result()?;

        Ok(ProductInput {
            category_id: self.category_id,
            name,
            slug,
            sku,
            description: self.description,
            brand: self.brand.filter(|b| !b.trim().is_empty()),
            specs: self.specs,
            price: self.price,
            compare_price: self.compare_price,
            stock: self.stock,
            primary_image: self.primary_image.filter(|i| !i.trim().is_empty()),
            images: self.images,
            is_active: self.is_active,
            is_featured: self.is_featured,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Search and pagination parameters for the product table.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub page: Option<u32>,
}

/// List products, newest first.
///
/// GET /products
///
/// # Errors
///
/// Returns `AppError` if the list query fails.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<ProductAdminView>>> {
    let query = ProductAdminQuery {
        search: params.search.filter(|s| !s.trim().is_empty()),
        category_id: params.category_id,
        page: params.page,
    };

    let page = ProductAdminRepository::new(state.pool()).list(&query).await?;
    Ok(Json(page.map(|product| ProductAdminView::from(&product))))
}

/// Show one product, active or not.
///
/// GET /products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` when the id does not exist.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductAdminView>> {
    let product = ProductAdminRepository::new(state.pool())
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    Ok(Json(ProductAdminView::from(&product)))
}

/// Add a product to the catalog.
///
/// POST /products
///
/// # Errors
///
/// Returns `AppError::Validation` on bad fields, including a duplicate
/// sku or slug and an unknown category.
#[instrument(skip(state, admin, payload))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<ProductAdminView>)> {
    let input = payload.validated()?;
    let product = ProductAdminRepository::new(state.pool())
        .create(&input)
        .await?;

    tracing::info!(admin_id = %admin.id, product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(ProductAdminView::from(&product))))
}

/// Replace every editable field of a product.
///
/// PATCH /products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` when the id does not exist, otherwise the
/// same validation behavior as [`create`].
#[instrument(skip(state, admin, payload))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(product_id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductAdminView>> {
    let input = payload.validated()?;
    let product = ProductAdminRepository::new(state.pool())
        .update(product_id, &input)
        .await?;

    tracing::info!(admin_id = %admin.id, product_id = %product.id, "product updated");
    Ok(Json(ProductAdminView::from(&product)))
}

/// Remove a product from the catalog.
///
/// DELETE /products/{id}
///
/// Existing order lines keep their snapshots; cart lines holding the
/// product are dropped.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the id does not exist.
#[instrument(skip(state, admin))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductAdminRepository::new(state.pool())
        .delete(product_id)
        .await?;

    add_breadcrumb(
        "catalog",
        "Deleted product",
        Some(&[("product_id", &product_id.to_string())]),
    );
    tracing::info!(admin_id = %admin.id, product_id = %product_id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload() -> ProductPayload {
        ProductPayload {
            category_id: CategoryId::new(1),
            name: "Nimbus X1 Laptop".to_owned(),
            sku: "NIM-X1-512".to_owned(),
            description: "Thin and light.".to_owned(),
            brand: Some("Nimbus".to_owned()),
            specs: serde_json::json!({"ram": "16 GB"}),
            price: Decimal::new(129_900, 2),
            compare_price: None,
            stock: 25,
            primary_image: None,
            images: serde_json::json!([]),
            is_active: true,
            is_featured: false,
        }
    }

    #[test]
    fn test_valid_payload_derives_slug() {
        let input = payload().validated().unwrap();
        assert_eq!(input.slug, "nimbus-x1-laptop");
        assert_eq!(input.sku, "NIM-X1-512");
    }

    #[test]
    fn test_rename_regenerates_slug() {
        let mut renamed = payload();
        renamed.name = "Nimbus X2 Laptop".to_owned();
        let input = renamed.validated().unwrap();
        assert_eq!(input.slug, "nimbus-x2-laptop");
    }

    #[test]
    fn test_blank_name_and_sku_rejected() {
        let mut bad = payload();
        bad.name = "   ".to_owned();
        bad.sku = String::new();

        let errors = match bad.validated() {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        };
        assert!(errors.fields().contains_key("name"));
        assert!(errors.fields().contains_key("sku"));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut bad = payload();
        bad.price = Decimal::new(-1, 2);
        bad.compare_price = Some(Decimal::new(-500, 2));
        bad.stock = -3;

        let errors = match bad.validated() {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        };
        assert!(errors.fields().contains_key("price"));
        assert!(errors.fields().contains_key("compare_price"));
        assert!(errors.fields().contains_key("stock"));
    }

    #[test]
    fn test_symbol_only_name_cannot_slug() {
        let mut bad = payload();
        bad.name = "!!!".to_owned();

        let errors = match bad.validated() {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        };
        assert_eq!(
            errors.fields().get("name"),
            Some(&vec!["must contain letters or numbers".to_string()])
        );
    }

    #[test]
    fn test_blank_brand_and_image_become_none() {
        let mut blankish = payload();
        blankish.brand = Some("  ".to_owned());
        blankish.primary_image = Some(String::new());

        let input = blankish.validated().unwrap();
        assert_eq!(input.brand, None);
        assert_eq!(input.primary_image, None);
    }
}
