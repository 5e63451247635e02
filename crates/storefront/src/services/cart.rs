//! Cart operations with stock guards.
//!
//! Adding a product that is already in the cart merges into the existing
//! line, and the stock check always runs against the combined quantity. A
//! purchase the catalog could not fulfill is rejected here before anything
//! is written.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use techhub_core::{CartItemId, CartScope, ProductId, pricing};

use crate::db::RepositoryError;
use crate::db::cart::{CartLine, CartRepository};
use crate::db::products::{Product, ProductRepository};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No cart line with the requested id.
    #[error("cart item not found")]
    LineNotFound,

    /// The line exists but belongs to a different cart scope.
    #[error("cart item belongs to another cart")]
    Forbidden,

    /// No product with the requested id.
    #[error("product not found")]
    ProductNotFound,

    /// Product exists but is not currently sold.
    #[error("{name} is not available")]
    ProductUnavailable { name: String },

    /// Requested more units than are in stock.
    #[error("only {available} of {name} in stock")]
    InsufficientStock { name: String, available: i32 },

    /// Quantity below one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A cart with its lines and the totals a checkout would charge today.
#[derive(Debug, Clone)]
pub struct CartContents {
    pub lines: Vec<CartLine>,
    pub totals: pricing::OrderTotals,
}

impl CartContents {
    fn from_lines(lines: Vec<CartLine>) -> Self {
        let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();
        Self {
            lines,
            totals: pricing::OrderTotals::from_subtotal(subtotal),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart service.
pub struct CartService<'a> {
    cart: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// The scope's cart lines and totals.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the load fails.
    pub async fn contents(&self, scope: &CartScope) -> Result<CartContents, CartError> {
        let lines = self.cart.items(scope).await?;
        Ok(CartContents::from_lines(lines))
    }

    /// Total units in the scope's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the count fails.
    pub async fn count(&self, scope: &CartScope) -> Result<i64, CartError> {
        Ok(self.cart.count(scope).await?)
    }

    /// Add units of a product, merging into an existing line if present.
    /// The stock guard runs against the combined quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` for an unknown product,
    /// `CartError::ProductUnavailable` for an inactive one, and
    /// `CartError::InsufficientStock` when the combined quantity exceeds
    /// stock.
    pub async fn add_item(
        &self,
        scope: &CartScope,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;
        if !product.is_active {
            return Err(CartError::ProductUnavailable { name: product.name });
        }

        let existing = self.cart.find_line(scope, product_id).await?;
        let combined = existing.map_or(quantity, |(_, held)| held + quantity);
        ensure_stock(&product, combined)?;

        match existing {
            Some((line_id, _)) => {
                self.cart
                    .set_quantity(scope, line_id, combined)
                    .await
                    .map_err(line_not_found)?;
            }
            None => {
                self.cart.insert_line(scope, product_id, combined).await?;
            }
        }

        Ok(())
    }

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no such line exists,
    /// `CartError::Forbidden` if it belongs to another scope, and
    /// `CartError::InsufficientStock` when the product cannot cover the new
    /// quantity.
    pub async fn update_item(
        &self,
        scope: &CartScope,
        line_id: CartItemId,
        quantity: i32,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let Some(line) = self.cart.find_by_id(scope, line_id).await? else {
            return Err(self.missing_line_error(line_id).await);
        };
        if !line.is_active {
            return Err(CartError::ProductUnavailable { name: line.name });
        }
        if line.stock < quantity {
            return Err(CartError::InsufficientStock {
                name: line.name,
                available: line.stock,
            });
        }

        self.cart
            .set_quantity(scope, line_id, quantity)
            .await
            .map_err(line_not_found)?;

        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no such line exists and
    /// `CartError::Forbidden` if it belongs to another scope.
    pub async fn remove_item(
        &self,
        scope: &CartScope,
        line_id: CartItemId,
    ) -> Result<(), CartError> {
        match self.cart.delete_line(scope, line_id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(self.missing_line_error(line_id).await),
            Err(e) => Err(e.into()),
        }
    }

    /// Classify a scoped miss: the line is either someone else's or gone.
    async fn missing_line_error(&self, line_id: CartItemId) -> CartError {
        match self.cart.line_exists(line_id).await {
            Ok(true) => CartError::Forbidden,
            Ok(false) => CartError::LineNotFound,
            Err(e) => CartError::Repository(e),
        }
    }
}

/// Reject quantities the product cannot cover.
fn ensure_stock(product: &Product, requested: i32) -> Result<(), CartError> {
    if product.stock < requested {
        return Err(CartError::InsufficientStock {
            name: product.name.clone(),
            available: product.stock,
        });
    }
    Ok(())
}

fn line_not_found(e: RepositoryError) -> CartError {
    match e {
        RepositoryError::NotFound => CartError::LineNotFound,
        other => CartError::Repository(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use techhub_core::CategoryId;

    fn product(stock: i32) -> Product {
        Product {
            id: ProductId::new(1),
            category_id: CategoryId::new(1),
            name: "Mechanical Keyboard".to_owned(),
            slug: "mechanical-keyboard".to_owned(),
            sku: "KB-100".to_owned(),
            description: "Hot-swappable mechanical keyboard".to_owned(),
            brand: None,
            specs: serde_json::json!({}),
            price: Decimal::new(89_00, 2),
            compare_price: None,
            stock,
            primary_image: None,
            images: serde_json::json!([]),
            is_active: true,
            is_featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(quantity: i32, price: Decimal) -> CartLine {
        CartLine {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            quantity,
            name: "Mechanical Keyboard".to_owned(),
            slug: "mechanical-keyboard".to_owned(),
            description: "Hot-swappable mechanical keyboard".to_owned(),
            price,
            stock: 10,
            is_active: true,
            primary_image: None,
        }
    }

    #[test]
    fn test_ensure_stock_allows_exact_stock() {
        assert!(ensure_stock(&product(5), 5).is_ok());
    }

    #[test]
    fn test_ensure_stock_rejects_one_over() {
        let err = ensure_stock(&product(5), 6).unwrap_err();
        match err {
            CartError::InsufficientStock { available, .. } => assert_eq!(available, 5),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_contents_totals_follow_pricing_rules() {
        // 2 x 45.00 = 90.00 subtotal, below the free shipping threshold
        let contents = CartContents::from_lines(vec![line(2, Decimal::new(45_00, 2))]);
        assert_eq!(contents.totals.subtotal, Decimal::new(90_00, 2));
        assert_eq!(contents.totals.shipping, Decimal::new(10_00, 2));
        assert_eq!(contents.totals.tax, Decimal::new(7_20, 2));
        assert_eq!(contents.totals.total, Decimal::new(107_20, 2));
    }

    #[test]
    fn test_empty_cart_contents() {
        let contents = CartContents::from_lines(Vec::new());
        assert!(contents.is_empty());
        assert_eq!(contents.totals.subtotal, Decimal::new(0, 2));
    }

    #[test]
    fn test_line_not_found_mapping() {
        assert!(matches!(
            line_not_found(RepositoryError::NotFound),
            CartError::LineNotFound
        ));
        assert!(matches!(
            line_not_found(RepositoryError::Conflict("x".to_owned())),
            CartError::Repository(_)
        ));
    }
}
