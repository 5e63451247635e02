//! Cart line storage.
//!
//! Every query filters on the full owner pair with `IS NOT DISTINCT FROM`,
//! so a customer scope can never see guest lines and vice versa.
//! [`CartRepository::line_exists`] is the one unscoped lookup; the service
//! uses it to tell another scope's line apart from a missing one.

use rust_decimal::Decimal;
use sqlx::PgPool;

use techhub_core::{CartItemId, CartScope, ProductId, pricing};

use super::RepositoryError;

/// A cart line joined with the current state of its product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub primary_image: Option<String>,
}

impl CartLine {
    /// Line total at the product's current price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        pricing::line_total(self.price, self.quantity)
    }
}

const CART_LINE_COLUMNS: &str = "ci.id, ci.product_id, ci.quantity, \
     p.name, p.slug, p.description, p.price, p.stock, p.is_active, p.primary_image";

const SCOPE_FILTER: &str =
    "ci.user_id IS NOT DISTINCT FROM $1 AND ci.cart_token IS NOT DISTINCT FROM $2";

/// Cart reads and writes, always scoped to one owner.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lines in the scope's cart, oldest first, joined with product state.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn items(&self, scope: &CartScope) -> Result<Vec<CartLine>, RepositoryError> {
        let (user_id, cart_token) = scope.owner_pair();
        let sql = format!(
            "SELECT {CART_LINE_COLUMNS} FROM shop.cart_items ci \
             JOIN shop.products p ON p.id = ci.product_id \
             WHERE {SCOPE_FILTER} \
             ORDER BY ci.created_at, ci.id"
        );
        let lines = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .bind(cart_token)
            .fetch_all(self.pool)
            .await?;
        Ok(lines)
    }

    /// One line by id, provided it belongs to the scope.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_id(
        &self,
        scope: &CartScope,
        line_id: CartItemId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let (user_id, cart_token) = scope.owner_pair();
        let sql = format!(
            "SELECT {CART_LINE_COLUMNS} FROM shop.cart_items ci \
             JOIN shop.products p ON p.id = ci.product_id \
             WHERE {SCOPE_FILTER} AND ci.id = $3"
        );
        let line = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .bind(cart_token)
            .bind(line_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(line)
    }

    /// Whether any cart line with this id exists, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn line_exists(&self, line_id: CartItemId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shop.cart_items WHERE id = $1)")
                .bind(line_id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// The scope's existing line for a product, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_line(
        &self,
        scope: &CartScope,
        product_id: ProductId,
    ) -> Result<Option<(CartItemId, i32)>, RepositoryError> {
        let (user_id, cart_token) = scope.owner_pair();
        let sql = format!(
            "SELECT ci.id, ci.quantity FROM shop.cart_items ci \
             WHERE {SCOPE_FILTER} AND ci.product_id = $3"
        );
        let line = sqlx::query_as::<_, (CartItemId, i32)>(&sql)
            .bind(user_id)
            .bind(cart_token)
            .bind(product_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(line)
    }

    /// Insert a new line for the scope.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the insert fails.
    pub async fn insert_line(
        &self,
        scope: &CartScope,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        let (user_id, cart_token) = scope.owner_pair();
        let id: CartItemId = sqlx::query_scalar(
            "INSERT INTO shop.cart_items (user_id, cart_token, product_id, quantity) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user_id)
        .bind(cart_token)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Set the quantity of a line the scope owns.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the scope has no such line,
    /// [`RepositoryError::Database`] for other failures.
    pub async fn set_quantity(
        &self,
        scope: &CartScope,
        line_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let (user_id, cart_token) = scope.owner_pair();
        let sql = format!(
            "UPDATE shop.cart_items ci SET quantity = $4, updated_at = now() \
             WHERE {SCOPE_FILTER} AND ci.id = $3"
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(cart_token)
            .bind(line_id)
            .bind(quantity)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line the scope owns.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the scope has no such line,
    /// [`RepositoryError::Database`] for other failures.
    pub async fn delete_line(
        &self,
        scope: &CartScope,
        line_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let (user_id, cart_token) = scope.owner_pair();
        let sql = format!("DELETE FROM shop.cart_items ci WHERE {SCOPE_FILTER} AND ci.id = $3");
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(cart_token)
            .bind(line_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Total units across the scope's cart. Empty carts count as zero.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn count(&self, scope: &CartScope) -> Result<i64, RepositoryError> {
        let (user_id, cart_token) = scope.owner_pair();
        let sql = format!(
            "SELECT COALESCE(SUM(ci.quantity), 0)::BIGINT FROM shop.cart_items ci \
             WHERE {SCOPE_FILTER}"
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(cart_token)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_uses_current_price() {
        let line = CartLine {
            id: CartItemId::new(1),
            product_id: ProductId::new(7),
            quantity: 3,
            name: "Wireless Mouse".to_owned(),
            slug: "wireless-mouse".to_owned(),
            description: "2.4GHz wireless mouse".to_owned(),
            price: Decimal::new(19_99, 2),
            stock: 40,
            is_active: true,
            primary_image: None,
        };
        assert_eq!(line.line_total(), Decimal::new(59_97, 2));
    }
}
