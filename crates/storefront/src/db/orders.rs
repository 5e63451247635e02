//! Order storage and the order placement transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use techhub_core::{
    CartItemId, OrderId, OrderItemId, OrderNumber, OrderStatus, Page, PageRequest, PaymentMethod,
    PostalAddress, ProductId, ProductSnapshot, UserId,
    pricing::OrderTotals,
};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, user_id, order_number, status, subtotal, tax, shipping, total, \
     shipping_address, billing_address, payment_method, guest_email, notes, \
     created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, quantity, unit_price, line_total, product_snapshot, created_at";

/// An order header as stored in `shop.orders`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    #[sqlx(json)]
    pub shipping_address: PostalAddress,
    #[sqlx(json)]
    pub billing_address: PostalAddress,
    pub payment_method: PaymentMethod,
    pub guest_email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line as stored in `shop.order_items`.
///
/// `product_id` is informational and may be null once the product is gone;
/// the snapshot carries what the order looked like at purchase time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    #[sqlx(json)]
    pub product_snapshot: ProductSnapshot,
    pub created_at: DateTime<Utc>,
}

/// Compact order row for the customer's order history.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to persist one order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub totals: OrderTotals,
    pub shipping_address: PostalAddress,
    pub billing_address: PostalAddress,
    pub payment_method: PaymentMethod,
    pub guest_email: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

/// One order line, priced and snapshotted before the transaction starts.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    /// Cart line this order line was built from, removed on success.
    pub cart_item_id: CartItemId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub snapshot: ProductSnapshot,
}

/// Failure modes of [`OrderRepository::place`].
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// A product sold out between validation and the stock decrement.
    /// Nothing was persisted.
    #[error("insufficient stock for {name}")]
    InsufficientStock { name: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Order reads and the placement transaction.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Orders shown per history page.
    pub const PAGE_SIZE: u32 = 10;

    /// How many times to draw a fresh order number before giving up.
    const MAX_NUMBER_ATTEMPTS: u32 = 5;

    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order in one transaction.
    ///
    /// Stock is decremented with a guarded `UPDATE ... WHERE stock >= qty`.
    /// A line whose decrement matches no row means someone else bought the
    /// remaining units first; the whole transaction rolls back and stock is
    /// left untouched. On success the originating cart lines are deleted.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceOrderError::InsufficientStock`] when a decrement
    /// fails, [`PlaceOrderError::Repository`] for database failures or when
    /// no free order number could be found.
    pub async fn place(
        &self,
        new: &NewOrder,
    ) -> Result<(Order, Vec<OrderItem>), PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let order_number = allocate_order_number(&mut tx, Self::MAX_NUMBER_ATTEMPTS).await?;

        let sql = format!(
            "INSERT INTO shop.orders \
             (user_id, order_number, subtotal, tax, shipping, total, \
              shipping_address, billing_address, payment_method, guest_email, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(new.user_id)
            .bind(&order_number)
            .bind(new.totals.subtotal)
            .bind(new.totals.tax)
            .bind(new.totals.shipping)
            .bind(new.totals.total)
            .bind(sqlx::types::Json(&new.shipping_address))
            .bind(sqlx::types::Json(&new.billing_address))
            .bind(new.payment_method)
            .bind(new.guest_email.as_deref())
            .bind(new.notes.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        let mut items = Vec::with_capacity(new.lines.len());
        for line in &new.lines {
            let decremented = sqlx::query(
                "UPDATE shop.products SET stock = stock - $2, updated_at = now() \
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                return Err(PlaceOrderError::InsufficientStock {
                    name: line.snapshot.name.clone(),
                });
            }

            let sql = format!(
                "INSERT INTO shop.order_items \
                 (order_id, product_id, quantity, unit_price, line_total, product_snapshot) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING {ORDER_ITEM_COLUMNS}"
            );
            let item = sqlx::query_as::<_, OrderItem>(&sql)
                .bind(order.id)
                .bind(line.product_id)
                .bind(line.quantity)
                .bind(line.unit_price)
                .bind(line.line_total)
                .bind(sqlx::types::Json(&line.snapshot))
                .fetch_one(&mut *tx)
                .await?;
            items.push(item);
        }

        // Delete exactly the lines this order consumed. Lines added to the
        // cart while the transaction ran survive.
        let consumed: Vec<i64> = new.lines.iter().map(|l| l.cart_item_id.as_i64()).collect();
        sqlx::query("DELETE FROM shop.cart_items WHERE id = ANY($1)")
            .bind(&consumed)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((order, items))
    }

    /// The customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if either query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: Option<u32>,
    ) -> Result<Page<OrderSummary>, RepositoryError> {
        let request = PageRequest::new(page, Self::PAGE_SIZE);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let summaries = sqlx::query_as::<_, OrderSummary>(
            "SELECT o.id, o.order_number, o.status, o.total, \
                    (SELECT COUNT(*) FROM shop.order_items oi WHERE oi.order_id = o.id) \
                        AS items_count, \
                    o.created_at \
             FROM shop.orders o \
             WHERE o.user_id = $1 \
             ORDER BY o.created_at DESC, o.id DESC \
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::from_query(summaries, request, total))
    }

    /// One order by id, regardless of owner. Callers decide whether the
    /// requester may see it.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// Lines of one order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql =
            format!("SELECT {ORDER_ITEM_COLUMNS} FROM shop.order_items WHERE order_id = $1 ORDER BY id");
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }
}

/// Draw order numbers until one is unused. The `UNIQUE` constraint on
/// `order_number` remains the final arbiter if a concurrent checkout wins
/// the same draw after this check.
async fn allocate_order_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    attempts: u32,
) -> Result<OrderNumber, PlaceOrderError> {
    for _ in 0..attempts {
        let candidate = OrderNumber::generate();
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shop.orders WHERE order_number = $1)")
                .bind(&candidate)
                .fetch_one(&mut **tx)
                .await?;
        if !taken {
            return Ok(candidate);
        }
    }
    Err(PlaceOrderError::Repository(RepositoryError::Conflict(
        "could not allocate an unused order number".to_owned(),
    )))
}
