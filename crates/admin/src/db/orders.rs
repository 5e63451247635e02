//! Order administration: search across customers, status updates, and
//! deletion of cancelled orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use techhub_core::{
    Email, OrderId, OrderItemId, OrderNumber, OrderStatus, Page, PageRequest, PaymentMethod,
    PostalAddress, ProductId, ProductSnapshot, UserId,
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

/// An order line as stored in `shop.order_items`. The snapshot carries the
/// product as it was sold, so lines stay renderable after catalog edits.
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

/// Compact order row for the back-office order table, joined with the
/// customer account when the order has one.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items_count: i64,
    pub customer_name: Option<String>,
    pub customer_email: Option<Email>,
    pub guest_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The account behind an order, absent for guest checkouts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderCustomer {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// Filters for the back-office order table.
#[derive(Debug, Clone, Default)]
pub struct OrderAdminQuery {
    /// Case-insensitive substring match against the order number, the
    /// customer's name or email, and the guest email.
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
}

/// Failure modes of [`OrderAdminRepository::delete_cancelled`].
#[derive(Debug, Error)]
pub enum DeleteOrderError {
    /// The order exists but is not cancelled, so it must be kept.
    #[error("only cancelled orders can be deleted")]
    NotCancellable,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for DeleteOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Full order access for the back office, across all customers.
pub struct OrderAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderAdminRepository<'a> {
    /// Orders shown per back-office page.
    pub const PAGE_SIZE: u32 = 20;

    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if either the count or the page
    /// query fails.
    pub async fn list(&self, query: &OrderAdminQuery) -> Result<Page<OrderSummary>, RepositoryError> {
        let request = PageRequest::new(query.page, Self::PAGE_SIZE);
        let pattern = query.search.as_ref().map(|term| format!("%{term}%"));

        let filter = "FROM shop.orders o \
             LEFT JOIN shop.users u ON u.id = o.user_id \
             WHERE ($1::text IS NULL \
                    OR o.order_number ILIKE $1 OR u.name ILIKE $1 \
                    OR u.email ILIKE $1 OR o.guest_email ILIKE $1) \
               AND ($2::shop.order_status IS NULL OR o.status = $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {filter}"))
            .bind(pattern.as_deref())
            .bind(query.status)
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT o.id, o.order_number, o.status, o.total, \
                    (SELECT COUNT(*) FROM shop.order_items oi WHERE oi.order_id = o.id) \
                        AS items_count, \
                    u.name AS customer_name, u.email AS customer_email, \
                    o.guest_email, o.created_at \
             {filter} \
             ORDER BY o.created_at DESC, o.id DESC LIMIT $3 OFFSET $4"
        );
        let summaries = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(pattern.as_deref())
            .bind(query.status)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::from_query(summaries, request, total))
    }

    /// One order by id, whoever placed it.
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
        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM shop.order_items WHERE order_id = $1 ORDER BY id"
        );
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }

    /// The account that placed an order, `None` for guest checkouts.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn customer(&self, order_id: OrderId) -> Result<Option<OrderCustomer>, RepositoryError> {
        let customer = sqlx::query_as::<_, OrderCustomer>(
            "SELECT u.id, u.name, u.email FROM shop.users u \
             JOIN shop.orders o ON o.user_id = u.id WHERE o.id = $1",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(customer)
    }

    /// Set an order's status, optionally replacing its notes. Passing no
    /// notes keeps whatever is stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the id does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        notes: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "UPDATE shop.orders \
             SET status = $2, notes = COALESCE($3, notes), updated_at = now() \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(status)
            .bind(notes)
            .fetch_optional(self.pool)
            .await?;
        order.ok_or(RepositoryError::NotFound)
    }

    /// Delete an order, allowed only once it is cancelled. Its lines go with
    /// it by cascade.
    ///
    /// The status check lives in the `DELETE` itself, so a concurrent status
    /// change cannot slip a live order through.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteOrderError::NotCancellable`] when the order exists in
    /// any other status, [`RepositoryError::NotFound`] when it does not
    /// exist.
    pub async fn delete_cancelled(&self, id: OrderId) -> Result<(), DeleteOrderError> {
        let result = sqlx::query("DELETE FROM shop.orders WHERE id = $1 AND status = 'cancelled'")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shop.orders WHERE id = $1)")
                    .bind(id)
                    .fetch_one(self.pool)
                    .await?;
            return Err(if exists {
                DeleteOrderError::NotCancellable
            } else {
                DeleteOrderError::Repository(RepositoryError::NotFound)
            });
        }
        Ok(())
    }
}
