//! Customer browsing for the back office.
//!
//! Every query filters on `role = 'customer'`, so staff accounts never show
//! up in customer lists or lookups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use techhub_core::{
    AddressId, AddressKind, Email, OrderId, OrderNumber, OrderStatus, Page, PageRequest, UserId,
};

use super::RepositoryError;

/// A customer row with their lifetime order count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub orders_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A customer profile as stored in `shop.users`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact order row for a customer's purchase history.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerOrder {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A saved address as shown on the customer detail page.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerAddress {
    pub id: AddressId,
    pub kind: AddressKind,
    pub first_name: String,
    pub last_name: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Filters for the back-office customer table.
#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    /// Case-insensitive substring match against name and email.
    pub search: Option<String>,
    pub page: Option<u32>,
}

/// Read-only customer access for the back office.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Customers shown per back-office page.
    pub const PAGE_SIZE: u32 = 20;

    /// How many orders the customer detail page shows.
    pub const RECENT_ORDERS: i64 = 10;

    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List customers matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if either the count or the page
    /// query fails.
    pub async fn list(&self, query: &CustomerQuery) -> Result<Page<CustomerSummary>, RepositoryError> {
        let request = PageRequest::new(query.page, Self::PAGE_SIZE);
        let pattern = query.search.as_ref().map(|term| format!("%{term}%"));

        let filter = "FROM shop.users u \
             WHERE u.role = 'customer' \
               AND ($1::text IS NULL OR u.name ILIKE $1 OR u.email ILIKE $1)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {filter}"))
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT u.id, u.name, u.email, \
                    (SELECT COUNT(*) FROM shop.orders o WHERE o.user_id = u.id) \
                        AS orders_count, \
                    u.created_at \
             {filter} \
             ORDER BY u.created_at DESC, u.id DESC LIMIT $2 OFFSET $3"
        );
        let customers = sqlx::query_as::<_, CustomerSummary>(&sql)
            .bind(pattern.as_deref())
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::from_query(customers, request, total))
    }

    /// One customer by id. Staff accounts come back as `None` even when the
    /// id exists.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, created_at, updated_at \
             FROM shop.users WHERE id = $1 AND role = 'customer'",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(customer)
    }

    /// The customer's most recent orders, capped at [`Self::RECENT_ORDERS`].
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn recent_orders(&self, id: UserId) -> Result<Vec<CustomerOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, CustomerOrder>(
            "SELECT o.id, o.order_number, o.status, o.total, \
                    (SELECT COUNT(*) FROM shop.order_items oi WHERE oi.order_id = o.id) \
                        AS items_count, \
                    o.created_at \
             FROM shop.orders o \
             WHERE o.user_id = $1 \
             ORDER BY o.created_at DESC, o.id DESC LIMIT $2",
        )
        .bind(id)
        .bind(Self::RECENT_ORDERS)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// The customer's address book, default first, then newest.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn addresses(&self, id: UserId) -> Result<Vec<CustomerAddress>, RepositoryError> {
        let addresses = sqlx::query_as::<_, CustomerAddress>(
            "SELECT id, kind, first_name, last_name, address_line_1, address_line_2, \
                    city, state, zip_code, country, phone, is_default, created_at \
             FROM shop.addresses \
             WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }
}
