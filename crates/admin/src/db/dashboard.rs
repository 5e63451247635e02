//! Aggregate queries behind the back-office landing page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use techhub_core::{OrderId, OrderNumber, OrderStatus, ProductId};

use super::RepositoryError;

/// Store-wide counters shown at the top of the dashboard.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DashboardStats {
    pub total_products: i64,
    pub active_products: i64,
    pub low_stock_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    /// Sum of order totals, cancelled orders excluded.
    pub total_revenue: Decimal,
    pub total_customers: i64,
}

/// A recent order with whoever placed it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentOrder {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Decimal,
    pub customer_name: Option<String>,
    pub guest_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product running out of stock.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LowStockProduct {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub stock: i32,
}

/// Aggregate reads for the dashboard.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Stock at or below this counts as low.
    pub const LOW_STOCK_THRESHOLD: i32 = 10;

    /// How many recent orders and low-stock products the dashboard lists.
    pub const LIST_LIMIT: i64 = 5;

    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All counters in one round trip.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            "SELECT \
                (SELECT COUNT(*) FROM shop.products) AS total_products, \
                (SELECT COUNT(*) FROM shop.products WHERE is_active) AS active_products, \
                (SELECT COUNT(*) FROM shop.products WHERE stock <= $1) AS low_stock_products, \
                (SELECT COUNT(*) FROM shop.orders) AS total_orders, \
                (SELECT COUNT(*) FROM shop.orders WHERE status = 'pending') AS pending_orders, \
                (SELECT COALESCE(SUM(total), 0) FROM shop.orders WHERE status <> 'cancelled') \
                    AS total_revenue, \
                (SELECT COUNT(*) FROM shop.users WHERE role = 'customer') AS total_customers",
        )
        .bind(Self::LOW_STOCK_THRESHOLD)
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }

    /// The latest orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn recent_orders(&self) -> Result<Vec<RecentOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, RecentOrder>(
            "SELECT o.id, o.order_number, o.status, o.total, \
                    u.name AS customer_name, o.guest_email, o.created_at \
             FROM shop.orders o \
             LEFT JOIN shop.users u ON u.id = o.user_id \
             ORDER BY o.created_at DESC, o.id DESC LIMIT $1",
        )
        .bind(Self::LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// Products closest to selling out, emptiest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn low_stock(&self) -> Result<Vec<LowStockProduct>, RepositoryError> {
        let products = sqlx::query_as::<_, LowStockProduct>(
            "SELECT id, name, sku, stock FROM shop.products \
             WHERE stock <= $1 ORDER BY stock ASC, id ASC LIMIT $2",
        )
        .bind(Self::LOW_STOCK_THRESHOLD)
        .bind(Self::LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }
}
