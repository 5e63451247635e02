//! Back-office landing page data.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use techhub_core::{OrderId, OrderNumber, OrderStatus, ProductId};

use crate::db::{
    DashboardRepository,
    dashboard::{DashboardStats, LowStockProduct, RecentOrder},
};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Store-wide counters.
#[derive(Debug, Serialize)]
pub struct StatsView {
    pub total_products: i64,
    pub active_products: i64,
    pub low_stock_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub total_revenue: Decimal,
    pub total_customers: i64,
}

impl From<&DashboardStats> for StatsView {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total_products: stats.total_products,
            active_products: stats.active_products,
            low_stock_products: stats.low_stock_products,
            total_orders: stats.total_orders,
            pending_orders: stats.pending_orders,
            total_revenue: stats.total_revenue,
            total_customers: stats.total_customers,
        }
    }
}

/// A recent order row, labelled with whoever placed it.
#[derive(Debug, Serialize)]
pub struct RecentOrderView {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Decimal,
    /// Customer name, or the guest email for guest checkouts.
    pub placed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&RecentOrder> for RecentOrderView {
    fn from(order: &RecentOrder) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            total: order.total,
            placed_by: order
                .customer_name
                .clone()
                .or_else(|| order.guest_email.clone()),
            created_at: order.created_at,
        }
    }
}

/// A product running out of stock.
#[derive(Debug, Serialize)]
pub struct LowStockView {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub stock: i32,
}

impl From<&LowStockProduct> for LowStockView {
    fn from(product: &LowStockProduct) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            stock: product.stock,
        }
    }
}

/// Everything the dashboard renders.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub stats: StatsView,
    pub recent_orders: Vec<RecentOrderView>,
    pub low_stock: Vec<LowStockView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Dashboard counters plus the most recent orders and low-stock products.
///
/// GET /dashboard
///
/// # Errors
///
/// Returns `AppError` if any of the aggregate queries fail.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<DashboardView>> {
    let repo = DashboardRepository::new(state.pool());

    let stats = repo.stats().await?;
    let recent = repo.recent_orders().await?;
    let low_stock = repo.low_stock().await?;

    Ok(Json(DashboardView {
        stats: StatsView::from(&stats),
        recent_orders: recent.iter().map(RecentOrderView::from).collect(),
        low_stock: low_stock.iter().map(LowStockView::from).collect(),
    }))
}
