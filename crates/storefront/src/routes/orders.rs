//! Order history route handlers.
//!
//! Customers see only their own orders. Guest orders have no owner and
//! are reachable only through the back office.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techhub_core::{
    OrderId, OrderItemId, OrderNumber, OrderStatus, Page, PaymentMethod, PostalAddress, ProductId,
};

use crate::db::{
    OrderRepository,
    orders::{Order, OrderItem, OrderSummary},
};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Compact order row for the history list.
#[derive(Debug, Serialize)]
pub struct OrderSummaryView {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderSummary> for OrderSummaryView {
    fn from(summary: &OrderSummary) -> Self {
        Self {
            id: summary.id,
            order_number: summary.order_number.clone(),
            status: summary.status,
            total: summary.total,
            items_count: summary.items_count,
            created_at: summary.created_at,
        }
    }
}

/// One order line, rendered from the purchase-time snapshot.
#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub id: OrderItemId,
    /// Null once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            name: item.product_snapshot.name.clone(),
            slug: item.product_snapshot.slug.clone(),
            image: item.product_snapshot.image.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

/// Full order payload for the detail page and the checkout receipt.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub shipping_address: PostalAddress,
    pub billing_address: PostalAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    /// Assemble the view from an order header and its lines.
    #[must_use]
    pub fn from_parts(order: &Order, items: &[OrderItem]) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            subtotal: order.subtotal,
            tax: order.tax,
            shipping: order.shipping,
            total: order.total,
            shipping_address: order.shipping_address.clone(),
            billing_address: order.billing_address.clone(),
            payment_method: order.payment_method,
            notes: order.notes.clone(),
            created_at: order.created_at,
            items: items.iter().map(OrderItemView::from).collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Pagination parameters for the order history.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
}

/// List the signed-in customer's orders, newest first.
///
/// GET /orders
///
/// # Errors
///
/// Returns `AppError` if the list query fails.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<OrderSummaryView>>> {
    let page = OrderRepository::new(state.pool())
        .list_for_user(user.id, params.page)
        .await?;

    Ok(Json(page.map(|summary| OrderSummaryView::from(&summary))))
}

/// Show one of the signed-in customer's orders.
///
/// GET /orders/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if no such order exists and
/// `AppError::Forbidden` if it belongs to someone else.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let orders = OrderRepository::new(state.pool());

    let order = orders
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    if order.user_id != Some(user.id) {
        return Err(AppError::Forbidden(
            "order belongs to another customer".to_owned(),
        ));
    }

    let items = orders.items(order.id).await?;
    Ok(Json(OrderView::from_parts(&order, &items)))
}
