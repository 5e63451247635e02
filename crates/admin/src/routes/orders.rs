//! Order administration route handlers.
//!
//! Staff see every order, whoever placed it. Status changes are
//! unrestricted between the five states; deletion is allowed only once an
//! order is cancelled.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techhub_core::{
    Email, OrderId, OrderItemId, OrderNumber, OrderStatus, Page, PaymentMethod, PostalAddress,
    ProductId, UserId,
};

use crate::db::{
    OrderAdminRepository,
    orders::{Order, OrderAdminQuery, OrderCustomer, OrderItem, OrderSummary},
};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Compact order row for the back-office order table.
#[derive(Debug, Serialize)]
pub struct OrderSummaryView {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items_count: i64,
    /// Customer name, or the guest email for guest checkouts.
    pub placed_by: Option<String>,
    pub customer_email: Option<Email>,
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
            placed_by: summary
                .customer_name
                .clone()
                .or_else(|| summary.guest_email.clone()),
            customer_email: summary.customer_email.clone(),
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
    pub sku_slug: String,
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
            sku_slug: item.product_snapshot.slug.clone(),
            image: item.product_snapshot.image.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

/// The account behind an order.
#[derive(Debug, Serialize)]
pub struct OrderCustomerView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<&OrderCustomer> for OrderCustomerView {
    fn from(customer: &OrderCustomer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            email: customer.email.clone(),
        }
    }
}

/// Full order payload for the back-office detail page.
#[derive(Debug, Serialize)]
pub struct OrderDetailView {
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
    /// Present on guest orders only.
    pub guest_email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
    /// Absent for guest checkouts.
    pub customer: Option<OrderCustomerView>,
}

impl OrderDetailView {
    /// Assemble the view from an order header, its lines, and the account
    /// that placed it.
    #[must_use]
    pub fn from_parts(order: &Order, items: &[OrderItem], customer: Option<&OrderCustomer>) -> Self {
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
            guest_email: order.guest_email.clone(),
            notes: order.notes.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items.iter().map(OrderItemView::from).collect(),
            customer: customer.map(OrderCustomerView::from),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Search and pagination parameters for the order table.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
}

/// Request body for `PATCH /orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: OrderStatus,
    /// Replaces the stored notes when present; absent keeps them.
    pub notes: Option<String>,
}

/// List orders, newest first.
///
/// GET /orders
///
/// # Errors
///
/// Returns `AppError` if the list query fails.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<OrderSummaryView>>> {
    let query = OrderAdminQuery {
        search: params.search.filter(|s| !s.trim().is_empty()),
        status: params.status,
        page: params.page,
    };

    let page = OrderAdminRepository::new(state.pool()).list(&query).await?;
    Ok(Json(page.map(|summary| OrderSummaryView::from(&summary))))
}

/// Show one order with its lines and customer.
///
/// GET /orders/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` when the id does not exist.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderDetailView>> {
    let repo = OrderAdminRepository::new(state.pool());

    let order = repo
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    let items = repo.items(order.id).await?;
    let customer = repo.customer(order.id).await?;

    Ok(Json(OrderDetailView::from_parts(
        &order,
        &items,
        customer.as_ref(),
    )))
}

/// Set an order's status, optionally replacing its notes.
///
/// PATCH /orders/{id}/status
///
/// Any status can follow any other; the shop trusts its staff to know
/// why an order moves backwards.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the id does not exist.
#[instrument(skip(state, admin, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<OrderDetailView>> {
    let repo = OrderAdminRepository::new(state.pool());

    let order = repo
        .update_status(order_id, payload.status, payload.notes.as_deref())
        .await?;
    let items = repo.items(order.id).await?;
    let customer = repo.customer(order.id).await?;

    add_breadcrumb(
        "orders",
        "Changed order status",
        Some(&[
            ("order_id", &order_id.to_string()),
            ("status", payload.status.label()),
        ]),
    );
    tracing::info!(
        admin_id = %admin.id,
        order_id = %order_id,
        status = %payload.status,
        "order status updated"
    );

    Ok(Json(OrderDetailView::from_parts(
        &order,
        &items,
        customer.as_ref(),
    )))
}

/// Delete a cancelled order and its lines.
///
/// DELETE /orders/{id}
///
/// # Errors
///
/// Returns `AppError::NotCancellable` when the order is in any live
/// status, `AppError::NotFound` when it does not exist.
#[instrument(skip(state, admin))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
) -> Result<StatusCode> {
    OrderAdminRepository::new(state.pool())
        .delete_cancelled(order_id)
        .await?;

    add_breadcrumb(
        "orders",
        "Deleted cancelled order",
        Some(&[("order_id", &order_id.to_string())]),
    );
    tracing::info!(admin_id = %admin.id, order_id = %order_id, "order deleted");
    Ok(StatusCode::NO_CONTENT)
}
