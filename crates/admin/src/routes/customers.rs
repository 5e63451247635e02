//! Customer browsing route handlers.
//!
//! Read-only: the back office can inspect accounts and their history but
//! never edits them.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techhub_core::{AddressId, AddressKind, Email, OrderId, OrderNumber, OrderStatus, Page, UserId};

use crate::db::{
    CustomerRepository,
    customers::{Customer, CustomerAddress, CustomerOrder, CustomerQuery, CustomerSummary},
};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Compact customer row for the back-office table.
#[derive(Debug, Serialize)]
pub struct CustomerSummaryView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub orders_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&CustomerSummary> for CustomerSummaryView {
    fn from(summary: &CustomerSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            email: summary.email.clone(),
            orders_count: summary.orders_count,
            created_at: summary.created_at,
        }
    }
}

/// A customer's recent order.
#[derive(Debug, Serialize)]
pub struct CustomerOrderView {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&CustomerOrder> for CustomerOrderView {
    fn from(order: &CustomerOrder) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status,
            total: order.total,
            items_count: order.items_count,
            created_at: order.created_at,
        }
    }
}

/// A saved address on the customer detail page.
#[derive(Debug, Serialize)]
pub struct CustomerAddressView {
    pub id: AddressId,
    pub kind: AddressKind,
    pub full_name: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
}

impl From<&CustomerAddress> for CustomerAddressView {
    fn from(address: &CustomerAddress) -> Self {
        Self {
            id: address.id,
            kind: address.kind,
            full_name: format!("{} {}", address.first_name, address.last_name),
            address_line_1: address.address_line_1.clone(),
            address_line_2: address.address_line_2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            country: address.country.clone(),
            phone: address.phone.clone(),
            is_default: address.is_default,
        }
    }
}

/// Full customer payload for the detail page.
#[derive(Debug, Serialize)]
pub struct CustomerDetailView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub recent_orders: Vec<CustomerOrderView>,
    pub addresses: Vec<CustomerAddressView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Search and pagination parameters for the customer table.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
}

/// List customers, newest first.
///
/// GET /customers
///
/// # Errors
///
/// Returns `AppError` if the list query fails.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<CustomerSummaryView>>> {
    let query = CustomerQuery {
        search: params.search.filter(|s| !s.trim().is_empty()),
        page: params.page,
    };

    let page = CustomerRepository::new(state.pool()).list(&query).await?;
    Ok(Json(page.map(|summary| CustomerSummaryView::from(&summary))))
}

/// Show one customer with their recent orders and address book.
///
/// GET /customers/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` when the id does not exist or belongs to
/// a staff account.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(customer_id): Path<UserId>,
) -> Result<Json<CustomerDetailView>> {
    let repo = CustomerRepository::new(state.pool());

    let customer: Customer = repo
        .find_by_id(customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {customer_id}")))?;

    let orders = repo.recent_orders(customer.id).await?;
    let addresses = repo.addresses(customer.id).await?;

    Ok(Json(CustomerDetailView {
        id: customer.id,
        name: customer.name,
        email: customer.email,
        created_at: customer.created_at,
        recent_orders: orders.iter().map(CustomerOrderView::from).collect(),
        addresses: addresses.iter().map(CustomerAddressView::from).collect(),
    }))
}
