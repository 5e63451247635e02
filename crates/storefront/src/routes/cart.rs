//! Cart route handlers.
//!
//! Every operation is scoped to the requester's cart: the user id for
//! logged-in shoppers, the session's cart token for guests. Mutations
//! return the updated cart so clients never need a follow-up fetch.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techhub_core::{CartItemId, OrderTotals, ProductId};

use crate::db::cart::CartLine;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::Scope;
use crate::services::cart::{CartContents, CartService};
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// One cart line joined with the product's current state.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub quantity: i32,
    pub price: Decimal,
    pub line_total: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub primary_image: Option<String>,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            name: line.name.clone(),
            slug: line.slug.clone(),
            quantity: line.quantity,
            price: line.price,
            line_total: line.line_total(),
            stock: line.stock,
            is_active: line.is_active,
            primary_image: line.primary_image.clone(),
        }
    }
}

/// Cart payload with the totals checkout would charge right now.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: i64,
    pub totals: OrderTotals,
}

impl From<&CartContents> for CartView {
    fn from(contents: &CartContents) -> Self {
        Self {
            items: contents.lines.iter().map(CartLineView::from).collect(),
            item_count: contents
                .lines
                .iter()
                .map(|line| i64::from(line.quantity))
                .sum(),
            totals: contents.totals,
        }
    }
}

/// Cart count badge payload.
#[derive(Debug, Serialize)]
pub struct CartCountView {
    pub count: i64,
}

// =============================================================================
// Payloads
// =============================================================================

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemPayload {
    pub product_id: ProductId,
    /// Defaults to 1 when absent.
    pub quantity: Option<i32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemPayload {
    pub quantity: i32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
///
/// GET /cart
///
/// # Errors
///
/// Returns `AppError` if the cart cannot be loaded.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Scope(scope): Scope) -> Result<Json<CartView>> {
    let contents = CartService::new(state.pool()).contents(&scope).await?;
    Ok(Json(CartView::from(&contents)))
}

/// Get the cart item count for the header badge.
///
/// GET /cart/count
///
/// # Errors
///
/// Returns `AppError` if the count query fails.
#[instrument(skip(state))]
pub async fn count(
    State(state): State<AppState>,
    Scope(scope): Scope,
) -> Result<Json<CartCountView>> {
    let count = CartService::new(state.pool()).count(&scope).await?;
    Ok(Json(CartCountView { count }))
}

/// Add a product to the cart, merging with an existing line for the same
/// product.
///
/// POST /cart/items
///
/// # Errors
///
/// Returns `AppError` if the product does not exist, is unavailable, or
/// the requested quantity exceeds stock.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Json(payload): Json<AddItemPayload>,
) -> Result<Json<CartView>> {
    let service = CartService::new(state.pool());
    service
        .add_item(&scope, payload.product_id, payload.quantity.unwrap_or(1))
        .await?;
    add_breadcrumb(
        "cart",
        "Added product to cart",
        Some(&[("product_id", &payload.product_id.to_string())]),
    );

    let contents = service.contents(&scope).await?;
    Ok(Json(CartView::from(&contents)))
}

/// Set a cart line's quantity.
///
/// PATCH /cart/items/{id}
///
/// # Errors
///
/// Returns `AppError` if the line is not in this scope's cart or the
/// quantity cannot be fulfilled.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Path(line_id): Path<CartItemId>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<Json<CartView>> {
    let service = CartService::new(state.pool());
    service
        .update_item(&scope, line_id, payload.quantity)
        .await?;

    let contents = service.contents(&scope).await?;
    Ok(Json(CartView::from(&contents)))
}

/// Remove a cart line.
///
/// DELETE /cart/items/{id}
///
/// # Errors
///
/// Returns `AppError` if the line is not in this scope's cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Path(line_id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let service = CartService::new(state.pool());
    service.remove_item(&scope, line_id).await?;

    let contents = service.contents(&scope).await?;
    Ok(Json(CartView::from(&contents)))
}
