//! Checkout route handlers.
//!
//! `GET` prices the cart as it stands; `POST` runs the placement
//! transaction. Both work for signed-in customers and guests, the latter
//! identified by the session's cart token and a required contact email.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techhub_core::{OrderTotals, PaymentMethod, PostalAddress};

use crate::db::AddressRepository;
use crate::error::Result;
use crate::middleware::{OptionalAuth, Scope};
use crate::routes::addresses::AddressView;
use crate::routes::cart::CartLineView;
use crate::routes::orders::OrderView;
use crate::services::checkout::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// What the checkout page needs: the priced cart and, for signed-in
/// customers, their saved addresses to prefill the form.
#[derive(Debug, Serialize)]
pub struct CheckoutPageView {
    pub items: Vec<CartLineView>,
    pub totals: OrderTotals,
    pub saved_addresses: Vec<AddressView>,
}

/// Place-order request body.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderPayload {
    pub shipping_address: PostalAddress,
    /// Defaults to the shipping address when absent.
    pub billing_address: Option<PostalAddress>,
    pub payment_method: PaymentMethod,
    /// Required for guest checkouts, ignored otherwise.
    pub guest_email: Option<String>,
    pub notes: Option<String>,
}

impl From<PlaceOrderPayload> for CheckoutRequest {
    fn from(payload: PlaceOrderPayload) -> Self {
        Self {
            shipping_address: payload.shipping_address,
            billing_address: payload.billing_address,
            payment_method: payload.payment_method,
            guest_email: payload.guest_email,
            notes: payload.notes,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Price the cart for the checkout page.
///
/// GET /checkout
///
/// # Errors
///
/// Returns `AppError` when the cart is empty or a line can no longer be
/// fulfilled, so the client can send the shopper back to the cart.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    Scope(scope): Scope,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CheckoutPageView>> {
    let quote = CheckoutService::new(state.pool()).quote(&scope).await?;

    let saved_addresses = match user {
        Some(user) => AddressRepository::new(state.pool())
            .list_for_user(user.id)
            .await?
            .iter()
            .map(AddressView::from)
            .collect(),
        None => Vec::new(),
    };

    Ok(Json(CheckoutPageView {
        items: quote.lines.iter().map(CartLineView::from).collect(),
        totals: quote.totals,
        saved_addresses,
    }))
}

/// Place the order and clear the purchased cart lines.
///
/// POST /checkout
///
/// # Errors
///
/// Returns `AppError::Validation` on bad addresses or a missing guest
/// email, and 409-mapped errors when the cart is empty or stock ran out.
#[instrument(skip(state, payload))]
pub async fn place_order(
    State(state): State<AppState>,
    Scope(scope): Scope,
    Json(payload): Json<PlaceOrderPayload>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let (order, items) = CheckoutService::new(state.pool())
        .place_order(&scope, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderView::from_parts(&order, &items)),
    ))
}
