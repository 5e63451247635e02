//! Checkout: validate the cart, price it, and place the order.
//!
//! Validation happens twice by design. This service rejects carts that are
//! empty, hold inactive products, or exceed stock before any transaction
//! starts; the placement transaction then re-checks stock with a guarded
//! decrement, because another checkout may have bought the same units in
//! the meantime.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use techhub_core::{
    CartScope, Email, PaymentMethod, PostalAddress, ProductSnapshot, ValidationErrors,
    pricing::OrderTotals,
};

use crate::db::RepositoryError;
use crate::db::cart::{CartLine, CartRepository};
use crate::db::orders::{NewOrder, NewOrderLine, Order, OrderItem, OrderRepository, PlaceOrderError};

/// Longest accepted order note.
const MAX_NOTES_LENGTH: usize = 1000;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line's product was deactivated or sold down since it was
    /// added. Covers both the pre-transaction check and a lost stock race.
    #[error("{name} is no longer available")]
    ProductUnavailable { name: String },

    /// Checkout payload failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<PlaceOrderError> for CheckoutError {
    fn from(e: PlaceOrderError) -> Self {
        match e {
            PlaceOrderError::InsufficientStock { name } => Self::ProductUnavailable { name },
            PlaceOrderError::Repository(err) => Self::Repository(err),
        }
    }
}

/// Checkout input, parsed but not yet validated.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub shipping_address: PostalAddress,
    /// Billing falls back to the shipping address when absent.
    pub billing_address: Option<PostalAddress>,
    pub payment_method: PaymentMethod,
    /// Required for guest checkouts, ignored for signed-in customers.
    pub guest_email: Option<String>,
    pub notes: Option<String>,
}

/// What the checkout page shows before the customer commits.
#[derive(Debug, Clone)]
pub struct CheckoutQuote {
    pub lines: Vec<CartLine>,
    pub totals: OrderTotals,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    cart: CartRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Price the scope's cart for the checkout page.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` or
    /// `CheckoutError::ProductUnavailable` when the cart could not be
    /// checked out as it stands.
    pub async fn quote(&self, scope: &CartScope) -> Result<CheckoutQuote, CheckoutError> {
        let lines = self.cart.items(scope).await?;
        validate_lines(&lines)?;
        let totals = totals_for(&lines);
        Ok(CheckoutQuote { lines, totals })
    }

    /// Validate, price, and persist an order from the scope's cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` for bad payload fields and the
    /// cart errors from [`CheckoutService::quote`]. A stock race lost inside
    /// the placement transaction also surfaces as
    /// `CheckoutError::ProductUnavailable`.
    pub async fn place_order(
        &self,
        scope: &CartScope,
        request: CheckoutRequest,
    ) -> Result<(Order, Vec<OrderItem>), CheckoutError> {
        let guest_email = validate_request(scope, &request)?;

        let lines = self.cart.items(scope).await?;
        validate_lines(&lines)?;
        let totals = totals_for(&lines);

        let new_order = build_order(scope, request, guest_email, lines, totals);
        let placed = self.orders.place(&new_order).await?;

        Ok(placed)
    }
}

/// Check the payload fields. Returns the parsed guest email for guest
/// scopes, `None` for signed-in customers.
fn validate_request(
    scope: &CartScope,
    request: &CheckoutRequest,
) -> Result<Option<Email>, CheckoutError> {
    let mut errors = ValidationErrors::new();

    request
        .shipping_address
        .collect_errors("shipping_address", &mut errors);
    if let Some(billing) = &request.billing_address {
        billing.collect_errors("billing_address", &mut errors);
    }

    let mut guest_email = None;
    if scope.is_guest() {
        match request.guest_email.as_deref() {
            None | Some("") => errors.add("guest_email", "is required for guest checkout"),
            Some(raw) => match Email::parse(raw) {
                Ok(parsed) => guest_email = Some(parsed),
                Err(e) => errors.add("guest_email", e.to_string()),
            },
        }
    }

    if let Some(notes) = &request.notes
        && notes.len() > MAX_NOTES_LENGTH
    {
        errors.add("notes", format!("must be at most {MAX_NOTES_LENGTH} characters"));
    }

    errors.into_result()?;
    Ok(guest_email)
}

/// Reject carts that cannot be checked out as they stand.
fn validate_lines(lines: &[CartLine]) -> Result<(), CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    for line in lines {
        if !line.is_active || line.stock < line.quantity {
            return Err(CheckoutError::ProductUnavailable {
                name: line.name.clone(),
            });
        }
    }

    Ok(())
}

/// Price the cart at current catalog prices.
fn totals_for(lines: &[CartLine]) -> OrderTotals {
    let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();
    OrderTotals::from_subtotal(subtotal)
}

/// Assemble the order, snapshotting each line's product as it is right now.
fn build_order(
    scope: &CartScope,
    request: CheckoutRequest,
    guest_email: Option<Email>,
    lines: Vec<CartLine>,
    totals: OrderTotals,
) -> NewOrder {
    let billing_address = request
        .billing_address
        .unwrap_or_else(|| request.shipping_address.clone());

    let lines = lines
        .into_iter()
        .map(|line| {
            let line_total = line.line_total();
            NewOrderLine {
                cart_item_id: line.id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.price,
                line_total,
                snapshot: ProductSnapshot {
                    name: line.name,
                    slug: line.slug,
                    description: line.description,
                    price: line.price,
                    image: line.primary_image,
                },
            }
        })
        .collect();

    NewOrder {
        user_id: scope.user_id(),
        totals,
        shipping_address: request.shipping_address,
        billing_address,
        payment_method: request.payment_method,
        guest_email: guest_email.map(Email::into_inner),
        notes: request.notes,
        lines,
    }
}
