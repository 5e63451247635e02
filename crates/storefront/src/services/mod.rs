//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration and password login
//! - `cart` - Cart mutations with stock guards
//! - `checkout` - Cart validation, pricing, and order placement

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::AuthService;
pub use cart::CartService;
pub use checkout::CheckoutService;
