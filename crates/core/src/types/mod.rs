//! Core types for TechHub Commerce.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order_number;
pub mod page;
pub mod postal;
pub mod pricing;
pub mod scope;
pub mod slug;
pub mod snapshot;
pub mod status;
pub mod validation;

pub use email::{Email, EmailError};
pub use id::*;
pub use order_number::OrderNumber;
pub use page::{Page, PageRequest};
pub use postal::PostalAddress;
pub use pricing::{
    FLAT_SHIPPING_RATE, FREE_SHIPPING_THRESHOLD, OrderTotals, TAX_RATE, line_total, round2,
};
pub use scope::CartScope;
pub use slug::slugify;
pub use snapshot::ProductSnapshot;
pub use status::{AddressKind, OrderStatus, PaymentMethod, UserRole};
pub use validation::ValidationErrors;
