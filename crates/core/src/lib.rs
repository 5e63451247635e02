//! TechHub Core - Shared types library.
//!
//! This crate provides common types used across all TechHub Commerce
//! components:
//! - `storefront` - Public-facing shop (catalog, cart, checkout)
//! - `admin` - Internal back-office panel
//! - `cli` - Command-line tools for migrations, seeding, and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain rules - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, order numbers, statuses, pricing
//!   rules, cart scopes, postal addresses, and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
