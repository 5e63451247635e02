//! Business logic services for the admin panel.
//!
//! The back office is mostly thin handlers over repositories; the only
//! real service is staff login.

pub mod auth;

pub use auth::{AdminAuthError, AdminAuthService};
