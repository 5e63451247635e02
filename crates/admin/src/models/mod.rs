//! Domain models for the admin panel.
//!
//! Database row types live next to their repositories in [`crate::db`];
//! this module holds the types that travel through the session layer.

pub mod session;

pub use session::CurrentAdmin;
pub use session::keys as session_keys;
