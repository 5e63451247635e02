//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use techhub_core::{Email, UserId};

use crate::db::users::User;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
/// The role is not stored: an account that loses the `admin` role keeps
/// its session only until the 8-hour expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: UserId,
    /// Admin's display name.
    pub name: String,
    /// Admin's email address.
    pub email: Email,
}

impl From<User> for CurrentAdmin {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
