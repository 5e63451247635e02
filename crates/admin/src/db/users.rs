//! Account reads for admin authentication.
//!
//! The back office shares `shop.users` with the storefront; this
//! repository only carries the lookups the login flow needs. Customer
//! browsing lives in [`crate::db::customers`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use techhub_core::{Email, UserId, UserRole};

use super::RepositoryError;

/// An account as stored in `shop.users`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account lookups for the admin login flow.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up an account by email.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at, updated_at \
             FROM shop.users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Fetch the stored password hash for an account, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn password_hash(&self, user_id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM shop.user_passwords WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(hash)
    }
}
