//! Customer account storage.
//!
//! Password hashes live in `shop.user_passwords`, a separate table keyed by
//! user id, so account lookups never carry credential material around.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use techhub_core::{Email, UserId, UserRole};

use super::RepositoryError;

/// A customer account as stored in `shop.users`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account reads and writes for the storefront.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an account and store its password hash in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the email is already
    /// registered, [`RepositoryError::Database`] for other failures.
    pub async fn create_with_password(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO shop.users (name, email) VALUES ($1, $2) \
             RETURNING id, name, email, role, created_at, updated_at",
        )
        .bind(name)
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query("INSERT INTO shop.user_passwords (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
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

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at, updated_at \
             FROM shop.users WHERE id = $1",
        )
        .bind(id)
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
