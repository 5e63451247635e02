//! Staff authentication.
//!
//! Credentials live in the same `shop.users` and `shop.user_passwords`
//! tables the storefront uses; the back office additionally requires the
//! `admin` role. The role is checked only after the password verifies, so
//! probing an email for back-office access still costs a valid password.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use sqlx::PgPool;

use techhub_core::{Email, UserRole};

use crate::db::users::{User, UserRepository};

/// Staff login service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new staff login service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Login with email and password, admitting only `admin` accounts.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` when the email is
    /// unknown, malformed, or the password does not match;
    /// `AdminAuthError::NotAdmin` when the credentials are valid but the
    /// account is a customer.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AdminAuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AdminAuthError::InvalidCredentials);
        };

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        let password_hash = self
            .users
            .password_hash(user.id)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if user.role != UserRole::Admin {
            return Err(AdminAuthError::NotAdmin);
        }

        Ok(user)
    }
}

/// Verify a password against a stored Argon2id hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}
