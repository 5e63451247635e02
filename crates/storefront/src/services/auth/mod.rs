//! Authentication service.
//!
//! Customer registration and password login. Hashes are Argon2id and live
//! in `shop.user_passwords`; login failures never say which half of the
//! credentials was wrong.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use techhub_core::{Email, ValidationErrors};

use crate::db::RepositoryError;
use crate::db::users::{User, UserRepository};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum display name length.
const MAX_NAME_LENGTH: usize = 255;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with field-level messages when the
    /// name, email, or password is unacceptable, `AuthError::EmailTaken`
    /// when the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let (name, email) = validate_registration(name, email, password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the email is unknown,
    /// malformed, or the password does not match.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash = self
            .users
            .password_hash(user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Check registration input, returning the trimmed name and parsed email.
fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(String, Email), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = name.trim();
    if name.is_empty() {
        errors.add("name", "is required");
    } else if name.len() > MAX_NAME_LENGTH {
        errors.add("name", format!("must be at most {MAX_NAME_LENGTH} characters"));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }

    match Email::parse(email) {
        Ok(parsed) => {
            errors.into_result()?;
            Ok((name.to_owned(), parsed))
        }
        Err(e) => {
            errors.add("email", e.to_string());
            Err(errors)
        }
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
