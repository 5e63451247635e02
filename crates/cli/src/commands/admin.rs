//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user with a generated password
//! th-cli admin create -e ops@techhub.example -n "Dana Reyes"
//!
//! # Create a new admin user with a chosen password
//! th-cli admin create -e ops@techhub.example -n "Dana Reyes" -p "s3cure-pass"
//! ```
//!
//! An existing account is promoted in place: the role becomes `admin` and
//! the password is left alone unless `--password` is given.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `STOREFRONT_DATABASE_URL`)

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use techhub_core::Email;

/// Characters used for generated passwords. Ambiguous glyphs (`0O`, `1lI`)
/// are left out so the printed value survives retyping.
const PASSWORD_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";

/// Length of generated passwords.
const PASSWORD_LENGTH: usize = 20;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No database connection string in the environment.
    #[error("Missing environment variable: DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Blank display name.
    #[error("Name must not be blank")]
    BlankName,

    /// Password hashing failure.
    #[error("Failed to hash password")]
    PasswordHash,
}

/// Create a new admin user, or promote an existing account to admin.
///
/// New accounts get the supplied password, or a generated one printed to
/// stdout. Existing accounts keep their password unless one is supplied.
///
/// # Errors
///
/// Returns `AdminError` when the email or name is invalid, or when the
/// database rejects the write.
pub async fn create_user(
    email: &str,
    name: &str,
    password: Option<&str>,
) -> Result<i64, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::BlankName);
    }

    let database_url = super::database_url().ok_or(AdminError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM shop.users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    let mut tx = pool.begin().await?;

    let user_id = if let Some(id) = existing {
        tracing::info!("Promoting existing account to admin: {} (ID {})", email, id);
        sqlx::query("UPDATE shop.users SET role = 'admin', updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        id
    } else {
        tracing::info!("Creating admin user: {}", email);
        sqlx::query_scalar(
            "INSERT INTO shop.users (name, email, role) VALUES ($1, $2, 'admin') RETURNING id",
        )
        .bind(name)
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await?
    };

    let generated = password.is_none();
    let password = password.map_or_else(generate_password, str::to_owned);

    // A promoted account keeps its password unless the operator chose one.
    if existing.is_none() || !generated {
        let password_hash = hash_password(&password)?;
        sqlx::query(
            "INSERT INTO shop.user_passwords (user_id, password_hash) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE \
             SET password_hash = EXCLUDED.password_hash, updated_at = now()",
        )
        .bind(user_id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!("Admin user ready! ID: {}, Email: {}", user_id, email);
    if generated && existing.is_none() {
        #[allow(clippy::print_stdout)]
        {
            println!("Generated password (shown once, store it now): {password}");
        }
    }

    Ok(user_id)
}

/// Generate a random password from the reduced charset.
fn generate_password() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    (0..PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..PASSWORD_CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..len
            char::from(*PASSWORD_CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Hash a password using Argon2id, matching the server binaries.
fn hash_password(password: &str) -> Result<String, AdminError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminError::PasswordHash)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_length_and_charset() {
        let password = generate_password();
        assert_eq!(password.len(), PASSWORD_LENGTH);
        assert!(
            password.bytes().all(|b| PASSWORD_CHARSET.contains(&b)),
            "unexpected character in {password}"
        );
    }

    #[test]
    fn test_generated_passwords_vary() {
        assert_ne!(generate_password(), generate_password());
    }

    #[test]
    fn test_hash_password_produces_phc_string() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }
}
