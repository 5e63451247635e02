//! Address book storage.
//!
//! All operations take the owning user id and fold it into the `WHERE`
//! clause, so one customer can never read or edit another's addresses.
//! [`AddressRepository::exists`] is the one unscoped probe; handlers use
//! it to refuse a cross-owner edit instead of hiding it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use techhub_core::{AddressId, AddressKind, PostalAddress, UserId};

use super::RepositoryError;

const ADDRESS_COLUMNS: &str = "id, user_id, kind, first_name, last_name, address_line_1, \
     address_line_2, city, state, zip_code, country, phone, is_default, created_at, updated_at";

/// A saved address as stored in `shop.addresses`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub kind: AddressKind,
    pub first_name: String,
    pub last_name: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// The postal fields of this row, detached from its book-keeping columns.
    #[must_use]
    pub fn postal(&self) -> PostalAddress {
        PostalAddress {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address_line_1: self.address_line_1.clone(),
            address_line_2: self.address_line_2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Fields accepted when creating or replacing an address.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub kind: AddressKind,
    pub postal: PostalAddress,
    pub is_default: bool,
}

/// Address book reads and writes.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All addresses for a user, default first, then newest.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let sql = format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.addresses \
             WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC"
        );
        let addresses = sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(addresses)
    }

    /// One address by id, provided the user owns it.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_for_user(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM shop.addresses WHERE user_id = $1 AND id = $2");
        let address = sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .bind(address_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(address)
    }

    /// Whether any address with this id exists, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn exists(&self, address_id: AddressId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shop.addresses WHERE id = $1)")
                .bind(address_id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert an address. When it is marked default, the user's previous
    /// default is cleared in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if any statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        new: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if new.is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let sql = format!(
            "INSERT INTO shop.addresses \
             (user_id, kind, first_name, last_name, address_line_1, address_line_2, \
              city, state, zip_code, country, phone, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ADDRESS_COLUMNS}"
        );
        let address = sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .bind(new.kind)
            .bind(&new.postal.first_name)
            .bind(&new.postal.last_name)
            .bind(&new.postal.address_line_1)
            .bind(new.postal.address_line_2.as_deref())
            .bind(&new.postal.city)
            .bind(&new.postal.state)
            .bind(&new.postal.zip_code)
            .bind(&new.postal.country)
            .bind(&new.postal.phone)
            .bind(new.is_default)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(address)
    }

    /// Replace an address the user owns. Clearing and setting the default
    /// flag happen in the same transaction, so at most one address per user
    /// is ever marked default.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the user has no such
    /// address, [`RepositoryError::Database`] for other failures.
    pub async fn update(
        &self,
        user_id: UserId,
        address_id: AddressId,
        new: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if new.is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let sql = format!(
            "UPDATE shop.addresses SET \
             kind = $3, first_name = $4, last_name = $5, address_line_1 = $6, \
             address_line_2 = $7, city = $8, state = $9, zip_code = $10, \
             country = $11, phone = $12, is_default = $13, updated_at = now() \
             WHERE user_id = $1 AND id = $2 \
             RETURNING {ADDRESS_COLUMNS}"
        );
        let address = sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .bind(address_id)
            .bind(new.kind)
            .bind(&new.postal.first_name)
            .bind(&new.postal.last_name)
            .bind(&new.postal.address_line_1)
            .bind(new.postal.address_line_2.as_deref())
            .bind(&new.postal.city)
            .bind(&new.postal.state)
            .bind(&new.postal.zip_code)
            .bind(&new.postal.country)
            .bind(&new.postal.phone)
            .bind(new.is_default)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(address)
    }

    /// Delete an address the user owns.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the user has no such
    /// address, [`RepositoryError::Database`] for other failures.
    pub async fn delete(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.addresses WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(address_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn clear_default(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: UserId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE shop.addresses SET is_default = FALSE, updated_at = now() \
         WHERE user_id = $1 AND is_default",
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
