//! Address book route handlers.
//!
//! All operations require authentication and act only on the signed-in
//! customer's rows; editing another customer's address is refused, not
//! hidden. Marking an address default clears the previous default in the
//! same transaction.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techhub_core::{AddressId, AddressKind, PostalAddress, ValidationErrors};

use crate::db::{
    AddressRepository, RepositoryError,
    addresses::{Address, NewAddress},
};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// A saved address.
#[derive(Debug, Serialize)]
pub struct AddressView {
    pub id: AddressId,
    pub kind: AddressKind,
    pub address: PostalAddress,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Address> for AddressView {
    fn from(row: &Address) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            address: row.postal(),
            is_default: row.is_default,
            created_at: row.created_at,
        }
    }
}

/// Address book payload for create and update.
#[derive(Debug, Deserialize)]
pub struct AddressPayload {
    pub kind: AddressKind,
    pub address: PostalAddress,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressPayload {
    /// Validate the postal fields and convert into the repository input.
    fn validated(self) -> Result<NewAddress> {
        let mut errors = ValidationErrors::new();
        self.address.collect_errors("address", &mut errors);
        errors.into_result()?;

        Ok(NewAddress {
            kind: self.kind,
            postal: self.address,
            is_default: self.is_default,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List the customer's addresses, default first.
///
/// GET /addresses
///
/// # Errors
///
/// Returns `AppError` if the list query fails.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<AddressView>>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(addresses.iter().map(AddressView::from).collect()))
}

/// Save a new address.
///
/// POST /addresses
///
/// # Errors
///
/// Returns `AppError::Validation` when postal fields are missing or
/// overlong.
#[instrument(skip(state, user, payload))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<AddressPayload>,
) -> Result<(StatusCode, Json<AddressView>)> {
    let new = payload.validated()?;
    let address = AddressRepository::new(state.pool())
        .create(user.id, &new)
        .await?;

    Ok((StatusCode::CREATED, Json(AddressView::from(&address))))
}

/// Replace a saved address.
///
/// PATCH /addresses/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` when no such address exists,
/// `AppError::Forbidden` when it belongs to another customer, and
/// `AppError::Validation` on bad postal fields.
#[instrument(skip(state, user, payload))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(address_id): Path<AddressId>,
    Json(payload): Json<AddressPayload>,
) -> Result<Json<AddressView>> {
    let new = payload.validated()?;
    let repo = AddressRepository::new(state.pool());
    let address = match repo.update(user.id, address_id, &new).await {
        Ok(address) => address,
        Err(RepositoryError::NotFound) => {
            return Err(missing_address_error(&repo, address_id).await);
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(AddressView::from(&address)))
}

/// Delete a saved address.
///
/// DELETE /addresses/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` when no such address exists and
/// `AppError::Forbidden` when it belongs to another customer.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(address_id): Path<AddressId>,
) -> Result<StatusCode> {
    let repo = AddressRepository::new(state.pool());
    match repo.delete(user.id, address_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(RepositoryError::NotFound) => Err(missing_address_error(&repo, address_id).await),
        Err(e) => Err(e.into()),
    }
}

/// Classify a scoped miss: another customer's address is refused, a
/// missing one is a 404.
async fn missing_address_error(repo: &AddressRepository<'_>, address_id: AddressId) -> AppError {
    match repo.exists(address_id).await {
        Ok(true) => AppError::Forbidden("address belongs to another customer".to_owned()),
        Ok(false) => AppError::NotFound(format!("address {address_id}")),
        Err(e) => AppError::Database(e),
    }
}
