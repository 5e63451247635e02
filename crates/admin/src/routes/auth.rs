//! Staff authentication endpoints.
//!
//! Login stores a [`CurrentAdmin`] in the session; customer accounts are
//! turned away with a 403 even when their password is correct.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use techhub_core::{Email, UserId};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// The authenticated admin as returned to the client.
#[derive(Debug, Serialize)]
pub struct AdminView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<&CurrentAdmin> for AdminView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            id: admin.id,
            name: admin.name.clone(),
            email: admin.email.clone(),
        }
    }
}

/// Authenticate a staff member with email and password.
///
/// `POST /auth/login`
///
/// # Errors
///
/// Returns `401` when the credentials do not match an account, `403` when
/// they do but the account is a customer, or `500` when the database or
/// session store fails.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AdminView>, AppError> {
    let service = AdminAuthService::new(state.pool());
    let user = service.login(&payload.email, &payload.password).await?;

    let current = CurrentAdmin::from(user);
    set_current_admin(&session, &current).await?;
    set_sentry_user(&current.id, Some(current.email.as_str()));
    tracing::info!(admin_id = %current.id, "admin logged in");

    Ok(Json(AdminView::from(&current)))
}

/// Log the current admin out.
///
/// `POST /auth/logout`
///
/// Succeeds even when no one is logged in.
///
/// # Errors
///
/// Returns `500` when the session store fails.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode, AppError> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Return the logged-in admin.
///
/// `GET /auth/me`
#[instrument(skip(admin))]
pub async fn me(RequireAdmin(admin): RequireAdmin) -> Json<AdminView> {
    Json(AdminView::from(&admin))
}
