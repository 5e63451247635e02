//! Customer authentication endpoints.
//!
//! Registration and login store a [`CurrentUser`] in the session; logout
//! destroys the session entirely so the cart token is dropped along with
//! the identity.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use techhub_core::{Email, UserId};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// The authenticated customer as returned to the client.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Create a customer account and log it in.
///
/// `POST /auth/register`
///
/// # Errors
///
/// Returns `422` when a field fails validation or the email is already
/// registered, or `500` when the database or session store fails.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let service = AuthService::new(state.pool());
    let user = service
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    let current = CurrentUser::from(user);
    set_current_user(&session, &current).await?;
    set_sentry_user(&current.id, Some(current.email.as_str()));
    tracing::info!(user_id = %current.id, "customer registered");

    Ok((StatusCode::CREATED, Json(UserView::from(&current))))
}

/// Authenticate a customer with email and password.
///
/// `POST /auth/login`
///
/// # Errors
///
/// Returns `401` when the credentials do not match an account, or `500`
/// when the database or session store fails.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<UserView>, AppError> {
    let service = AuthService::new(state.pool());
    let user = service.login(&payload.email, &payload.password).await?;

    let current = CurrentUser::from(user);
    set_current_user(&session, &current).await?;
    set_sentry_user(&current.id, Some(current.email.as_str()));
    tracing::info!(user_id = %current.id, "customer logged in");

    Ok(Json(UserView::from(&current)))
}

/// Log the current customer out.
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
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Return the logged-in customer.
///
/// `GET /auth/me`
#[instrument(skip(user))]
pub async fn me(RequireAuth(user): RequireAuth) -> Json<UserView> {
    Json(UserView::from(&user))
}
