//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring customer authentication in route
//! handlers, plus the cart-scope extractor shared by logged-in and
//! anonymous shoppers.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use techhub_core::CartScope;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires customer authentication.
///
/// If the shopper is not logged in, the request is rejected with a
/// 401 response.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer not configured".to_owned()))?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the shopper
/// is not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Extractor that resolves the cart scope for the request.
///
/// Logged-in shoppers are scoped by their user id. Anonymous shoppers are
/// scoped by a cart token; the first cart operation mints one and stores
/// it in the session, and later requests reuse it.
pub struct Scope(pub CartScope);

impl<S> FromRequestParts<S> for Scope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer not configured".to_owned()))?;

        if let Some(user) = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
        {
            return Ok(Self(CartScope::Customer(user.id)));
        }

        if let Some(token) = session.get::<Uuid>(session_keys::CART_TOKEN).await? {
            return Ok(Self(CartScope::Guest(token)));
        }

        let token = Uuid::new_v4();
        session.insert(session_keys::CART_TOKEN, token).await?;
        Ok(Self(CartScope::Guest(token)))
    }
}

/// Helper to set the current user in the session (login).
///
/// Rotates the session id before storing the identity so the
/// pre-login cookie cannot be replayed as an authenticated one.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the session entirely (logout).
///
/// Drops the stored identity and the guest cart token along with the
/// session record itself.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
