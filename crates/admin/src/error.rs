//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding. All route handlers return `Result<T, AppError>`, and
//! every error renders as a JSON body of the form
//! `{"error": code, "message": text, "fields": {...}}` where `fields` only
//! appears on validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use techhub_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::db::orders::DeleteOrderError;
use crate::services::auth::AdminAuthError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Staff login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    /// Request payload failed validation.
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    /// An order in a live status cannot be deleted.
    #[error("only cancelled orders can be deleted")]
    NotCancellable,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authenticated, but not allowed to touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DeleteOrderError> for AppError {
    fn from(err: DeleteOrderError) -> Self {
        match err {
            DeleteOrderError::NotCancellable => Self::NotCancellable,
            DeleteOrderError::Repository(e) => Self::Database(e),
        }
    }
}

/// Wire format for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ValidationErrors>,
}

impl AppError {
    /// Status code, stable error code, client-safe message and optional
    /// field errors for this error. Internal details never reach the client.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<ValidationErrors>) {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => {
                    (StatusCode::NOT_FOUND, "not_found", "Not found".to_owned(), None)
                }
                // Unique and foreign-key violations surface as field errors,
                // same shape as any other invalid form submission.
                RepositoryError::Duplicate { field }
                | RepositoryError::InvalidReference { field } => {
                    let mut fields = ValidationErrors::new();
                    fields.add(*field, err.to_string());
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "validation_failed",
                        "The given data was invalid".to_owned(),
                        Some(fields),
                    )
                }
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_owned(),
                    None,
                ),
            },
            Self::Session(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Internal server error".to_owned(),
                None,
            ),
            Self::Auth(err) => match err {
                AdminAuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "invalid_credentials",
                    "Invalid email or password".to_owned(),
                    None,
                ),
                AdminAuthError::NotAdmin => (
                    StatusCode::FORBIDDEN,
                    "forbidden",
                    "This account has no back-office access".to_owned(),
                    None,
                ),
                AdminAuthError::Repository(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_owned(),
                    None,
                ),
            },
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                "The given data was invalid".to_owned(),
                Some(errors.clone()),
            ),
            Self::NotCancellable => (
                StatusCode::CONFLICT,
                "not_cancellable",
                "Only cancelled orders can be deleted".to_owned(),
                None,
            ),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Not found: {what}"),
                None,
            ),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone(), None),
            Self::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", msg.clone(), None)
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = self.parts();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: code,
            message,
            fields,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin ID.
///
/// Call this after successful authentication to associate errors with the
/// staff member whose session triggered them.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the admin.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for staff actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of
/// back-office actions leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 42".to_string());
        assert_eq!(err.to_string(), "Not found: order 42");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(AppError::NotCancellable), StatusCode::CONFLICT);
        assert_eq!(
            get_status(AppError::Auth(AdminAuthError::NotAdmin)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_duplicate_sku_renders_as_field_error() {
        let err = AppError::Database(RepositoryError::Duplicate { field: "sku" });
        let (status, code, _, fields) = err.parts();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "validation_failed");
        let fields = fields.unwrap_or_default();
        assert_eq!(
            fields.fields().get("sku"),
            Some(&vec!["sku has already been taken".to_string()])
        );
    }

    #[test]
    fn test_missing_category_renders_as_field_error() {
        let err = AppError::Database(RepositoryError::InvalidReference {
            field: "category_id",
        });
        let (status, _, _, fields) = err.parts();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(fields.unwrap_or_default().fields().contains_key("category_id"));
    }

    #[test]
    fn test_delete_order_error_flattens() {
        let err = AppError::from(DeleteOrderError::NotCancellable);
        assert!(matches!(err, AppError::NotCancellable));

        let err = AppError::from(DeleteOrderError::Repository(RepositoryError::NotFound));
        let (status, code, _, _) = err.parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "not_found");
    }

    #[test]
    fn test_internal_details_are_redacted() {
        let (_, _, message, _) =
            AppError::Internal("pool timed out connecting to 10.0.0.3".to_string()).parts();
        assert_eq!(message, "Internal server error");
    }
}
