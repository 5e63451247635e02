//! Category reference list for product forms.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use techhub_core::CategoryId;

use crate::db::{CategoryRepository, categories::CategoryOption};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// A category option for select boxes.
#[derive(Debug, Serialize)]
pub struct CategoryOptionView {
    pub id: CategoryId,
    pub name: String,
}

impl From<&CategoryOption> for CategoryOptionView {
    fn from(option: &CategoryOption) -> Self {
        Self {
            id: option.id,
            name: option.name.clone(),
        }
    }
}

/// All categories, ordered by name.
///
/// GET /categories
///
/// # Errors
///
/// Returns `AppError` if the query fails.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<CategoryOptionView>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories.iter().map(CategoryOptionView::from).collect()))
}
