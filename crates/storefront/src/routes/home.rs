//! Home page route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::routes::products::{CategoryTreeView, ProductCardView};
use crate::state::AppState;

/// Number of products per home page rail.
const PRODUCTS_PER_RAIL: i64 = 8;

/// Home page payload: the featured and newest product rails plus the
/// category tree for navigation.
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub featured: Vec<ProductCardView>,
    pub new_arrivals: Vec<ProductCardView>,
    pub categories: Vec<CategoryTreeView>,
}

/// Display the home page.
///
/// GET /
///
/// # Errors
///
/// Returns `AppError` if the products or categories cannot be loaded.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeView>> {
    let products = ProductRepository::new(state.pool());

    let featured = products.featured(PRODUCTS_PER_RAIL).await?;
    let new_arrivals = products.latest(PRODUCTS_PER_RAIL).await?;
    let categories = state.category_tree().await?;

    Ok(Json(HomeView {
        featured: featured.iter().map(ProductCardView::from).collect(),
        new_arrivals: new_arrivals.iter().map(ProductCardView::from).collect(),
        categories: categories.iter().map(CategoryTreeView::from).collect(),
    }))
}
