//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{
    CategoryRepository, RepositoryError,
    categories::{CategoryNode, build_tree},
};

/// Cache key for the category tree.
const CATEGORY_TREE_KEY: &str = "category_tree";

/// How long a cached category tree stays fresh.
const CATEGORY_TREE_TTL: Duration = Duration::from_secs(300);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    category_cache: Cache<String, Arc<Vec<CategoryNode>>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let category_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_TREE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                category_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the category tree, cached for 5 minutes.
    ///
    /// Categories change through seeding and back-office edits only, so
    /// catalog and home pages tolerate a short staleness window in
    /// exchange for keeping the navigation query off the hot path.
    ///
    /// # Errors
    ///
    /// Returns an error if the categories cannot be loaded on a cache miss.
    pub async fn category_tree(&self) -> Result<Arc<Vec<CategoryNode>>, RepositoryError> {
        if let Some(tree) = self.inner.category_cache.get(CATEGORY_TREE_KEY).await {
            return Ok(tree);
        }

        let categories = CategoryRepository::new(self.pool()).list_all().await?;
        let tree = Arc::new(build_tree(categories));
        self.inner
            .category_cache
            .insert(CATEGORY_TREE_KEY.to_owned(), Arc::clone(&tree))
            .await;

        Ok(tree)
    }
}
