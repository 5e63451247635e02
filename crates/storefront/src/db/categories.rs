//! Category reads and navigation tree assembly.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use techhub_core::CategoryId;

use super::RepositoryError;

/// A category as stored in `shop.categories`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub parent_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A top-level category together with its children, ready for navigation.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<Category>,
}

/// Group a flat category list into top-level nodes with their children.
///
/// Input order is preserved, so callers that fetch rows ordered by
/// `sort_order` get ordered nodes and ordered children. A child whose parent
/// is missing from the input is dropped.
#[must_use]
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let (roots, children): (Vec<_>, Vec<_>) = categories
        .into_iter()
        .partition(|category| category.parent_id.is_none());

    let mut nodes: Vec<CategoryNode> = roots
        .into_iter()
        .map(|category| CategoryNode {
            category,
            children: Vec::new(),
        })
        .collect();

    for child in children {
        if let Some(node) = nodes
            .iter_mut()
            .find(|node| Some(node.category.id) == child.parent_id)
        {
            node.children.push(child);
        }
    }

    nodes
}

/// Read access to categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered for display.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, parent_id, name, slug, sort_order, created_at, updated_at \
             FROM shop.categories ORDER BY sort_order, name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Look up one category by slug.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, parent_id, name, slug, sort_order, created_at, updated_at \
             FROM shop.categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }

    /// Look up one category by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, parent_id, name, slug, sort_order, created_at, updated_at \
             FROM shop.categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn category(id: i64, parent_id: Option<i64>, name: &str, sort_order: i32) -> Category {
        Category {
            id: CategoryId::new(id),
            parent_id: parent_id.map(CategoryId::new),
            name: name.to_owned(),
            slug: name.to_lowercase().replace(' ', "-"),
            sort_order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_tree_groups_children_under_parents() {
        let tree = build_tree(vec![
            category(1, None, "Gaming", 1),
            category(2, None, "Audio", 2),
            category(3, Some(1), "Consoles", 1),
            category(4, Some(1), "Controllers", 2),
            category(5, Some(2), "Headphones", 1),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.name, "Gaming");
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[1].name, "Controllers");
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].name, "Headphones");
    }

    #[test]
    fn test_build_tree_preserves_input_order() {
        let tree = build_tree(vec![
            category(2, None, "Audio", 1),
            category(1, None, "Gaming", 2),
        ]);
        assert_eq!(tree[0].category.name, "Audio");
        assert_eq!(tree[1].category.name, "Gaming");
    }

    #[test]
    fn test_build_tree_drops_orphans() {
        let tree = build_tree(vec![
            category(1, None, "Gaming", 1),
            category(9, Some(42), "Lost", 1),
        ]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_build_tree_empty_input() {
        assert!(build_tree(Vec::new()).is_empty());
    }
}
