/// Category model
///
/// Listings may reference a category. Deleting a category that still has
/// listings is refused by the `listings_category_fk` RESTRICT policy.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Longest category name
pub const NAME_MAX_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(category)
    }

    /// All categories, alphabetical
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name, id")
                .fetch_all(pool)
                .await?;

        Ok(categories)
    }

    /// Deletes a category
    ///
    /// Returns `Ok(false)` if it did not exist.
    ///
    /// # Errors
    ///
    /// Fails with a foreign-key violation on `listings_category_fk` while
    /// listings still reference the category.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
