/// Comment model
///
/// Comments are append-only; the timestamp is set by the database.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: Uuid,
    pub listing_id: i64,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// A comment with its author's name, as shown on the listing page
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: i64,
    pub username: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl Comment {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        listing_id: i64,
        text: &str,
    ) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (user_id, listing_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, listing_id, timestamp, text
            "#,
        )
        .bind(user_id)
        .bind(listing_id)
        .bind(text)
        .fetch_one(pool)
        .await?;

        tracing::info!(comment_id = comment.id, listing_id, user_id = %user_id, "Comment posted");
        Ok(comment)
    }

    /// Comments on a listing, newest first
    pub async fn list_for_listing(
        pool: &PgPool,
        listing_id: i64,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, u.username, c.timestamp, c.text
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.listing_id = $1
            ORDER BY c.timestamp DESC, c.id DESC
            "#,
        )
        .bind(listing_id)
        .fetch_all(pool)
        .await
    }
}
