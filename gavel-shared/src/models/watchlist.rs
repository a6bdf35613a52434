/// Watchlist
///
/// Membership is a row in `watchlist (user_id, listing_id)`. Toggling deletes
/// the row if present and inserts it otherwise, so two toggles restore the
/// original state, concurrent ones included.

use sqlx::PgPool;
use uuid::Uuid;

use super::listing::{ListingSummary, SUMMARY_SELECT};

/// Watchlist queries
pub struct Watchlist;

impl Watchlist {
    /// Flips membership and returns whether the listing is now watched
    ///
    /// Runs in one transaction holding the user's row lock, so concurrent
    /// toggles by the same user are applied in turn.
    pub async fn toggle(pool: &PgPool, user_id: Uuid, listing_id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT 1 FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM watchlist WHERE user_id = $1 AND listing_id = $2")
            .bind(user_id)
            .bind(listing_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed > 0 {
            tx.commit().await?;
            tracing::debug!(user_id = %user_id, listing_id, "Removed from watchlist");
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO watchlist (user_id, listing_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(listing_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(user_id = %user_id, listing_id, "Added to watchlist");
        Ok(true)
    }

    pub async fn contains(pool: &PgPool, user_id: Uuid, listing_id: i64) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM watchlist WHERE user_id = $1 AND listing_id = $2)",
        )
        .bind(user_id)
        .bind(listing_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    pub async fn count(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM watchlist WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Count for an optional viewer; anonymous viewers have zero
    pub async fn count_for(pool: &PgPool, user_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        match user_id {
            Some(id) => Self::count(pool, id).await,
            None => Ok(0),
        }
    }

    /// Saved listings, newest first, closed ones included
    pub async fn listings(pool: &PgPool, user_id: Uuid) -> Result<Vec<ListingSummary>, sqlx::Error> {
        let sql = format!(
            "{SUMMARY_SELECT} JOIN watchlist wl ON wl.listing_id = l.id \
             WHERE wl.user_id = $1 ORDER BY l.date_listed DESC, l.id DESC"
        );

        sqlx::query_as::<_, ListingSummary>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
