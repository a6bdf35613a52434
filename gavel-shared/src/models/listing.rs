/// Listing model and auction transitions
///
/// Reads come in two shapes: [`ListingSummary`] for index pages and
/// [`ListingDetail`] for the listing page. Bidding and closing run in a
/// transaction holding `FOR UPDATE` on the listing row, and the auction rules
/// are evaluated against that locked row. Concurrent bids on one listing are
/// therefore applied one at a time, each against the price the previous one
/// left behind.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE listings (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(40) NOT NULL,
///     description VARCHAR(250) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     starting_bid NUMERIC(11, 2) NOT NULL CHECK (starting_bid > 0),
///     image VARCHAR(200),
///     category_id BIGINT REFERENCES categories(id) ON DELETE RESTRICT,
///     current_bid_id BIGINT REFERENCES bids(id) ON DELETE SET NULL,
///     date_listed TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     winner_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     active BOOLEAN NOT NULL DEFAULT TRUE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use gavel_shared::models::listing::Listing;
/// use rust_decimal::Decimal;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, bidder: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let bid = Listing::place_bid(&pool, 42, bidder, Decimal::new(15000, 2)).await?;
/// println!("bid {} accepted at {}", bid.id, bid.price);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::bid::Bid;
use crate::auction::rules::{self, AuctionError, AuctionSnapshot, AuctionState};

/// A row of `listings`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    pub starting_bid: Decimal,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub current_bid_id: Option<i64>,
    pub date_listed: DateTime<Utc>,
    pub winner_id: Option<Uuid>,
    pub active: bool,
}

/// Input for creating a listing; fields are already validated
#[derive(Debug, Clone)]
pub struct CreateListing {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub starting_bid: Decimal,
    pub image: Option<String>,
    pub category_id: Option<i64>,
}

/// One line of an index page
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ListingSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub starting_bid: Decimal,
    /// Leading bid, or the starting bid
    pub price: Decimal,
    pub category_id: Option<i64>,
    pub owner_username: String,
    pub date_listed: DateTime<Utc>,
    pub active: bool,
}

/// Everything the listing page shows about the listing itself
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ListingDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub starting_bid: Decimal,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub current_bid_id: Option<i64>,
    pub current_bid_price: Option<Decimal>,
    pub current_bidder_id: Option<Uuid>,
    pub date_listed: DateTime<Utc>,
    pub winner_id: Option<Uuid>,
    pub winner_username: Option<String>,
    pub active: bool,
    pub bid_count: i64,
}

impl ListingDetail {
    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            owner_id: self.owner_id,
            active: self.active,
            starting_bid: self.starting_bid,
            current_bid: self.current_bid_price,
        }
    }

    pub fn state(&self) -> AuctionState {
        self.snapshot().state()
    }

    pub fn price(&self) -> Decimal {
        self.snapshot().current_price()
    }

    /// Percent the price has risen over the starting bid
    pub fn increase_percent(&self) -> Decimal {
        rules::increase_percent(self.starting_bid, self.price())
    }
}

/// Listing row as read under `FOR UPDATE`
#[derive(Debug, sqlx::FromRow)]
struct LockedListing {
    owner_id: Uuid,
    active: bool,
    starting_bid: Decimal,
    current_bid_price: Option<Decimal>,
    current_bidder_id: Option<Uuid>,
}

impl LockedListing {
    fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            owner_id: self.owner_id,
            active: self.active,
            starting_bid: self.starting_bid,
            current_bid: self.current_bid_price,
        }
    }
}

/// Error type for listing transitions
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("404 Listing not found.")]
    NotFound,

    /// The auction rules refused the action
    #[error(transparent)]
    Rejected(#[from] AuctionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const LISTING_COLUMNS: &str = "id, title, description, owner_id, starting_bid, image, category_id, \
     current_bid_id, date_listed, winner_id, active";

pub(crate) const SUMMARY_SELECT: &str = r#"
    SELECT l.id, l.title, l.description, l.image, l.starting_bid,
           COALESCE(b.price, l.starting_bid) AS price,
           l.category_id, o.username AS owner_username, l.date_listed, l.active
    FROM listings l
    JOIN users o ON o.id = l.owner_id
    LEFT JOIN bids b ON b.id = l.current_bid_id
"#;

/// Name of the foreign key from `listings.category_id` to `categories`
pub const CATEGORY_FK_CONSTRAINT: &str = "listings_category_fk";

impl Listing {
    /// Inserts an active listing with no bids
    ///
    /// # Errors
    ///
    /// Fails with a foreign-key violation on [`CATEGORY_FK_CONSTRAINT`] if the
    /// category was deleted in the meantime.
    pub async fn create(pool: &PgPool, data: CreateListing) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO listings (owner_id, title, description, starting_bid, image, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LISTING_COLUMNS}
            "#
        );

        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(data.owner_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.starting_bid)
            .bind(data.image)
            .bind(data.category_id)
            .fetch_one(pool)
            .await?;

        tracing::info!(listing_id = listing.id, owner_id = %listing.owner_id, "Listing created");
        Ok(listing)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");

        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(listing)
    }

    /// Loads the listing page view with owner, category, leading bid and winner
    pub async fn find_detail(pool: &PgPool, id: i64) -> Result<Option<ListingDetail>, sqlx::Error> {
        let detail = sqlx::query_as::<_, ListingDetail>(
            r#"
            SELECT l.id, l.title, l.description, l.owner_id, o.username AS owner_username,
                   l.starting_bid, l.image, l.category_id, c.name AS category_name,
                   l.current_bid_id, b.price AS current_bid_price, b.user_id AS current_bidder_id,
                   l.date_listed, l.winner_id, w.username AS winner_username, l.active,
                   (SELECT COUNT(*) FROM bids WHERE bids.listing_id = l.id) AS bid_count
            FROM listings l
            JOIN users o ON o.id = l.owner_id
            LEFT JOIN categories c ON c.id = l.category_id
            LEFT JOIN bids b ON b.id = l.current_bid_id
            LEFT JOIN users w ON w.id = l.winner_id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(detail)
    }

    /// Active listings, newest first
    pub async fn list_active(pool: &PgPool) -> Result<Vec<ListingSummary>, sqlx::Error> {
        let sql = format!("{SUMMARY_SELECT} WHERE l.active ORDER BY l.date_listed DESC, l.id DESC");

        sqlx::query_as::<_, ListingSummary>(&sql).fetch_all(pool).await
    }

    /// Active listings in one category, newest first
    pub async fn list_active_in_category(
        pool: &PgPool,
        category_id: i64,
    ) -> Result<Vec<ListingSummary>, sqlx::Error> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE l.active AND l.category_id = $1 \
             ORDER BY l.date_listed DESC, l.id DESC"
        );

        sqlx::query_as::<_, ListingSummary>(&sql)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Active listings without a category, newest first
    pub async fn list_active_uncategorized(pool: &PgPool) -> Result<Vec<ListingSummary>, sqlx::Error> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE l.active AND l.category_id IS NULL \
             ORDER BY l.date_listed DESC, l.id DESC"
        );

        sqlx::query_as::<_, ListingSummary>(&sql).fetch_all(pool).await
    }

    /// Places a bid and makes it the leading bid
    ///
    /// # Errors
    ///
    /// - `ListingError::NotFound` if the listing does not exist
    /// - `ListingError::Rejected` with the [`AuctionError`] from
    ///   [`rules::check_bid`]; nothing is written in that case
    pub async fn place_bid(
        pool: &PgPool,
        listing_id: i64,
        bidder_id: Uuid,
        amount: Decimal,
    ) -> Result<Bid, ListingError> {
        let mut tx = pool.begin().await?;

        let locked = lock(&mut tx, listing_id).await?;
        if let Err(rejection) = rules::check_bid(&locked.snapshot(), bidder_id, amount) {
            tracing::debug!(listing_id, bidder_id = %bidder_id, %amount, reason = %rejection, "Bid rejected");
            return Err(rejection.into());
        }

        let bid = sqlx::query_as::<_, Bid>(
            r#"
            INSERT INTO bids (user_id, listing_id, price)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, listing_id, price, placed_at
            "#,
        )
        .bind(bidder_id)
        .bind(listing_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE listings SET current_bid_id = $2 WHERE id = $1")
            .bind(listing_id)
            .bind(bid.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            listing_id,
            bid_id = bid.id,
            bidder_id = %bidder_id,
            price = %bid.price,
            "Bid placed"
        );
        Ok(bid)
    }

    /// Closes the listing; the leading bidder, if any, becomes the winner
    ///
    /// # Errors
    ///
    /// - `ListingError::NotFound` if the listing does not exist
    /// - `ListingError::Rejected` with the [`AuctionError`] from [`rules::check_close`]
    pub async fn close(pool: &PgPool, listing_id: i64, actor_id: Uuid) -> Result<Self, ListingError> {
        let mut tx = pool.begin().await?;

        let locked = lock(&mut tx, listing_id).await?;
        if let Err(rejection) = rules::check_close(&locked.snapshot(), actor_id) {
            tracing::debug!(listing_id, actor_id = %actor_id, reason = %rejection, "Close rejected");
            return Err(rejection.into());
        }

        let sql = format!(
            "UPDATE listings SET active = FALSE, winner_id = $2 WHERE id = $1 RETURNING {LISTING_COLUMNS}"
        );
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(listing_id)
            .bind(locked.current_bidder_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            listing_id,
            winner_id = ?listing.winner_id,
            "Listing closed"
        );
        Ok(listing)
    }
}

async fn lock(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    listing_id: i64,
) -> Result<LockedListing, ListingError> {
    sqlx::query_as::<_, LockedListing>(
        r#"
        SELECT l.owner_id, l.active, l.starting_bid,
               b.price AS current_bid_price, b.user_id AS current_bidder_id
        FROM listings l
        LEFT JOIN bids b ON b.id = l.current_bid_id
        WHERE l.id = $1
        FOR UPDATE OF l
        "#,
    )
    .bind(listing_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(ListingError::NotFound)
}
