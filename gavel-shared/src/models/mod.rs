/// Database models
///
/// Each model owns its queries as associated functions taking a `&PgPool`.
///
/// # Models
///
/// - `user`: Accounts and the staff flag
/// - `category`: Listing categories
/// - `listing`: Listings, index/detail views, and the bid and close transitions
/// - `bid`: Append-only bids
/// - `comment`: Append-only comments
/// - `watchlist`: Per-user saved listings
///
/// # Example
///
/// ```no_run
/// use gavel_shared::models::{listing::Listing, watchlist::Watchlist};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, viewer: Uuid) -> Result<(), sqlx::Error> {
/// let active = Listing::list_active(&pool).await?;
/// let watching = Watchlist::count(&pool, viewer).await?;
/// println!("{} active listings, watching {}", active.len(), watching);
/// # Ok(())
/// # }
/// ```

pub mod bid;
pub mod category;
pub mod comment;
pub mod listing;
pub mod user;
pub mod watchlist;
