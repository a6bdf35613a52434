/// Bid model
///
/// Bids are append-only: they are inserted by
/// [`Listing::place_bid`](super::listing::Listing::place_bid) and a trigger
/// rejects any UPDATE.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub user_id: Uuid,
    pub listing_id: i64,
    pub price: Decimal,
    pub placed_at: DateTime<Utc>,
}
