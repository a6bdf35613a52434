/// Listing state machine
///
/// A listing is in one of three states:
///
/// ```text
///   ActiveNoBids ──bid──> ActiveWithBids ──bid──> ActiveWithBids
///        │                      │
///        └───────close──────────┴──────> Closed (terminal)
/// ```
///
/// The checks here run against an [`AuctionSnapshot`] read under a row lock,
/// so a passing check is still true when the write happens.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

use super::money::with_cents;

/// Lifecycle state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionState {
    ActiveNoBids,
    ActiveWithBids,
    Closed,
}

/// Why the auction rules refused an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuctionError {
    #[error("You cannot bid on your own listing.")]
    OwnListing,

    #[error("This listing is closed and no longer accepts bids.")]
    Closed,

    #[error("You can only bid for the value greater than the current price.")]
    BidTooLow,

    #[error("Unauthorized user.")]
    NotOwner,

    #[error("This listing is already closed.")]
    AlreadyClosed,
}

/// The parts of a listing the rules look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionSnapshot {
    pub owner_id: Uuid,
    pub active: bool,
    pub starting_bid: Decimal,
    /// Price of the leading bid, if any
    pub current_bid: Option<Decimal>,
}

impl AuctionSnapshot {
    pub fn state(&self) -> AuctionState {
        match (self.active, self.current_bid) {
            (false, _) => AuctionState::Closed,
            (true, None) => AuctionState::ActiveNoBids,
            (true, Some(_)) => AuctionState::ActiveWithBids,
        }
    }

    /// Leading bid price, or the starting bid when nobody has bid yet
    pub fn current_price(&self) -> Decimal {
        self.current_bid.unwrap_or(self.starting_bid)
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Checks whether `bidder` may bid `amount`
///
/// # Errors
///
/// Checked in this order:
/// - [`AuctionError::OwnListing`] if the bidder owns the listing
/// - [`AuctionError::Closed`] if the listing is no longer active
/// - [`AuctionError::BidTooLow`] unless `amount` is strictly greater than the current price
pub fn check_bid(
    snapshot: &AuctionSnapshot,
    bidder: Uuid,
    amount: Decimal,
) -> Result<(), AuctionError> {
    if snapshot.is_owner(bidder) {
        return Err(AuctionError::OwnListing);
    }
    if snapshot.state() == AuctionState::Closed {
        return Err(AuctionError::Closed);
    }
    if amount <= snapshot.current_price() {
        return Err(AuctionError::BidTooLow);
    }
    Ok(())
}

/// Checks whether `actor` may close the listing
///
/// # Errors
///
/// - [`AuctionError::NotOwner`] if the actor is not the owner
/// - [`AuctionError::AlreadyClosed`] if the listing is already closed
pub fn check_close(snapshot: &AuctionSnapshot, actor: Uuid) -> Result<(), AuctionError> {
    if !snapshot.is_owner(actor) {
        return Err(AuctionError::NotOwner);
    }
    if snapshot.state() == AuctionState::Closed {
        return Err(AuctionError::AlreadyClosed);
    }
    Ok(())
}

/// Percentage increase of `price` over `starting`, half-even to two places
///
/// Returns zero when the starting price is zero.
pub fn increase_percent(starting: Decimal, price: Decimal) -> Decimal {
    if starting.is_zero() {
        return with_cents(Decimal::ZERO);
    }

    let percent = (price - starting) / starting * Decimal::ONE_HUNDRED;
    with_cents(percent.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
}
