/// Listing form actions
///
/// The listing page posts one form with several optional fields. Which one is
/// present decides the action. Resolution happens once, up front, so handlers
/// match on a [`ListingAction`] instead of probing the form.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::money;

/// Maximum comment length in characters
pub const COMMENT_MAX_CHARS: usize = 100;

/// Raw form submitted to `POST /listing/:id`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListingForm {
    pub bid: Option<String>,
    pub comment: Option<String>,
    pub watchlist: Option<String>,
    pub close: Option<String>,
}

/// What a listing form submission asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingAction {
    PlaceBid { amount: Decimal },
    PostComment { text: String },
    ToggleWatchlist,
    CloseListing,
}

/// Why a form could not be turned into an action
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Invalid bid amount.")]
    InvalidBidAmount,

    #[error("This field is required.")]
    BlankComment,

    #[error("Ensure this value has at most {max} characters (it has {actual}).")]
    CommentTooLong { max: usize, actual: usize },

    #[error("Unrecognized action.")]
    Unrecognized,
}

impl ListingAction {
    /// Resolves a submitted form
    ///
    /// Precedence is bid, comment, watchlist, close. A field holding only
    /// whitespace counts as absent.
    ///
    /// # Errors
    ///
    /// - [`ActionError::InvalidBidAmount`] if the bid does not fit a price column
    /// - [`ActionError::CommentTooLong`] for comments over 100 characters
    /// - [`ActionError::Unrecognized`] if no known field is present
    pub fn from_form(form: &ListingForm) -> Result<Self, ActionError> {
        if let Some(raw) = present(&form.bid) {
            let amount = money::parse_price(raw).map_err(|_| ActionError::InvalidBidAmount)?;
            return Ok(ListingAction::PlaceBid { amount });
        }

        if let Some(text) = present(&form.comment) {
            let text = text.trim();
            let actual = text.chars().count();
            if actual > COMMENT_MAX_CHARS {
                return Err(ActionError::CommentTooLong {
                    max: COMMENT_MAX_CHARS,
                    actual,
                });
            }
            return Ok(ListingAction::PostComment {
                text: text.to_string(),
            });
        }

        if present(&form.watchlist).is_some() {
            return Ok(ListingAction::ToggleWatchlist);
        }

        if present(&form.close).is_some() {
            return Ok(ListingAction::CloseListing);
        }

        // A comment field submitted empty is a blank comment, not an unknown action
        if form.comment.is_some() {
            return Err(ActionError::BlankComment);
        }

        Err(ActionError::Unrecognized)
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ListingAction::PlaceBid { .. } => "place_bid",
            ListingAction::PostComment { .. } => "post_comment",
            ListingAction::ToggleWatchlist => "toggle_watchlist",
            ListingAction::CloseListing => "close_listing",
        }
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}
