/// Auction domain logic
///
/// Everything in this module is pure: it works on values loaded from the
/// database and never performs I/O. The models call into it while holding a
/// row lock, so the same rules decide both what the UI shows and what the
/// storage layer accepts.
///
/// # Modules
///
/// - [`money`]: Parsing and bounds checks for decimal prices
/// - [`rules`]: Listing state machine, bid and close rules, derived display values
/// - [`action`]: Resolves a listing form submission into a [`action::ListingAction`]

pub mod action;
pub mod money;
pub mod rules;

pub use action::{ActionError, ListingAction, ListingForm};
pub use money::AmountError;
pub use rules::{AuctionError, AuctionSnapshot, AuctionState};
