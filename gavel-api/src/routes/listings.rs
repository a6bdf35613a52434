/// Listing endpoints
///
/// - `GET  /` - Active listings, newest first
/// - `GET  /create` - New listing form (login required)
/// - `POST /create` - Create a listing (login required)
/// - `GET  /listing/:id` - Listing page
/// - `POST /listing/:id` - Bid, comment, toggle watchlist or close (login required)
///
/// Form failures do not return a bare error: the same page is sent back with
/// the message and the error's status code, so the form can be redisplayed.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::pages::{Alert, IndexPage},
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use gavel_shared::{
    auction::{money, ListingAction, ListingForm},
    auth::middleware::AuthContext,
    models::{
        category::Category,
        comment::{Comment, CommentView},
        listing::{CreateListing, Listing, ListingDetail},
        watchlist::Watchlist,
    },
    validation::ListingDraft,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const LISTING_NOT_FOUND: &str = "404 Listing not found.";

/// The listing page
#[derive(Debug, Serialize)]
pub struct ListingPage {
    pub title: String,

    /// Absent when the listing does not exist
    pub listing: Option<ListingDetail>,

    pub number_of_bids: i64,

    /// Current bid, or the starting bid when there are none
    pub price: Option<Decimal>,

    /// Percent the price has risen over the starting bid
    pub increase: Decimal,

    pub in_watchlist: bool,
    pub is_owner: bool,

    /// Newest first
    pub comments: Vec<CommentView>,
    pub number_of_comments: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<Alert>,

    pub watchlist_count: i64,
}

impl ListingPage {
    fn not_found(watchlist_count: i64) -> Self {
        Self {
            title: "Listing not found".to_string(),
            listing: None,
            number_of_bids: 0,
            price: None,
            increase: Decimal::ZERO,
            in_watchlist: false,
            is_owner: false,
            comments: Vec::new(),
            number_of_comments: 0,
            message: Some(LISTING_NOT_FOUND.to_string()),
            alert_type: Some(Alert::Danger),
            watchlist_count,
        }
    }

    fn with_message(mut self, message: String, alert: Alert) -> Self {
        self.message = Some(message);
        self.alert_type = Some(alert);
        self
    }
}

/// The new listing form
#[derive(Debug, Serialize)]
pub struct CreateListingPage {
    pub title: &'static str,
    pub categories: Vec<Category>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub watchlist_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateListingForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub starting_bid: String,

    pub image: Option<String>,

    /// Category id; blank means uncategorized
    pub category: Option<String>,
}

/// Active listings, newest first
pub async fn index(
    State(state): State<AppState>,
    viewer: Option<AuthContext>,
) -> ApiResult<Json<IndexPage>> {
    let listings = Listing::list_active(&state.db).await?;

    let page = IndexPage::new("Auctions", "Active Listings", listings)
        .for_viewer(&state.db, viewer.map(|v| v.user_id))
        .await?;

    Ok(Json(page))
}

pub async fn create_page(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<CreateListingPage>> {
    Ok(Json(create_form(&state.db, auth.user_id, None).await?))
}

/// Creates a listing
///
/// Checks run in this order and the first failing step is reported:
/// 1. the price parses as a decimal (400 "Invalid price.")
/// 2. the category, if given, exists (400 "Invalid category.")
/// 3. field checks and the image URL probe (422, all messages joined)
///
/// # Response
///
/// `201 Created` with `Location: /listing/<id>` and the new listing.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    Form(form): Form<CreateListingForm>,
) -> ApiResult<Response> {
    match create_listing(&state, &auth, form).await {
        Ok(listing) => {
            let location = format!("/listing/{}", listing.id);
            Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(listing)).into_response())
        }
        Err(err @ ApiError::InternalError(_)) => Err(err),
        Err(err) => {
            tracing::debug!(user_id = %auth.user_id, error = %err, "Listing rejected");
            let page = create_form(&state.db, auth.user_id, Some(err.user_message())).await?;
            Ok((err.status_code(), Json(page)).into_response())
        }
    }
}

async fn create_listing(
    state: &AppState,
    auth: &AuthContext,
    form: CreateListingForm,
) -> ApiResult<Listing> {
    let starting_bid = money::parse_decimal(&form.starting_bid)
        .map_err(|_| ApiError::BadRequest("Invalid price.".to_string()))?;

    let category_id = match form.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let id = raw.parse::<i64>().map_err(|_| invalid_category())?;
            let category = Category::find_by_id(&state.db, id)
                .await?
                .ok_or_else(invalid_category)?;
            Some(category.id)
        }
    };

    let draft = ListingDraft::new(
        &form.title,
        &form.description,
        starting_bid,
        form.image.as_deref(),
    );
    draft
        .check(state.image_probe.as_ref())
        .await
        .map_err(ApiError::ValidationError)?;

    let listing = Listing::create(
        &state.db,
        CreateListing {
            owner_id: auth.user_id,
            title: draft.title,
            description: draft.description,
            starting_bid: money::with_cents(draft.starting_bid),
            image: draft.image,
            category_id,
        },
    )
    .await
    .map_err(ApiError::from_listing_insert)?;

    Ok(listing)
}

fn invalid_category() -> ApiError {
    ApiError::BadRequest("Invalid category.".to_string())
}

async fn create_form(db: &PgPool, user_id: Uuid, message: Option<String>) -> ApiResult<CreateListingPage> {
    Ok(CreateListingPage {
        title: "Create Listing",
        categories: Category::list(db).await?,
        message,
        watchlist_count: Watchlist::count(db, user_id).await?,
    })
}

/// Listing page
///
/// An unknown id answers 404 with the page message "404 Listing not found.".
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    viewer: Option<AuthContext>,
) -> ApiResult<Response> {
    let viewer = viewer.map(|v| v.user_id);

    match parse_id(&id) {
        Some(id) => match listing_page(&state.db, id, viewer).await? {
            Some(page) => Ok(Json(page).into_response()),
            None => not_found(&state.db, viewer).await,
        },
        None => not_found(&state.db, viewer).await,
    }
}

/// Applies one listing action and redisplays the page
///
/// The form field present decides the action: `bid`, then `comment`, then
/// `watchlist`, then `close`.
///
/// # Errors
///
/// Rejections redisplay the page with alert `danger` and:
/// - `400 Bad Request`: Invalid bid amount, unrecognized action
/// - `403 Forbidden`: Bidding on your own listing, closing someone else's
/// - `409 Conflict`: Bid too low, listing closed
/// - `422 Unprocessable Entity`: Blank or over-long comment
pub async fn act(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthContext,
    Form(form): Form<ListingForm>,
) -> ApiResult<Response> {
    let viewer = Some(auth.user_id);
    let Some(id) = parse_id(&id) else {
        return not_found(&state.db, viewer).await;
    };

    let (status, message, alert) = match perform(&state.db, id, &auth, &form).await {
        Ok((message, alert)) => (StatusCode::OK, message, alert),
        Err(ApiError::NotFound(_)) => return not_found(&state.db, viewer).await,
        Err(err @ ApiError::InternalError(_)) => return Err(err),
        Err(err) => (err.status_code(), err.user_message(), Alert::Danger),
    };

    match listing_page(&state.db, id, viewer).await? {
        Some(page) => Ok((status, Json(page.with_message(message, alert))).into_response()),
        None => not_found(&state.db, viewer).await,
    }
}

async fn perform(
    db: &PgPool,
    listing_id: i64,
    auth: &AuthContext,
    form: &ListingForm,
) -> ApiResult<(String, Alert)> {
    let action = ListingAction::from_form(form)?;
    tracing::debug!(listing_id, user_id = %auth.user_id, action = action.name(), "Listing action");

    let outcome = match action {
        ListingAction::PlaceBid { amount } => {
            Listing::place_bid(db, listing_id, auth.user_id, amount).await?;
            ("You have successfully placed your bid!", Alert::Success)
        }
        ListingAction::PostComment { text } => {
            if Listing::find_by_id(db, listing_id).await?.is_none() {
                return Err(ApiError::NotFound(LISTING_NOT_FOUND.to_string()));
            }
            Comment::create(db, auth.user_id, listing_id, &text).await?;
            ("Comment posted.", Alert::Primary)
        }
        ListingAction::ToggleWatchlist => {
            if Listing::find_by_id(db, listing_id).await?.is_none() {
                return Err(ApiError::NotFound(LISTING_NOT_FOUND.to_string()));
            }
            if Watchlist::toggle(db, auth.user_id, listing_id).await? {
                ("Listing added to watchlist.", Alert::Light)
            } else {
                ("Listing removed from watchlist.", Alert::Light)
            }
        }
        ListingAction::CloseListing => {
            Listing::close(db, listing_id, auth.user_id).await?;
            ("Listing closed.", Alert::Success)
        }
    };

    Ok((outcome.0.to_string(), outcome.1))
}

/// Builds the page, or `None` if the listing does not exist
async fn listing_page(db: &PgPool, id: i64, viewer: Option<Uuid>) -> ApiResult<Option<ListingPage>> {
    let Some(listing) = Listing::find_detail(db, id).await? else {
        return Ok(None);
    };

    let comments = Comment::list_for_listing(db, id).await?;
    let in_watchlist = match viewer {
        Some(user_id) => Watchlist::contains(db, user_id, id).await?,
        None => false,
    };

    Ok(Some(ListingPage {
        title: listing.title.clone(),
        number_of_bids: listing.bid_count,
        price: Some(listing.price()),
        increase: listing.increase_percent(),
        in_watchlist,
        is_owner: viewer.is_some_and(|user_id| listing.snapshot().is_owner(user_id)),
        number_of_comments: comments.len(),
        comments,
        message: None,
        alert_type: None,
        watchlist_count: Watchlist::count_for(db, viewer).await?,
        listing: Some(listing),
    }))
}

async fn not_found(db: &PgPool, viewer: Option<Uuid>) -> ApiResult<Response> {
    let page = ListingPage::not_found(Watchlist::count_for(db, viewer).await?);
    Ok((StatusCode::NOT_FOUND, Json(page)).into_response())
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}
