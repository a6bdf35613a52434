/// Watchlist endpoint
///
/// `GET /watchlist` lists the listings the user saved, newest first. Closed
/// listings stay on the watchlist so the user can see how they ended.

use crate::{app::AppState, error::ApiResult, routes::pages::IndexPage};
use axum::{extract::State, Json};
use gavel_shared::{auth::middleware::AuthContext, models::watchlist::Watchlist};

pub async fn watchlist(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<IndexPage>> {
    let listings = Watchlist::listings(&state.db, auth.user_id).await?;
    let count = listings.len() as i64;

    let mut page = IndexPage::new(
        format!("{}'s watchlist", auth.username),
        "Your watchlist",
        listings,
    );
    page.watchlist_count = count;

    Ok(Json(page))
}
