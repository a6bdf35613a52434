/// Page bodies shared by several handlers
///
/// Every page reports the viewer's watchlist count, which is zero for
/// anonymous visitors.

use gavel_shared::models::{category::Category, listing::ListingSummary, watchlist::Watchlist};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiResult;

/// Bootstrap-style alert class for the page message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alert {
    Success,
    Primary,
    Light,
    Danger,
}

/// A list of listings: the index, a category, the watchlist
#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub title: String,
    pub heading: String,
    pub listings: Vec<ListingSummary>,

    /// Present on the category index only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub watchlist_count: i64,
}

impl IndexPage {
    pub fn new(title: impl Into<String>, heading: impl Into<String>, listings: Vec<ListingSummary>) -> Self {
        Self {
            title: title.into(),
            heading: heading.into(),
            listings,
            categories: None,
            message: None,
            watchlist_count: 0,
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Fills in the viewer's watchlist count
    pub async fn for_viewer(mut self, db: &PgPool, viewer: Option<Uuid>) -> ApiResult<Self> {
        self.watchlist_count = Watchlist::count_for(db, viewer).await?;
        Ok(self)
    }
}
