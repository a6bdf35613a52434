/// Category endpoints
///
/// - `GET    /categories` - All categories plus active uncategorized listings
/// - `POST   /categories` - Create a category (staff)
/// - `GET    /categories/:id` - Active listings in a category
/// - `DELETE /categories/:id` - Delete an unused category (staff)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::pages::IndexPage,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use gavel_shared::{
    auth::{authorization::require_staff, middleware::AuthContext},
    models::{category::Category, listing::Listing},
    validation::field_errors_in_order,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const NO_SUCH_CATEGORY: &str = "No such category";

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "Name must be between 1 and 20 characters."))]
    pub name: String,
}

pub async fn index(
    State(state): State<AppState>,
    viewer: Option<AuthContext>,
) -> ApiResult<Json<IndexPage>> {
    let page = category_index(&state.db, viewer.map(|v| v.user_id)).await?;
    Ok(Json(page))
}

/// Active listings in one category
///
/// An unknown category falls back to the category index with the message
/// "No such category" and status 404.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    viewer: Option<AuthContext>,
) -> ApiResult<Response> {
    let viewer = viewer.map(|v| v.user_id);

    let category = match id.parse::<i64>() {
        Ok(id) => Category::find_by_id(&state.db, id).await?,
        Err(_) => None,
    };

    let Some(category) = category else {
        let page = category_index(&state.db, viewer)
            .await?
            .with_message(NO_SUCH_CATEGORY);
        return Ok((StatusCode::NOT_FOUND, Json(page)).into_response());
    };

    let listings = Listing::list_active_in_category(&state.db, category.id).await?;
    let page = IndexPage::new(
        category.name.clone(),
        format!("Active listings in {}", category.name),
        listings,
    )
    .for_viewer(&state.db, viewer)
    .await?;

    Ok(Json(page).into_response())
}

/// Creates a category
///
/// # Errors
///
/// - `403 Forbidden`: Not a staff user
/// - `422 Unprocessable Entity`: Name blank or over 20 characters
pub async fn create(
    State(state): State<AppState>,
    auth: AuthContext,
    Form(mut form): Form<CategoryForm>,
) -> ApiResult<Response> {
    let staff = require_staff(&state.db, &auth).await?;

    form.name = form.name.trim().to_string();
    form.validate()
        .map_err(|e| ApiError::ValidationError(field_errors_in_order(&e, &["name"])))?;

    let category = Category::create(&state.db, &form.name).await?;
    tracing::info!(category_id = category.id, staff_id = %staff.id, "Category created");

    let location = format!("/categories/{}", category.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(category)).into_response())
}

/// Deletes a category
///
/// # Errors
///
/// - `403 Forbidden`: Not a staff user
/// - `404 Not Found`: No such category
/// - `409 Conflict`: Listings still reference the category
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth: AuthContext,
) -> ApiResult<StatusCode> {
    let staff = require_staff(&state.db, &auth).await?;

    let id = id
        .parse::<i64>()
        .map_err(|_| ApiError::NotFound(NO_SUCH_CATEGORY.to_string()))?;

    if !Category::delete(&state.db, id).await? {
        return Err(ApiError::NotFound(NO_SUCH_CATEGORY.to_string()));
    }

    tracing::info!(category_id = id, staff_id = %staff.id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn category_index(db: &PgPool, viewer: Option<Uuid>) -> ApiResult<IndexPage> {
    let categories = Category::list(db).await?;
    let listings = Listing::list_active_uncategorized(db).await?;

    IndexPage::new("Categories", "Active uncategorized items", listings)
        .with_categories(categories)
        .for_viewer(db, viewer)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_shared::models::category::NAME_MAX_CHARS;

    #[test]
    fn test_category_name_bounds() {
        let form = CategoryForm {
            name: "Antiques".to_string(),
        };
        assert!(form.validate().is_ok());

        let form = CategoryForm {
            name: String::new(),
        };
        assert!(form.validate().is_err());

        let form = CategoryForm {
            name: "x".repeat(NAME_MAX_CHARS),
        };
        assert!(form.validate().is_ok());

        let form = CategoryForm {
            name: "x".repeat(NAME_MAX_CHARS + 1),
        };
        let errors = field_errors_in_order(&form.validate().unwrap_err(), &["name"]);
        assert_eq!(
            errors[0].message,
            format!("Name must be between 1 and {} characters.", NAME_MAX_CHARS)
        );
    }
}
