/// Error handling for the API server
///
/// `ApiError` is the one error type handlers return. Domain errors from
/// `gavel-shared` convert into it with `?`, each mapped to a status code and
/// the message the user sees. Pages that redisplay themselves on failure read
/// [`ApiError::status_code`] and [`ApiError::user_message`] instead of
/// returning the error.
///
/// # Example
///
/// ```no_run
/// use gavel_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(ApiError::NotFound("404 Listing not found.".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gavel_shared::{
    auction::{ActionError, AmountError, AuctionError},
    auth::{
        authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError,
    },
    db::integrity,
    models::{
        listing::{ListingError, CATEGORY_FK_CONSTRAINT},
        user::USERNAME_UNIQUE_CONSTRAINT,
    },
    validation::{join_messages, FieldError, ImageUrlError},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Postgres SQLSTATE for unique violations
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for foreign-key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409): duplicate username, closed listing, referenced category
    Conflict(String),

    /// Unprocessable entity (422): field validation
    ValidationError(Vec<FieldError>),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

impl From<FieldError> for ValidationErrorDetail {
    fn from(error: FieldError) -> Self {
        Self {
            field: error.field,
            message: error.message,
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }

    /// The message shown on the page
    ///
    /// Validation failures are joined into one sentence-per-problem string.
    /// Internal details are never shown.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::ValidationError(errors) => join_messages(errors),
            ApiError::InternalError(_) => "An internal error occurred".to_string(),
        }
    }

    /// Logs internal errors; call once before rendering an error page
    pub fn log(&self) {
        if let ApiError::InternalError(msg) = self {
            tracing::error!("Internal error: {}", msg);
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error = self.error_code().to_string();
        let message = self.user_message();
        let details = match self {
            ApiError::ValidationError(errors) => {
                Some(errors.into_iter().map(ValidationErrorDetail::from).collect())
            }
            _ => None,
        };

        let body = Json(ErrorResponse {
            error,
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code();
                let constraint = db_err.constraint();

                match (code.as_deref(), constraint) {
                    (Some(UNIQUE_VIOLATION), Some(USERNAME_UNIQUE_CONSTRAINT)) => {
                        ApiError::Conflict("Username already taken.".to_string())
                    }
                    (Some(UNIQUE_VIOLATION), Some(name)) => {
                        ApiError::Conflict(format!("Constraint violation: {}", name))
                    }
                    (Some(FOREIGN_KEY_VIOLATION), Some(name)) => match integrity::relation(name) {
                        Some(relation) => ApiError::Conflict(relation.violation_message()),
                        None => ApiError::Conflict(format!("Constraint violation: {}", name)),
                    },
                    _ => ApiError::InternalError(format!("Database error: {}", db_err)),
                }
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl ApiError {
    /// Maps a failed listing insert
    ///
    /// A category deleted between lookup and insert is reported the way an
    /// unknown category is, not as a blocked category delete.
    pub fn from_listing_insert(err: sqlx::Error) -> Self {
        let missing_category = err.as_database_error().is_some_and(|db_err| {
            db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
                && db_err.constraint() == Some(CATEGORY_FK_CONSTRAINT)
        });

        if missing_category {
            ApiError::BadRequest("Invalid category.".to_string())
        } else {
            err.into()
        }
    }
}

impl From<AuctionError> for ApiError {
    fn from(err: AuctionError) -> Self {
        let message = err.to_string();
        match err {
            AuctionError::OwnListing | AuctionError::NotOwner => ApiError::Forbidden(message),
            AuctionError::Closed | AuctionError::AlreadyClosed | AuctionError::BidTooLow => {
                ApiError::Conflict(message)
            }
        }
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::NotFound => ApiError::NotFound(err.to_string()),
            ListingError::Rejected(rejection) => rejection.into(),
            ListingError::Database(db_err) => db_err.into(),
        }
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::BlankComment | ActionError::CommentTooLong { .. } => {
                ApiError::ValidationError(vec![FieldError::new("comment", err.to_string())])
            }
            ActionError::InvalidBidAmount | ActionError::Unrecognized => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<AmountError> for ApiError {
    fn from(err: AmountError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ImageUrlError> for ApiError {
    fn from(err: ImageUrlError) -> Self {
        ApiError::ValidationError(vec![FieldError::new("image", err.to_string())])
    }
}

/// Convert session errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::LoginRequired { .. } => {
                ApiError::Unauthorized("Please log in to continue.".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::UnknownUser => ApiError::Unauthorized(err.to_string()),
            AuthzError::NotStaff => ApiError::Forbidden(err.to_string()),
            AuthzError::DatabaseError(db_err) => db_err.into(),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { .. } => {
                ApiError::ValidationError(vec![FieldError::new("password", err.to_string())])
            }
            _ => ApiError::InternalError(format!("Password operation failed: {}", err)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            JwtError::ValidationError(_) => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}
