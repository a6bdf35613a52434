/// Authentication endpoints
///
/// - `GET  /login` - Login form (echoes `next`)
/// - `POST /login` - Log in and start a session
/// - `GET|POST /logout` - End the session and redirect to `/`
/// - `GET  /register` - Registration form
/// - `POST /register` - Create an account and start a session
///
/// A session is an HS256 token set as the `gavel_session` cookie. The token
/// is also returned in the body for clients that send `Authorization: Bearer`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use gavel_shared::{
    auth::{jwt, middleware, password},
    models::user::{CreateUser, User},
    validation::{field_errors_in_order, FieldError},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login form
#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub title: &'static str,

    /// Where to go after logging in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Registration form
#[derive(Debug, Serialize)]
pub struct RegisterPage {
    pub title: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    pub next: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 150,
        message = "Username must be between 1 and 150 characters."
    ))]
    pub username: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub confirmation: String,
}

/// Body returned when a session starts
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub username: String,
    pub access_token: String,
    pub redirect_to: String,
}

pub async fn login_page(Query(query): Query<NextQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        title: "Login",
        next: query.next,
        message: None,
    })
}

/// Logs a user in
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (the form is
///   redisplayed with `next`)
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> ApiResult<Response> {
    let user = match User::find_by_username(&state.db, &form.username).await? {
        Some(user) if password::verify_password(&form.password, &user.password_hash)? => user,
        _ => {
            tracing::debug!(username = %form.username, "Login rejected");
            let page = LoginPage {
                title: "Login",
                next: form.next,
                message: Some("Invalid username and/or password.".to_string()),
            };
            return Ok((StatusCode::UNAUTHORIZED, Json(page)).into_response());
        }
    };

    User::update_last_login(&state.db, user.id).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    start_session(&state, &user, safe_next(form.next.as_deref()), StatusCode::OK)
}

/// Ends the session
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(
            header::SET_COOKIE,
            middleware::clear_session_cookie(state.secure_cookies()),
        )],
        Redirect::to("/"),
    )
        .into_response()
}

pub async fn register_page() -> Json<RegisterPage> {
    Json(RegisterPage {
        title: "Register",
        message: None,
    })
}

/// Registers a new user and logs them in
///
/// # Errors
///
/// The form is redisplayed with the message and:
/// - `400 Bad Request`: Password and confirmation differ
/// - `422 Unprocessable Entity`: Username length, email format, password length
/// - `409 Conflict`: Username already taken
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    match create_account(&state, form).await {
        Ok(response) => response,
        Err(err) => {
            err.log();
            let page = RegisterPage {
                title: "Register",
                message: Some(err.user_message()),
            };
            (err.status_code(), Json(page)).into_response()
        }
    }
}

async fn create_account(state: &AppState, mut form: RegisterForm) -> ApiResult<Response> {
    if form.password != form.confirmation {
        return Err(ApiError::BadRequest("Passwords must match.".to_string()));
    }

    form.email = form
        .email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty());

    let mut errors: Vec<FieldError> = match form.validate() {
        Ok(()) => Vec::new(),
        Err(e) => field_errors_in_order(&e, &["username", "email"]),
    };
    if let Err(e) = password::check_new_password(&form.password) {
        errors.push(FieldError::new("password", e.to_string()));
    }
    if !errors.is_empty() {
        return Err(ApiError::ValidationError(errors));
    }

    let user = User::create(
        &state.db,
        CreateUser {
            username: form.username,
            email: form.email.unwrap_or_default(),
            password_hash: password::hash_password(&form.password)?,
        },
    )
    .await?;

    User::update_last_login(&state.db, user.id).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    start_session(state, &user, "/".to_string(), StatusCode::CREATED)
}

/// Issues a session token and sets it as the session cookie
fn start_session(
    state: &AppState,
    user: &User,
    redirect_to: String,
    status: StatusCode,
) -> ApiResult<Response> {
    let claims = jwt::Claims::with_expiration(
        user.id,
        user.username.clone(),
        chrono::Duration::hours(state.config.jwt.session_ttl_hours),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;
    let cookie = middleware::session_cookie(
        &access_token,
        state.config.session_ttl_seconds(),
        state.secure_cookies(),
    );

    let body = SessionResponse {
        user_id: user.id.to_string(),
        username: user.username.clone(),
        access_token,
        redirect_to,
    };

    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Only same-site absolute paths are followed after login
fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/listing/4")), "/listing/4");
        assert_eq!(safe_next(Some(" /create ")), "/create");
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
    }

    #[test]
    fn test_register_form_validation() {
        let form = RegisterForm {
            username: String::new(),
            email: Some("not-an-email".to_string()),
            password: "longenough".to_string(),
            confirmation: "longenough".to_string(),
        };

        let errors = field_errors_in_order(&form.validate().unwrap_err(), &["username", "email"]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "username");
        assert_eq!(errors[1].message, "Enter a valid email address.");
    }

    #[test]
    fn test_register_form_without_email_is_valid() {
        let form = RegisterForm {
            username: "alice".to_string(),
            email: None,
            password: "longenough".to_string(),
            confirmation: "longenough".to_string(),
        };

        assert!(form.validate().is_ok());
    }
}
