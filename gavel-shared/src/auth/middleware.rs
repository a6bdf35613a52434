/// Session middleware for Axum
///
/// The session token is read from the `Authorization: Bearer` header or from
/// the `gavel_session` cookie. A valid token puts an [`AuthContext`] into the
/// request extensions; handlers then take `AuthContext` (login required) or
/// `Option<AuthContext>` (login optional) as an extractor.
///
/// A bad Bearer token is an error (401). A bad cookie is ignored and the
/// request continues anonymously, so an expired session never locks a browser
/// out of public pages.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use gavel_shared::auth::middleware::{create_session_middleware, AuthContext};
///
/// async fn whoami(auth: AuthContext) -> String {
///     format!("Hello, {}!", auth.username)
/// }
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(create_session_middleware("secret")));
/// ```

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "gavel_session";

/// Where anonymous users are sent to log in
pub const LOGIN_PATH: &str = "/login";

/// The authenticated user of the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// Error type for session handling
#[derive(Debug)]
pub enum AuthError {
    /// The route needs a logged-in user; `next` is the path to return to
    LoginRequired { next: String },

    /// Authorization header that is not a Bearer token
    InvalidFormat(String),

    /// Bearer token failed validation
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::LoginRequired { next } => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "login_required",
                    "message": "Please log in to continue.",
                    "login_url": format!("{LOGIN_PATH}?next={next}"),
                }),
            ),
            AuthError::InvalidFormat(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_credentials_format", "message": msg }),
            ),
            AuthError::InvalidToken(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "invalid_token", "message": msg }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AuthError::LoginRequired {
                next: parts.uri.path().to_string(),
            })
    }
}

/// Where a session token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    Bearer(&'a str),
    Cookie(&'a str),
}

/// Finds the session token, preferring the Authorization header
///
/// # Errors
///
/// Returns `AuthError::InvalidFormat` for an Authorization header that is not
/// `Bearer <token>`.
pub fn credential_from_headers(headers: &HeaderMap) -> Result<Option<Credential<'_>>, AuthError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;
        return Ok(Some(Credential::Bearer(token)));
    }

    Ok(cookie_value(headers, SESSION_COOKIE).map(Credential::Cookie))
}

/// Reads one cookie from the `Cookie` header(s)
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that starts a session
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that ends a session
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Resolves the session for a request
///
/// # Errors
///
/// Only Bearer credentials produce errors; see the module docs.
pub fn resolve_session(headers: &HeaderMap, secret: &str) -> Result<Option<AuthContext>, AuthError> {
    match credential_from_headers(headers)? {
        None => Ok(None),
        Some(Credential::Bearer(token)) => validate_token(token, secret)
            .map(|claims| Some(claims.into()))
            .map_err(|e| match e {
                JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
                JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
                _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
            }),
        Some(Credential::Cookie(token)) => match validate_token(token, secret) {
            Ok(claims) => Ok(Some(claims.into())),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                Ok(None)
            }
        },
    }
}

/// Session middleware
///
/// Inserts an [`AuthContext`] when the request carries a valid session.
///
/// # Errors
///
/// Returns 400/401 for a malformed or invalid Authorization header.
pub async fn session_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if let Some(auth) = resolve_session(req.headers(), &secret)? {
        req.extensions_mut().insert(auth);
    }

    Ok(next.run(req).await)
}

/// Creates the session middleware closure for `axum::middleware::from_fn`
pub fn create_session_middleware(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(session_middleware(secret, req, next))
    }
}
