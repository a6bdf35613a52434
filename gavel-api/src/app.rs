/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use gavel_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config)?;
/// let app = gavel_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use gavel_shared::{
    auth::middleware::create_session_middleware,
    validation::{HttpImageProbe, ImageProbe},
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Checks that listing image URLs point at images
    pub image_probe: Arc<dyn ImageProbe>,
}

impl AppState {
    /// Creates application state with the HTTP image probe
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(db: PgPool, config: Config) -> Result<Self, reqwest::Error> {
        let probe = HttpImageProbe::new(Duration::from_secs(config.image_probe.timeout_secs))?;
        Ok(Self::with_image_probe(db, config, Arc::new(probe)))
    }

    /// Creates application state with a given image probe
    pub fn with_image_probe(db: PgPool, config: Config, image_probe: Arc<dyn ImageProbe>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            image_probe,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Whether cookies carry the `Secure` flag
    pub fn secure_cookies(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET        /health
/// ├── GET        /                      active listings
/// ├── GET/POST   /login
/// ├── GET/POST   /logout
/// ├── GET/POST   /register
/// ├── GET/POST   /create                (login required)
/// ├── GET/POST   /listing/:id           POST: bid, comment, watchlist, close
/// ├── GET/POST   /categories            POST: create (staff)
/// ├── GET/DELETE /categories/:id        DELETE: staff
/// └── GET        /watchlist             (login required)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (innermost first):
/// 1. Session (resolves the cookie or Bearer token into an `AuthContext`)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login),
        )
        .route(
            "/logout",
            get(routes::auth::logout).post(routes::auth::logout),
        )
        .route(
            "/register",
            get(routes::auth::register_page).post(routes::auth::register),
        );

    let listing_routes = Router::new()
        .route("/", get(routes::listings::index))
        .route(
            "/create",
            get(routes::listings::create_page).post(routes::listings::create),
        )
        .route(
            "/listing/:id",
            get(routes::listings::detail).post(routes::listings::act),
        )
        .route("/watchlist", get(routes::watchlist::watchlist));

    let category_routes = Router::new()
        .route(
            "/categories",
            get(routes::categories::index).post(routes::categories::create),
        )
        .route(
            "/categories/:id",
            get(routes::categories::show).delete(routes::categories::delete),
        );

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(listing_routes)
        .merge(category_routes)
        .layer(axum::middleware::from_fn(create_session_middleware(
            state.jwt_secret().to_string(),
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
