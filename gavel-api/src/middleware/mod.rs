/// Middleware for the API server
///
/// - `security`: Security response headers
///
/// The session middleware lives in `gavel_shared::auth::middleware` because
/// its `AuthContext` extractor is shared with the models' callers.

pub mod security;
