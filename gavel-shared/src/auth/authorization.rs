/// Authorization checks
///
/// Listing ownership is decided by the auction rules. What remains here is
/// the staff check guarding category administration.
///
/// # Example
///
/// ```no_run
/// use gavel_shared::auth::authorization::require_staff;
/// use gavel_shared::auth::middleware::AuthContext;
/// use sqlx::PgPool;
///
/// async fn delete_category(pool: &PgPool, auth: &AuthContext) -> Result<(), Box<dyn std::error::Error>> {
///     let staff = require_staff(pool, auth).await?;
///     println!("{} may manage categories", staff.username);
///     Ok(())
/// }
/// ```

use sqlx::PgPool;

use super::middleware::AuthContext;
use crate::models::user::User;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The session refers to a user that no longer exists
    #[error("Unknown user.")]
    UnknownUser,

    /// The user is not staff
    #[error("Staff access required.")]
    NotStaff,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that a loaded user is staff
///
/// # Errors
///
/// Returns `AuthzError::NotStaff` otherwise
pub fn ensure_staff(user: &User) -> Result<(), AuthzError> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AuthzError::NotStaff)
    }
}

/// Loads the session user and checks the staff flag
///
/// # Errors
///
/// - `AuthzError::UnknownUser` if the user was deleted after logging in
/// - `AuthzError::NotStaff` if the user is not staff
pub async fn require_staff(pool: &PgPool, auth: &AuthContext) -> Result<User, AuthzError> {
    let user = User::find_by_id(pool, auth.user_id)
        .await?
        .ok_or(AuthzError::UnknownUser)?;

    ensure_staff(&user)?;
    Ok(user)
}
