/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: Session token creation and validation
/// - [`middleware`]: Session middleware and the [`middleware::AuthContext`] extractor
/// - [`authorization`]: Staff checks
///
/// # Example
///
/// ```no_run
/// use gavel_shared::auth::password::{hash_password, verify_password};
/// use gavel_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4(), "alice".into()), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
