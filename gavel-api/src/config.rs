/// Configuration management for the API server
///
/// Values come from environment variables (a `.env` file is loaded first when
/// present) layered over built-in defaults with the `config` crate.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_PRODUCTION`: Enables HSTS and the `Secure` cookie flag (default: false)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Session signing secret, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: Session lifetime, at most one year (default: 24)
/// - `IMAGE_PROBE_TIMEOUT_SECS`: Timeout for image URL checks (default: 5)
///
/// # Example
///
/// ```no_run
/// use gavel_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shortest accepted `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub image_probe: ImageProbeConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Production mode (HTTPS in front of the server)
    pub production: bool,

    /// `["*"]` allows any origin
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub session_ttl_hours: i64,
}

/// Image URL probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProbeConfig {
    pub timeout_secs: u64,
}

impl Config {
    /// Loads configuration from `.env` and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::load(config::Environment::default())
    }

    /// Loads configuration from an explicit variable map instead of the process environment
    pub fn from_map(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        Self::load(config::Environment::default().source(Some(vars)))
    }

    fn load(environment: config::Environment) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .set_default("api_host", "0.0.0.0")?
            .set_default("api_port", 8080)?
            .set_default("api_production", false)?
            .set_default("api_cors_origins", "*")?
            .set_default("database_max_connections", 10)?
            .set_default("session_ttl_hours", 24)?
            .set_default("image_probe_timeout_secs", 5)?
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?;

        let database_url = settings
            .get_string("database_url")
            .context("DATABASE_URL environment variable is required")?;

        let jwt_secret = settings
            .get_string("jwt_secret")
            .context("JWT_SECRET environment variable is required")?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long");
        }

        let cors_origins = settings
            .get_string("api_cors_origins")?
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let session_ttl_hours = settings.get_int("session_ttl_hours")?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            anyhow::bail!("SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}");
        }

        Ok(Self {
            api: ApiConfig {
                host: settings.get_string("api_host")?,
                port: u16::try_from(settings.get_int("api_port")?).context("API_PORT out of range")?,
                production: settings.get_bool("api_production")?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: u32::try_from(settings.get_int("database_max_connections")?)
                    .context("DATABASE_MAX_CONNECTIONS out of range")?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                session_ttl_hours,
            },
            image_probe: ImageProbeConfig {
                timeout_secs: u64::try_from(settings.get_int("image_probe_timeout_secs")?)
                    .context("IMAGE_PROBE_TIMEOUT_SECS out of range")?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }

    /// Session lifetime in seconds (cookie `Max-Age`)
    pub fn session_ttl_seconds(&self) -> i64 {
        self.jwt.session_ttl_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DATABASE_URL", "postgresql://localhost/gavel_test"),
            ("JWT_SECRET", "test-secret-key-at-least-32-bytes-long"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_map(vars(&required())).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(!config.api.production);
        assert!(config.allows_any_origin());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.session_ttl_hours, 24);
        assert_eq!(config.session_ttl_seconds(), 86_400);
        assert_eq!(config.image_probe.timeout_secs, 5);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = required();
        pairs.extend([
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("API_PRODUCTION", "true"),
            ("API_CORS_ORIGINS", "https://a.example, https://b.example"),
            ("SESSION_TTL_HOURS", "2"),
        ]);

        let config = Config::from_map(vars(&pairs)).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert!(config.api.production);
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.allows_any_origin());
        assert_eq!(config.session_ttl_seconds(), 7200);
    }

    #[test]
    fn test_missing_required_values() {
        let err = Config::from_map(vars(&[("JWT_SECRET", "test-secret-key-at-least-32-bytes-long")]))
            .unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = Config::from_map(vars(&[("DATABASE_URL", "postgresql://localhost/x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let err = Config::from_map(vars(&[
            ("DATABASE_URL", "postgresql://localhost/x"),
            ("JWT_SECRET", "short"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_session_ttl_bounds() {
        for ttl in ["0", "-1", "8761", "9223372036854775807"] {
            let mut pairs = required();
            pairs.push(("SESSION_TTL_HOURS", ttl));
            let err = Config::from_map(vars(&pairs)).unwrap_err();
            assert!(err.to_string().contains("SESSION_TTL_HOURS"), "{ttl}: {err}");
        }

        let mut pairs = required();
        pairs.push(("SESSION_TTL_HOURS", "8760"));
        let config = Config::from_map(vars(&pairs)).unwrap();
        assert_eq!(config.session_ttl_seconds(), 8760 * 3600);
    }
}
