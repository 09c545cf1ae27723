/// Configuration management for the API server
///
/// Settings come from environment variables, with a `.env` file loaded
/// first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
/// - `JWT_TTL_MINUTES`: Access token lifetime (default: 30)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use ecom_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;

use ecom_shared::auth::jwt::DEFAULT_TOKEN_TTL_MINUTES;

/// Longest accepted token lifetime: one week
pub const MAX_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins, `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for HS256 signing
    ///
    /// Must be at least 32 characters. Generate with `openssl rand -hex 32`.
    #[serde(skip_serializing)]
    pub secret: String,

    /// Lifetime of issued access tokens, 1 to `MAX_TOKEN_TTL_MINUTES`
    pub ttl_minutes: i64,
}

impl JwtConfig {
    /// Token lifetime as a duration
    ///
    /// Out-of-range values are clamped into `1..=MAX_TOKEN_TTL_MINUTES`.
    /// `from_lookup` already rejects them, so this only matters for
    /// hand-built configs.
    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES))
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a numeric value
    /// doesn't parse, or the JWT secret is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = get("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let cors_origins = get("API_CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let database_url =
            get("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let max_connections = get("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET environment variable is required")?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_minutes = match get("JWT_TTL_MINUTES") {
            Some(value) => value
                .parse::<i64>()
                .context("JWT_TTL_MINUTES must be an integer")?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl_minutes) {
            anyhow::bail!(
                "JWT_TTL_MINUTES must be between 1 and {}",
                MAX_TOKEN_TTL_MINUTES
            );
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_minutes,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Pool settings for the shared database layer
    pub fn pool_config(&self) -> ecom_shared::db::DatabaseConfig {
        ecom_shared::db::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/ecom"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.ttl_minutes, 30);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/ecom"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("API_CORS_ORIGINS", "https://shop.example.com, https://admin.example.com"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", "5"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://shop.example.com", "https://admin.example.com"]
        );
        assert_eq!(config.pool_config().max_connections, 4);
        assert_eq!(config.jwt.ttl_minutes, 5);
    }

    #[test]
    fn test_required_and_invalid_values() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/ecom")]).is_err());
        assert!(load(&[
            ("DATABASE_URL", "postgresql://localhost/ecom"),
            ("JWT_SECRET", "short"),
        ])
        .is_err());
        assert!(load(&[
            ("DATABASE_URL", "postgresql://localhost/ecom"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "not-a-port"),
        ])
        .is_err());
        assert!(load(&[
            ("DATABASE_URL", "postgresql://localhost/ecom"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", "0"),
        ])
        .is_err());
    }

    #[test]
    fn test_token_ttl_upper_bound() {
        let huge = i64::MAX.to_string();
        let err = load(&[
            ("DATABASE_URL", "postgresql://localhost/ecom"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", huge.as_str()),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("JWT_TTL_MINUTES"));

        let week = MAX_TOKEN_TTL_MINUTES.to_string();
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/ecom"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", week.as_str()),
        ])
        .unwrap();
        assert_eq!(config.jwt.ttl(), Duration::weeks(1));
    }

    #[test]
    fn test_ttl_clamps_hand_built_config() {
        let mut jwt = JwtConfig {
            secret: SECRET.to_string(),
            ttl_minutes: i64::MAX,
        };
        assert_eq!(jwt.ttl(), Duration::minutes(MAX_TOKEN_TTL_MINUTES));

        jwt.ttl_minutes = -10;
        assert_eq!(jwt.ttl(), Duration::minutes(1));
    }
}
