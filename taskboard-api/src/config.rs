/// Configuration management for the API server
///
/// Loaded once at startup from environment variables (and `.env` if present),
/// then shared through `AppState`.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `DATABASE_URL`: SQLite connection string (default: sqlite:./data/taskboard.db?mode=rwc)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `JWT_SECRET`: Secret key for token signing (required, 32+ characters)
/// - `JWT_EXPIRATION_HOURS`: Token lifetime (default: 24)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: *)
/// - `LOG_FORMAT`: `text` or `json` (default: text)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

use serde::{Deserialize, Serialize};
use taskboard_shared::auth::jwt::DEFAULT_EXPIRATION_HOURS;
use taskboard_shared::db::pool::{self, DEFAULT_DATABASE_URL};

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_SECRET_LENGTH: usize = 32;

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

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Logging output settings
///
/// Read on its own, before anything else, so tracing is up before the rest
/// of the configuration is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Emit logs as JSON lines (`LOG_FORMAT=json`)
    pub json: bool,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Token lifetime in hours
    pub expiration_hours: i64,
}

impl LogConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            json: lookup("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json")),
        }
    }
}

impl DatabaseConfig {
    /// Loads only the database settings
    ///
    /// Used by the `db` subcommands, which don't need a signing secret.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: &F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {e}"))?;

        Ok(Self {
            url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections,
        })
    }

    /// Pool settings for the shared database layer
    pub fn pool_config(&self) -> pool::DatabaseConfig {
        pool::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            ..Default::default()
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or short, or a numeric
    /// variable doesn't parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {e}"))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {MIN_SECRET_LENGTH} characters long");
        }

        let expiration_hours = var("JWT_EXPIRATION_HOURS", &DEFAULT_EXPIRATION_HOURS.to_string())
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("JWT_EXPIRATION_HOURS is invalid: {e}"))?;

        if expiration_hours <= 0 {
            anyhow::bail!("JWT_EXPIRATION_HOURS must be positive");
        }

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port,
                cors_origins,
            },
            database: DatabaseConfig::from_lookup(&lookup)?,
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_hours,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Pool settings for the shared database layer
    pub fn pool_config(&self) -> pool::DatabaseConfig {
        self.database.pool_config()
    }

    /// Whether any origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.expiration_hours, 24);
        assert!(config.allows_any_origin());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("JWT_EXPIRATION_HOURS", "2"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.jwt.expiration_hours, 2);
        assert_eq!(config.api.cors_origins, ["http://a.test", "http://b.test"]);
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_log_format() {
        let json = LogConfig::from_lookup(|key| (key == "LOG_FORMAT").then(|| "JSON".to_string()));
        assert!(json.json);

        let text = LogConfig::from_lookup(|key| (key == "LOG_FORMAT").then(|| "text".to_string()));
        assert!(!text.json);

        assert_eq!(LogConfig::from_lookup(|_| None), LogConfig::default());
    }

    #[test]
    fn test_secret_required_and_long_enough() {
        assert!(load(&[]).is_err());
        assert!(load(&[("JWT_SECRET", "short")]).is_err());
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(load(&[("JWT_SECRET", SECRET), ("API_PORT", "http")]).is_err());
    }

    #[test]
    fn test_secret_not_serialized() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(SECRET));
    }
}
