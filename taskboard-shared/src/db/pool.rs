/// Database connection pool management
///
/// SQLite pool built on sqlx. Foreign keys are switched on for every
/// connection so comment cascades and owner references are enforced.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: "sqlite:./data/taskboard.db?mode=rwc".to_string(),
///         max_connections: 5,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///
///     let row: (i64,) = sqlx::query_as("SELECT ?")
///         .bind(42i64)
///         .fetch_one(&pool)
///         .await?;
///
///     Ok(())
/// }
/// ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

/// Default database location, relative to the working directory
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/taskboard.db?mode=rwc";

/// Configuration for the database connection pool
///
/// All timeouts are in seconds so they map directly onto environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g., "sqlite:./data/taskboard.db?mode=rwc")
    pub url: String,

    /// Maximum number of connections in the pool
    ///
    /// Default: 5. SQLite serializes writers, so a small pool is enough.
    pub max_connections: u32,

    /// Minimum number of idle connections to keep open
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    pub connect_timeout_seconds: u64,

    /// How long a connection can remain idle before being closed (seconds)
    ///
    /// None = never closed for idleness. In-memory databases need this,
    /// since closing the last connection discards the data.
    pub idle_timeout_seconds: Option<u64>,

    /// Maximum lifetime of a connection before it is recycled (seconds)
    pub max_lifetime_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
        }
    }
}

impl DatabaseConfig {
    /// Single-connection in-memory database that lives as long as the pool
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: None,
            max_lifetime_seconds: None,
        }
    }

    /// Whether the URL points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Database file named by the URL, if any
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.is_in_memory() {
            return None;
        }

        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);

        (!path.is_empty()).then(|| PathBuf::from(path))
    }
}

/// Creates and initializes a SQLite connection pool
///
/// This function:
/// 1. Creates the parent directory of the database file if needed
/// 2. Opens the pool with foreign keys enabled
/// 3. Performs a health check to verify the database responds
///
/// # Errors
///
/// Returns an error if the URL is invalid, the directory cannot be created,
/// or the database cannot be opened.
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_seconds = config.connect_timeout_seconds,
        "Creating database connection pool"
    );

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if let Some(parent) = config.file_path().as_deref().and_then(Path::parent) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(directory = %parent.display(), "Creating database directory");
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(config.idle_timeout_seconds.map(Duration::from_secs))
        .max_lifetime(config.max_lifetime_seconds.map(Duration::from_secs));

    if config.is_in_memory() {
        // Every connection to `:memory:` is a separate database
        pool_options = pool_options.max_connections(1);
    }

    let pool = pool_options.connect_with(options).await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Performs a health check on the database connection
///
/// # Errors
///
/// Returns an error if the health check query fails
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Gracefully closes the connection pool
pub async fn close_pool(pool: SqlitePool) {
    info!("Closing database connection pool");
    pool.close().await;
    info!("Database connection pool closed");
}
