//! # Taskboard API Server
//!
//! REST backend for a task board: accounts, cards with status and priority,
//! and comments on cards.
//!
//! ## Usage
//!
//! ```bash
//! taskboard-api              # same as `serve`
//! taskboard-api serve
//! taskboard-api db create    # apply migrations
//! taskboard-api db drop      # drop all tables
//! taskboard-api db seed      # insert sample users, cards and comments
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, DatabaseConfig, LogConfig},
};
use taskboard_shared::db::{migrations, pool, seed};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Taskboard REST API server
#[derive(Parser, Debug)]
#[command(name = "taskboard-api")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Database maintenance
    Db {
        #[command(subcommand)]
        action: DbCommand,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum DbCommand {
    /// Create the database and apply migrations
    Create,

    /// Drop every table
    Drop,

    /// Insert sample data
    Seed,
}

fn init_tracing(log: LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogConfig::from_env());

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Db { action } => run_db_command(action).await,
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let db = pool::create_pool(config.pool_config())
        .await
        .context("Failed to open database")?;
    migrations::run_migrations(&db)
        .await
        .context("Failed to apply migrations")?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}

async fn run_db_command(action: DbCommand) -> anyhow::Result<()> {
    let config = DatabaseConfig::from_env()?;

    if let DbCommand::Create = action {
        migrations::ensure_database_exists(&config.url).await?;
    }

    let db = pool::create_pool(config.pool_config()).await?;

    match action {
        DbCommand::Create => {
            migrations::run_migrations(&db).await?;
            println!("Database created");
        }
        DbCommand::Drop => {
            migrations::drop_all(&db).await?;
            println!("Database dropped");
        }
        DbCommand::Seed => {
            let summary = seed::seed(&db).await?;
            println!(
                "Database seeded: {} users, {} cards, {} comments",
                summary.users, summary.cards, summary.comments
            );
        }
    }

    pool::close_pool(db).await;
    Ok(())
}
