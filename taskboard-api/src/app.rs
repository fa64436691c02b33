/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use taskboard_shared::{
    auth::middleware::authenticate,
    constraints::{CardStatusConstraint, SingleInProgress},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, error::ApiError, routes};

/// Shared application state
///
/// Built once at startup and cloned into each handler via `State`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Rule checked before a card status is written
    pub status_constraint: Arc<dyn CardStatusConstraint>,
}

impl AppState {
    /// Creates state with the default single-in-progress rule
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            status_constraint: Arc::new(SingleInProgress),
        }
    }

    /// Replaces the card status rule
    pub fn with_status_constraint(mut self, constraint: Arc<dyn CardStatusConstraint>) -> Self {
        self.status_constraint = constraint;
        self
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health                              (public)
/// ├── POST   /auth/login                          (public)
/// ├── POST   /auth/register                       (public)
/// ├── GET    /auth/users                          (bearer)
/// ├── PUT    /auth/users/:id           + PATCH    (bearer, self only)
/// ├── GET    /cards/                   + POST     (bearer)
/// ├── GET    /cards/:id       + PUT, PATCH, DELETE (bearer, owner for writes)
/// ├── GET    /:card_id/comments/       + POST     (bearer, card owner to post)
/// └── PUT    /:card_id/comments/:id    + PATCH, DELETE (bearer, author only)
/// ```
///
/// Collection routes answer with and without the trailing slash.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/register", post(routes::auth::register));

    let protected_routes = Router::new()
        .route("/auth/users", get(routes::users::list_users))
        .route(
            "/auth/users/:id",
            put(routes::users::update_user).patch(routes::users::update_user),
        )
        .route(
            "/cards",
            get(routes::cards::list_cards).post(routes::cards::create_card),
        )
        .route(
            "/cards/",
            get(routes::cards::list_cards).post(routes::cards::create_card),
        )
        .route(
            "/cards/:id",
            get(routes::cards::get_card)
                .put(routes::cards::update_card)
                .patch(routes::cards::update_card)
                .delete(routes::cards::delete_card),
        )
        .route(
            "/:card_id/comments",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route(
            "/:card_id/comments/",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route(
            "/:card_id/comments/:comment_id",
            put(routes::comments::update_comment)
                .patch(routes::comments::update_comment)
                .delete(routes::comments::delete_comment),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer authentication middleware
///
/// Validates the `Authorization` header and injects `AuthContext` into the
/// request extensions. Runs before any handler logic.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = auth.user_id, "Authenticated request");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
