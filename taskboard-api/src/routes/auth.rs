/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/login` - Exchange email and password for a bearer token
/// - `POST /auth/register` - Create an account

use axum::extract::State;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt, password},
    models::{
        user::{CreateUser, User},
        views::UserView,
    },
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
};

/// Login request
///
/// Both fields are optional at the parsing level; a missing field is just
/// another failed login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Welcome message naming the user
    pub message: String,

    /// Bearer token
    pub access_token: String,
}

/// Register request
///
/// Unknown fields (including `is_admin`) are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "Missing data for required field."),
        length(min = 1, max = 80, message = "Name must be between 1 and 80 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Missing data for required field."),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Missing data for required field."),
        length(min = 1, message = "Password must not be empty")
    )]
    pub password: Option<String>,
}

/// Logs a user in
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "a@b.com", "password": "pw123456" }
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Login successful, welcome back Alice", "access_token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: `{"message": "Invalid credentials"}` for an unknown
///   email, a wrong password or a missing field alike
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(user) => user,
        None => {
            password::verify_dummy(&password);
            tracing::debug!("Login failed: unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !password::verify_password(&password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Login failed: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let claims = jwt::Claims::with_expiration(
        user.id,
        Duration::hours(state.config.jwt.expiration_hours),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: format!("Login successful, welcome back {}", user.name),
        access_token,
    }))
}

/// Registers a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// { "name": "Alice", "email": "a@b.com", "password": "pw123456" }
/// ```
///
/// # Response
///
/// The created user's `UserView` (no password), with `is_admin: false`.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or `{"message": "User already exists"}`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserView>> {
    req.validate()?;

    let (Some(name), Some(email), Some(password)) = (req.name, req.email, req.password) else {
        return Err(ApiError::BadRequest(
            "Missing name, email or password".to_string(),
        ));
    };

    if User::email_exists(&state.db, &email).await? {
        return Err(ApiError::DuplicateUser);
    }

    let password_hash = password::hash_password(&password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name,
            email,
            password_hash,
            is_admin: false,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(Json(UserView::load(&state.db, &user).await?))
}
