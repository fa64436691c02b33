/// User management endpoints
///
/// - `GET /auth/users` - List every user
/// - `PUT|PATCH /auth/users/:id` - Update your own name, email or password
///
/// Any authenticated caller may list users; `is_admin` is reported but not
/// used for access control.

use axum::extract::State;
use serde::Deserialize;
use taskboard_shared::{
    auth::{authorization::require_owner, middleware::AuthContext, password},
    models::{
        user::{UpdateUser, User},
        views::UserView,
    },
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Json, Path},
};

/// Partial user update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 80, message = "Name must be between 1 and 80 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
}

/// Lists all users with their cards and comments
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<UserView>>> {
    let users = UserView::load_all(&state.db).await?;

    tracing::debug!(count = users.len(), "Listed users");
    Ok(Json(users))
}

/// Updates the caller's own account
///
/// # Errors
///
/// - `404 Not Found`: no user with this id
/// - `401 Unauthorized`: the id is not the caller's
/// - `400 Bad Request`: validation failed, or the new email is taken
///
/// The body is only read once the caller is known to own the account.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    body: Result<Json<UpdateUserRequest>, ApiError>,
) -> ApiResult<Json<UserView>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    require_owner(&auth, &user)?;

    let Json(req) = body?;
    req.validate()?;

    let password_hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let updated = User::update(
        &state.db,
        id,
        UpdateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = id, "User updated");

    Ok(Json(UserView::load(&state.db, &updated).await?))
}
