/// Error handling for the API server
///
/// One error type for every handler. Each variant maps to a status code and
/// one of two JSON bodies:
///
/// ```text
/// 400  {"validation_error": {"title": ["Title must be between 4 and 100 characters"]}}
/// 4xx  {"message": "Card not found"}
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler() -> ApiResult<Json<Value>> {
///     Err(ApiError::NotFound("Card not found".to_string()))
/// }
/// ```

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use taskboard_shared::{
    auth::{
        authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError,
    },
    constraints::{ConstraintError, IN_PROGRESS_TAKEN_MESSAGE},
};
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Messages per field, in field order
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or out-of-policy input (400)
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Registration or email change collides with an existing user (400)
    #[error("User already exists")]
    DuplicateUser,

    /// Login failed; never says which part was wrong (401)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed or expired bearer token (401)
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not the owner or author (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Body could not be read as JSON (400)
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500); the detail is logged, not returned
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Single-message validation error on one field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ApiError::Validation(errors)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateUser | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials
            | ApiError::Unauthenticated(_)
            | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Validation(errors) => json!({ "validation_error": errors }),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "message": "An internal error occurred" })
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Flattens `validator` output into the field → messages map
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(&error.code))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn default_message(code: &str) -> String {
    match code {
        "required" => "Missing data for required field.".to_string(),
        "email" => "Invalid email format".to_string(),
        "length" => "Length is out of range.".to_string(),
        _ => "Invalid value.".to_string(),
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(field_errors(&errors))
    }
}

/// Convert sqlx errors to API errors
///
/// Unique violations are the only database errors a client can cause: a
/// taken email, or a second "In Progress" card slipping past the
/// application check.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let message = db_err.message();
                if message.contains("users.email") {
                    ApiError::DuplicateUser
                } else if message.contains("cards.status") {
                    ApiError::field("status", IN_PROGRESS_TAKEN_MESSAGE)
                } else {
                    ApiError::InternalError(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthenticated(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            other => AuthError::from(other).into(),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAuthorized => ApiError::Unauthorized,
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<ConstraintError> for ApiError {
    fn from(err: ConstraintError) -> Self {
        match err {
            ConstraintError::Violation { field, message } => ApiError::field(field, message),
            ConstraintError::Database(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Ids that don't parse name no resource, so they are reported as missing
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::MissingPathParams(err) => ApiError::InternalError(err.body_text()),
            other => {
                tracing::debug!(error = %other.body_text(), "Unparseable path parameter");
                ApiError::NotFound("Resource not found".to_string())
            }
        }
    }
}
